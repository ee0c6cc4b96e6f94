//! README generation.
//!
//! Renders one `README.md` per construction and one for the workspace, and
//! queues CAD previews for export along the way.
//!
//! ## Pipeline
//!
//! ```text
//! Workspace::scan ──▶ for each construction ──▶ write <construction>/README.md
//!                             │
//!                             └──▶ queue source/<x>.FCStd → img/previews/<x>.png
//!
//!                     ExportCoordinator::export   (one FreeCAD run)
//!
//!                     write <workspace>/README.md
//! ```
//!
//! READMEs reference the *expected* preview paths, so they are valid whether
//! or not the export succeeds. A failed export is reported in the
//! [`DocsReport`], not as an error: the documentation is still written.
//!
//! All paths in rendered output use `/` separators regardless of platform.

use crate::config::ToolConfig;
use crate::export::{CommandRunner, ExportCoordinator, ExportOutcome};
use crate::locate::to_slash;
use crate::scan::{Construction, ScanError, Workspace};
use crate::templates::{Template, TemplateError, Templates};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const README_FILENAME: &str = "README.md";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// What a `generate_docs` run did.
#[derive(Debug)]
pub struct DocsReport {
    /// Number of constructions found.
    pub constructions: usize,
    /// Every README written, construction READMEs first.
    pub readmes: Vec<PathBuf>,
    /// `None` when export was disabled.
    pub export: Option<ExportOutcome>,
}

// ============================================================================
// Template contexts
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SourceEntry {
    pub path: String,
    pub file_name: String,
    pub preview: String,
}

/// Data handed to the construction README template.
#[derive(Debug, Serialize)]
pub struct ConstructionReadmeContext {
    pub name: String,
    pub id: i64,
    pub creator: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub sources: Vec<SourceEntry>,
    pub images: Vec<String>,
    pub models: Vec<String>,
    pub gcode: Vec<String>,
}

impl ConstructionReadmeContext {
    pub fn new(construction: &Construction) -> Self {
        let d = &construction.descriptor;
        Self {
            name: d.name.clone(),
            id: d.id,
            creator: d.creator.clone(),
            description: d.description.clone(),
            tags: d.tags.clone(),
            thumbnail: construction.filepath_thumbnail_image.as_deref().map(to_slash),
            sources: construction
                .filepaths_source
                .iter()
                .map(|s| SourceEntry {
                    path: to_slash(&s.source),
                    file_name: s
                        .source
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    preview: to_slash(&s.preview),
                })
                .collect(),
            images: slashed(&construction.filepaths_img),
            models: slashed(&construction.filepaths_3d),
            gcode: slashed(&construction.filepaths_gcode),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkspaceEntry {
    pub name: String,
    pub id: i64,
    pub tags: Vec<String>,
    /// Workspace-relative thumbnail path.
    pub thumbnail: Option<String>,
    /// Workspace-relative README path.
    pub readme: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceReadmeContext {
    pub title: String,
    pub constructions: Vec<WorkspaceEntry>,
}

impl WorkspaceReadmeContext {
    pub fn new(workspace: &Workspace, title: &str) -> Self {
        let constructions = workspace
            .constructions
            .iter()
            .map(|c| {
                let dir = Path::new(&c.dir_name()).to_path_buf();
                WorkspaceEntry {
                    name: c.descriptor.name.clone(),
                    id: c.descriptor.id,
                    tags: c.descriptor.tags.clone(),
                    thumbnail: c
                        .filepath_thumbnail_image
                        .as_ref()
                        .map(|t| to_slash(&dir.join(t))),
                    readme: to_slash(&dir.join(README_FILENAME)),
                }
            })
            .collect();
        Self {
            title: title.to_string(),
            constructions,
        }
    }
}

fn slashed(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| to_slash(p)).collect()
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render_construction_readme(
    templates: &Templates,
    construction: &Construction,
) -> Result<String, GenerateError> {
    let context = ConstructionReadmeContext::new(construction);
    Ok(templates.render(Template::ConstructionReadme, &context)?)
}

pub fn render_workspace_readme(
    templates: &Templates,
    workspace: &Workspace,
    title: &str,
) -> Result<String, GenerateError> {
    let context = WorkspaceReadmeContext::new(workspace, title);
    Ok(templates.render(Template::WorkspaceReadme, &context)?)
}

fn write_readme(dir: &Path, content: &str) -> Result<PathBuf, GenerateError> {
    let path = dir.join(README_FILENAME);
    fs::write(&path, content).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Wrote README");
    Ok(path)
}

/// Generate all READMEs of the workspace at `root`.
///
/// With an `exporter`, previews of every CAD source are queued (`force`
/// bypasses the staleness check) and exported in one run before the
/// workspace README is written.
pub fn generate_docs<R: CommandRunner>(
    root: &Path,
    config: &ToolConfig,
    mut exporter: Option<&mut ExportCoordinator<R>>,
    force: bool,
) -> Result<DocsReport, GenerateError> {
    let template_dir = config.docs.template_dir.as_ref().map(|d| root.join(d));
    let templates = Templates::load(template_dir.as_deref())?;

    let workspace = Workspace::scan(root)?;
    tracing::info!(
        root = %root.display(),
        constructions = workspace.constructions.len(),
        "Generating docs"
    );

    let mut readmes = Vec::with_capacity(workspace.constructions.len() + 1);
    for construction in &workspace.constructions {
        tracing::info!(construction = %construction.dir_name(), "Generating README");
        let content = render_construction_readme(&templates, construction)?;
        readmes.push(write_readme(&construction.dir, &content)?);

        if let Some(coordinator) = exporter.as_deref_mut() {
            for source in &construction.filepaths_source {
                let output = construction.dir.join(&source.preview);
                coordinator.add_export_job(
                    construction.dir.join(&source.source),
                    Some(output.as_path()),
                    force,
                );
            }
        }
    }

    let export = exporter.map(|coordinator| coordinator.export());

    let content = render_workspace_readme(&templates, &workspace, &config.docs.workspace_title)?;
    readmes.push(write_readme(root, &content)?);

    Ok(DocsReport {
        constructions: workspace.constructions.len(),
        readmes,
        export,
    })
}
