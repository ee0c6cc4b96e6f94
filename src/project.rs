//! New construction scaffolding.
//!
//! ```text
//! <workspace>/<name>/
//! ├── construction.json      # rendered, "name" filled in
//! ├── source/.gitignore
//! ├── 3d/.gitignore
//! ├── resources/.gitignore
//! ├── resources/origins.csv
//! ├── img/.gitignore
//! └── gcode/.gitignore
//! ```
//!
//! The empty `.gitignore` files keep the otherwise empty directories in git.
//! An existing target directory is never touched.

use crate::descriptor::DESCRIPTOR_FILENAME;
use crate::templates::{Template, TemplateError, Templates};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Subdirectories of a new construction, in creation order.
pub const PROJECT_SUBDIRS: &[&str] = &["source", "3d", "resources", "img", "gcode"];

pub const ORIGINS_FILE: &str = "resources/origins.csv";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Invalid project name {0:?}: must be a single directory name")]
    InvalidName(String),
    #[error("Failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOutcome {
    Created(PathBuf),
    /// The directory already existed; nothing was written.
    AlreadyExists(PathBuf),
}

#[derive(Serialize)]
struct DescriptorContext<'a> {
    name: &'a str,
}

/// Create the construction `name` inside `root` using the built-in templates.
pub fn create_project(root: &Path, name: &str) -> Result<ProjectOutcome, ProjectError> {
    let templates = Templates::builtin()?;
    create_project_with(root, name, &templates)
}

/// Create the construction `name` inside `root` using `templates`.
pub fn create_project_with(
    root: &Path,
    name: &str,
    templates: &Templates,
) -> Result<ProjectOutcome, ProjectError> {
    validate_name(name)?;
    let project_dir = root.join(name);

    tracing::info!(name, workspace = %root.display(), "Creating project");
    if project_dir.exists() {
        tracing::warn!(
            path = %project_dir.display(),
            "Project directory already exists, leaving it untouched"
        );
        return Ok(ProjectOutcome::AlreadyExists(project_dir));
    }

    // Render first so a template error writes nothing
    let descriptor = templates.render(Template::ConstructionDescriptor, &DescriptorContext { name })?;
    let origins = templates.render(Template::Origins, &())?;

    create_dir(&project_dir)?;
    for subdir in PROJECT_SUBDIRS {
        let dir = project_dir.join(subdir);
        create_dir(&dir)?;
        write(&dir.join(".gitignore"), "")?;
    }
    write(&project_dir.join(ORIGINS_FILE), &origins)?;
    write(&project_dir.join(DESCRIPTOR_FILENAME), &descriptor)?;

    Ok(ProjectOutcome::Created(project_dir))
}

fn validate_name(name: &str) -> Result<(), ProjectError> {
    // Descriptors with a blank name fail validation
    if name.trim().is_empty() {
        return Err(ProjectError::InvalidName(name.to_string()));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(ProjectError::InvalidName(name.to_string())),
    }
}

fn create_dir(path: &Path) -> Result<(), ProjectError> {
    tracing::debug!(path = %path.display(), "Creating directory");
    fs::create_dir(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), ProjectError> {
    tracing::debug!(path = %path.display(), "Creating file");
    fs::write(path, content).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}
