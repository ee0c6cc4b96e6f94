//! Text templates for generated files.
//!
//! All templates are compiled into the binary. A workspace may override any of
//! them by placing a file with the same name in `docs.template_dir`; files not
//! present there keep the built-in version.
//!
//! Markdown templates render values verbatim. The descriptor template renders
//! values JSON-escaped, so a name like `Clip "B"` still yields a valid
//! `construction.json`.

use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid template {name}: {source}")]
    Parse {
        name: &'static str,
        source: Box<handlebars::TemplateError>,
    },
    #[error("Failed to render {name}: {source}")]
    Render {
        name: &'static str,
        source: Box<handlebars::RenderError>,
    },
}

/// The templates the tool renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    ConstructionReadme,
    WorkspaceReadme,
    ConstructionDescriptor,
    Origins,
}

impl Template {
    pub const ALL: [Template; 4] = [
        Template::ConstructionReadme,
        Template::WorkspaceReadme,
        Template::ConstructionDescriptor,
        Template::Origins,
    ];

    /// File name, both of the built-in template and of an override.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::ConstructionReadme => "construction_readme.md.hbs",
            Self::WorkspaceReadme => "workspace_readme.md.hbs",
            Self::ConstructionDescriptor => "construction.json.hbs",
            Self::Origins => "origins.csv",
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            Self::ConstructionReadme => include_str!("../templates/construction_readme.md.hbs"),
            Self::WorkspaceReadme => include_str!("../templates/workspace_readme.md.hbs"),
            Self::ConstructionDescriptor => include_str!("../templates/construction.json.hbs"),
            Self::Origins => include_str!("../templates/origins.csv"),
        }
    }

    fn is_json(self) -> bool {
        self == Self::ConstructionDescriptor
    }
}

/// Registered templates, ready to render.
pub struct Templates {
    text: Handlebars<'static>,
    json: Handlebars<'static>,
}

impl Templates {
    /// Built-in templates only.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::load(None)
    }

    /// Built-in templates, with files in `override_dir` taking precedence.
    pub fn load(override_dir: Option<&Path>) -> Result<Self, TemplateError> {
        let mut text = Handlebars::new();
        text.register_escape_fn(handlebars::no_escape);
        let mut json = Handlebars::new();
        json.register_escape_fn(json_escape);

        for template in Template::ALL {
            let source = match override_dir.map(|dir| dir.join(template.file_name())) {
                Some(path) if path.is_file() => {
                    tracing::debug!(path = %path.display(), "Using template override");
                    fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })?
                }
                _ => template.builtin().to_string(),
            };
            let registry = if template.is_json() { &mut json } else { &mut text };
            registry
                .register_template_string(template.file_name(), source)
                .map_err(|e| TemplateError::Parse {
                    name: template.file_name(),
                    source: Box::new(e),
                })?;
        }

        Ok(Self { text, json })
    }

    pub fn render<T: Serialize>(&self, template: Template, data: &T) -> Result<String, TemplateError> {
        let registry = if template.is_json() { &self.json } else { &self.text };
        registry
            .render(template.file_name(), data)
            .map_err(|e| TemplateError::Render {
                name: template.file_name(),
                source: Box::new(e),
            })
    }
}

/// Escape a value for use inside a JSON string literal.
fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
