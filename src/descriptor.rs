//! Construction descriptor files.
//!
//! A directory is a construction because it carries a descriptor: a small
//! JSON document naming and describing the physical object.
//!
//! ```json
//! {
//!     "name": "Cable Clip",
//!     "id": 4711,
//!     "description": "Clip for 6mm cables.",
//!     "tags": ["clip", "cable"],
//!     "creator": "someone"
//! }
//! ```
//!
//! `construction.json` is the current file name. `things.json` is accepted as
//! a legacy alias, together with its `thingiverse_*` key spellings. When both
//! files exist, `construction.json` wins.
//!
//! Required fields are checked at load time so a broken descriptor fails with
//! the file path and the offending field, not somewhere in the renderer.
//! Unknown keys are preserved in [`ConstructionDescriptor::extra`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current descriptor file name.
pub const DESCRIPTOR_FILENAME: &str = "construction.json";

/// Legacy descriptor file name, still read by the scanner.
pub const LEGACY_DESCRIPTOR_FILENAME: &str = "things.json";

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("No descriptor ({DESCRIPTOR_FILENAME} or {LEGACY_DESCRIPTOR_FILENAME}) in {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid descriptor {path}: {reason}")]
    Validation { path: PathBuf, reason: String },
}

/// Parsed contents of a descriptor file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionDescriptor {
    /// Display name.
    pub name: String,
    /// Numeric identifier (historically the Thingiverse thing id).
    #[serde(alias = "thingiverse_id")]
    pub id: i64,
    /// Free-text description.
    #[serde(alias = "thingiverse_description")]
    pub description: String,
    /// Ordered tag list.
    pub tags: Vec<String>,
    #[serde(default, alias = "thingiverse_creator", skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Every key not modelled above, kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ConstructionDescriptor {
    /// Parse descriptor JSON. `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, DescriptorError> {
        let descriptor: Self =
            serde_json::from_str(content).map_err(|source| DescriptorError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        descriptor.validate(path)?;
        Ok(descriptor)
    }

    /// Read and parse the descriptor at `path`.
    pub fn from_file(path: &Path) -> Result<Self, DescriptorError> {
        let content = fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Load the descriptor of the construction in `dir`.
    pub fn load(dir: &Path) -> Result<Self, DescriptorError> {
        let path = descriptor_path(dir).ok_or_else(|| DescriptorError::NotFound(dir.to_path_buf()))?;
        Self::from_file(&path)
    }

    fn validate(&self, path: &Path) -> Result<(), DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::Validation {
                path: path.to_path_buf(),
                reason: "name must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Path of the descriptor file in `dir`, if there is one.
pub fn descriptor_path(dir: &Path) -> Option<PathBuf> {
    [DESCRIPTOR_FILENAME, LEGACY_DESCRIPTOR_FILENAME]
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"{
        "name": "Construction A",
        "id": 7,
        "description": "First construction",
        "tags": ["construction", "a"],
        "license": "CC-BY"
    }"#;

    #[test]
    fn parses_required_and_extra_fields() {
        let d = ConstructionDescriptor::parse(VALID, Path::new("construction.json")).unwrap();
        assert_eq!(d.name, "Construction A");
        assert_eq!(d.id, 7);
        assert_eq!(d.tags, vec!["construction", "a"]);
        assert_eq!(d.creator, None);
        assert_eq!(d.extra.get("license"), Some(&serde_json::json!("CC-BY")));
    }

    #[test]
    fn accepts_legacy_thingiverse_keys() {
        let legacy = r#"{
            "name": "Construction A",
            "thingiverse_id": 0,
            "thingiverse_description": "desc",
            "thingiverse_creator": "creator",
            "tags": []
        }"#;
        let d = ConstructionDescriptor::parse(legacy, Path::new("things.json")).unwrap();
        assert_eq!(d.id, 0);
        assert_eq!(d.description, "desc");
        assert_eq!(d.creator.as_deref(), Some("creator"));
        assert!(d.extra.is_empty());
    }

    #[test]
    fn missing_field_names_field_and_file() {
        let err = ConstructionDescriptor::parse(
            r#"{"name": "x", "id": 1, "description": ""}"#,
            Path::new("a/construction.json"),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("tags"), "{msg}");
        assert!(msg.contains("a/construction.json"), "{msg}");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = ConstructionDescriptor::parse(
            r#"{"name": "  ", "id": 1, "description": "", "tags": []}"#,
            Path::new("construction.json"),
        )
        .unwrap_err();
        assert!(matches!(err, DescriptorError::Validation { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err =
            ConstructionDescriptor::parse("{ not json", Path::new("construction.json")).unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }));
    }

    #[test]
    fn current_name_wins_over_legacy() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LEGACY_DESCRIPTOR_FILENAME), VALID).unwrap();
        fs::write(
            tmp.path().join(DESCRIPTOR_FILENAME),
            r#"{"name": "Current", "id": 1, "description": "", "tags": []}"#,
        )
        .unwrap();

        let d = ConstructionDescriptor::load(tmp.path()).unwrap();
        assert_eq!(d.name, "Current");
    }

    #[test]
    fn legacy_file_is_found_alone() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LEGACY_DESCRIPTOR_FILENAME), VALID).unwrap();
        assert_eq!(
            descriptor_path(tmp.path()),
            Some(tmp.path().join(LEGACY_DESCRIPTOR_FILENAME))
        );
    }

    #[test]
    fn load_without_descriptor_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = ConstructionDescriptor::load(tmp.path()).unwrap_err();
        assert!(matches!(err, DescriptorError::NotFound(_)));
    }
}
