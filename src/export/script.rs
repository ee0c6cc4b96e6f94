//! The batch-export script handed to FreeCAD.
//!
//! The script is Python that runs inside the FreeCAD process. It ships inside
//! the binary and is written to a named temp file for each export call, so the
//! tool works from a single executable with no resource directory. A
//! user-supplied script (`export.script_path`) is used as-is instead.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Argument separating FreeCAD's own arguments from the script's job list.
pub const PASS_SEPARATOR: &str = "--pass";

const EMBEDDED_SCRIPT: &str = include_str!("../../resources/freecad_export_image_script.py");

/// Where the batch script comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScriptSource {
    #[default]
    Embedded,
    External(PathBuf),
}

/// A script file that exists on disk for as long as this value lives.
pub enum ScriptFile {
    Temporary(NamedTempFile),
    External(PathBuf),
}

impl ScriptFile {
    pub fn path(&self) -> &Path {
        match self {
            Self::Temporary(file) => file.path(),
            Self::External(path) => path,
        }
    }
}

impl ScriptSource {
    /// Make the script available on disk.
    pub fn materialize(&self) -> std::io::Result<ScriptFile> {
        match self {
            Self::Embedded => {
                let mut file = tempfile::Builder::new()
                    .prefix("freecad_export_image_script_")
                    .suffix(".py")
                    .tempfile()?;
                file.write_all(EMBEDDED_SCRIPT.as_bytes())?;
                file.flush()?;
                Ok(ScriptFile::Temporary(file))
            }
            Self::External(path) => {
                if !path.is_file() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("export script not found: {}", path.display()),
                    ));
                }
                Ok(ScriptFile::External(path.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_script_is_written_with_py_suffix() {
        let file = ScriptSource::Embedded.materialize().unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(path.extension().unwrap(), "py");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(PASS_SEPARATOR));
        assert!(content.contains("saveImage"));
    }

    #[test]
    fn temporary_script_is_removed_on_drop() {
        let file = ScriptSource::Embedded.materialize().unwrap();
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn external_script_must_exist() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = ScriptSource::External(tmp.path().join("nope.py"));
        assert!(missing.materialize().is_err());

        let present = tmp.path().join("export.py");
        std::fs::write(&present, "print('hi')").unwrap();
        let file = ScriptSource::External(present.clone()).materialize().unwrap();
        assert_eq!(file.path(), present);
    }
}
