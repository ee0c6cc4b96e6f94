//! Extension-based file lookup.
//!
//! Every construction keeps its files in flat, well-known subdirectories
//! (`source/`, `img/`, `3d/`, `gcode/`). This module answers the single
//! question the scanner needs: which files directly inside a directory carry
//! one of a given set of extensions?
//!
//! Lookups are **not recursive**: `img/previews/*.png` never shows up as an
//! image of the construction. Results are sorted, so README output and
//! thumbnail selection do not depend on directory order.
//!
//! Extensions are compared case-insensitively: `part.FCStd` and `part.fcstd`
//! are both source files.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{path} is not inside {base}")]
    OutsideBase { path: PathBuf, base: PathBuf },
}

/// Find the files directly inside `dir` whose extension is one of
/// `extensions`, returned relative to `base` in lexicographic order.
///
/// A missing `dir` yields an empty list: constructions are free to omit any
/// of their subdirectories.
pub fn find_files_by_extension(
    dir: &Path,
    extensions: &[&str],
    base: &Path,
) -> Result<Vec<PathBuf>, LocateError> {
    if !dir.is_dir() || extensions.is_empty() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        let relative = entry.path().strip_prefix(base).map_err(|_| {
            LocateError::OutsideBase {
                path: entry.path().to_path_buf(),
                base: base.to_path_buf(),
            }
        })?;
        files.push(relative.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

/// Render a relative path with `/` separators, the form used in Markdown links.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
