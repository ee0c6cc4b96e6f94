//! Shared test utilities for the construction-utils test suite.
//!
//! Builds example workspaces on disk so scanning, rendering, and export tests
//! work against real files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_workspace();
//! let workspace = Workspace::scan(tmp.path()).unwrap();
//! assert_eq!(workspace.constructions[0].dir_name(), "construction_a");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// A temp workspace holding `construction_a`, described by a legacy
/// `things.json` and populated with three sources, three images, three STL
/// files and an empty `gcode/` directory.
pub fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("construction_a");
    for sub in ["source", "img", "3d", "gcode"] {
        fs::create_dir_all(dir.join(sub)).unwrap();
    }

    fs::write(
        dir.join("things.json"),
        r#"{
    "name": "Construction A",
    "thingiverse_id": 0,
    "thingiverse_description": "Example construction.",
    "thingiverse_creator": "creator",
    "tags": ["construction", "a"]
}"#,
    )
    .unwrap();

    for part in ["a", "b", "c"] {
        fs::write(dir.join(format!("source/example_part_{part}.FCStd")), "cad").unwrap();
        fs::write(dir.join(format!("img/example_image_{part}.jpg")), "jpg").unwrap();
        fs::write(dir.join(format!("3d/example_part_{part}.stl")), "solid").unwrap();
    }

    tmp
}

/// Write a minimal construction with a `construction.json` descriptor into
/// `root/dir_name` and return its path.
pub fn write_construction(root: &Path, dir_name: &str, name: &str) -> PathBuf {
    let dir = root.join(dir_name);
    fs::create_dir_all(&dir).unwrap();
    let descriptor = serde_json::json!({
        "name": name,
        "id": 1,
        "description": format!("{name} description"),
        "tags": ["test"],
    });
    fs::write(
        dir.join("construction.json"),
        serde_json::to_string_pretty(&descriptor).unwrap(),
    )
    .unwrap();
    dir
}

// =========================================================================
// Timestamps
// =========================================================================

/// Set the modification time of `path` to `secs` seconds after the epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}
