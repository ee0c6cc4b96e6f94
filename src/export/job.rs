//! Export jobs and the job-descriptor grammar.
//!
//! The coordinator and the batch script running inside FreeCAD talk through
//! plain command-line arguments, one per job:
//!
//! ```text
//! source/part_a.FCStd                       → source/part_a.png
//! source/part_b.FCStd:output_b/             → output_b/part_b.png
//! source/part_c.FCStd:output_c/custom.png   → output_c/custom.png
//! ```
//!
//! - no `:`: default output next to the input, `<stem>.png`
//! - `:target/` (trailing separator): output directory, `<target>/<stem>.png`
//! - `:target`: literal output file path
//!
//! [`ExportJob::to_arg`] and [`ExportJob::parse`] are inverses, and
//! [`ExportJob::resolve_output`] computes the file the script will write, so
//! the coordinator can check staleness and verify results without asking
//! FreeCAD.

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Where the preview image of a job goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// `<input dir>/<input stem>.png`
    Default,
    /// `<dir>/<input stem>.png`
    Directory(PathBuf),
    /// Exactly this path.
    File(PathBuf),
}

impl ExportTarget {
    /// Classify a caller-supplied output path.
    ///
    /// A path ending in a separator, or naming an existing directory, is a
    /// directory target. Anything else is a literal file path.
    pub fn from_path(path: &Path) -> Self {
        if has_trailing_separator(path) || path.is_dir() {
            Self::Directory(path.to_path_buf())
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

/// One CAD source file to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub input: PathBuf,
    pub target: ExportTarget,
}

impl ExportJob {
    pub fn new(input: impl Into<PathBuf>, target: ExportTarget) -> Self {
        Self {
            input: input.into(),
            target,
        }
    }

    /// The image file this job produces.
    pub fn resolve_output(&self) -> PathBuf {
        match &self.target {
            ExportTarget::Default => self.input.with_extension("png"),
            ExportTarget::Directory(dir) => dir.join(self.png_file_name()),
            ExportTarget::File(path) => path.clone(),
        }
    }

    fn png_file_name(&self) -> String {
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{stem}.png")
    }

    /// Serialize as a batch-script argument.
    pub fn to_arg(&self) -> String {
        let input = self.input.to_string_lossy();
        match &self.target {
            ExportTarget::Default => input.to_string(),
            ExportTarget::Directory(dir) => {
                let dir_str = dir.to_string_lossy();
                if has_trailing_separator(dir) {
                    format!("{input}:{dir_str}")
                } else {
                    format!("{input}:{dir_str}{MAIN_SEPARATOR}")
                }
            }
            ExportTarget::File(path) => format!("{input}:{}", path.to_string_lossy()),
        }
    }

    /// Parse a batch-script argument.
    ///
    /// Splits on the first `:`. An empty target (`part.FCStd:`) means the
    /// default output.
    pub fn parse(arg: &str) -> Self {
        match arg.split_once(':') {
            Some((input, "")) => Self::new(input, ExportTarget::Default),
            Some((input, target)) => {
                let target = if target.ends_with('/') || target.ends_with(MAIN_SEPARATOR) {
                    ExportTarget::Directory(PathBuf::from(target))
                } else {
                    ExportTarget::File(PathBuf::from(target))
                };
                Self::new(input, target)
            }
            None => Self::new(arg, ExportTarget::Default),
        }
    }
}

impl fmt::Display for ExportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_arg())
    }
}

fn has_trailing_separator(path: &Path) -> bool {
    let s = path.as_os_str().to_string_lossy();
    s.ends_with('/') || s.ends_with(MAIN_SEPARATOR)
}
