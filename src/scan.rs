//! Workspace and construction scanning.
//!
//! A workspace is a directory of constructions. Only **immediate**
//! subdirectories that carry a descriptor file count; anything else (a
//! `.logs/` directory, a scratch folder, a nested workspace) is ignored.
//!
//! ```text
//! workspace/
//! ├── README.md                    # generated
//! ├── cable_clip/
//! │   ├── construction.json        # descriptor (or legacy things.json)
//! │   ├── README.md                # generated
//! │   ├── source/*.FCStd           # CAD sources
//! │   ├── img/*.{jpeg,jpg,png}     # photos; first one is the thumbnail
//! │   ├── img/previews/<stem>.png  # exported CAD previews (expected)
//! │   ├── 3d/*.stl                 # printable models
//! │   └── gcode/*.{gcode,3mf}      # sliced prints
//! └── notes/                       # no descriptor, not a construction
//! ```
//!
//! Every path stored on a [`Construction`] is relative to the construction
//! directory, so the record describes the construction regardless of where the
//! workspace is checked out. Preview paths are *expected* locations; they are
//! not required to exist at scan time.

use crate::descriptor::{ConstructionDescriptor, DescriptorError, descriptor_path};
use crate::locate::{self, LocateError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("Workspace root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

pub const SUBDIR_SOURCE: &str = "source";
pub const SUBDIR_IMG: &str = "img";
pub const SUBDIR_3D: &str = "3d";
pub const SUBDIR_GCODE: &str = "gcode";
/// Where exported CAD previews live, relative to the construction directory.
pub const PREVIEW_DIR: &str = "img/previews";

pub const EXTENSIONS_SOURCE: &[&str] = &["FCStd"];
pub const EXTENSIONS_IMG: &[&str] = &["jpeg", "jpg", "png"];
pub const EXTENSIONS_3D: &[&str] = &["stl"];
pub const EXTENSIONS_GCODE: &[&str] = &["gcode", "3mf"];

/// A CAD source file and the preview image expected for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// e.g. `source/bracket.FCStd`
    pub source: PathBuf,
    /// e.g. `img/previews/bracket.png`
    pub preview: PathBuf,
}

/// One construction directory, read once and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Construction {
    pub dir: PathBuf,
    pub descriptor: ConstructionDescriptor,
    pub filepaths_source: Vec<SourceFile>,
    pub filepaths_img: Vec<PathBuf>,
    pub filepaths_3d: Vec<PathBuf>,
    pub filepaths_gcode: Vec<PathBuf>,
    /// First image in sort order, if the construction has any images.
    pub filepath_thumbnail_image: Option<PathBuf>,
}

impl Construction {
    /// Read the descriptor and file listings of the construction in `dir`.
    pub fn read(dir: &Path) -> Result<Self, ScanError> {
        let descriptor = ConstructionDescriptor::load(dir)?;

        let filepaths_source = find(dir, SUBDIR_SOURCE, EXTENSIONS_SOURCE)?
            .into_iter()
            .map(|source| {
                let preview = preview_path(&source);
                SourceFile { source, preview }
            })
            .collect();
        let filepaths_img = find(dir, SUBDIR_IMG, EXTENSIONS_IMG)?;
        let filepaths_3d = find(dir, SUBDIR_3D, EXTENSIONS_3D)?;
        let filepaths_gcode = find(dir, SUBDIR_GCODE, EXTENSIONS_GCODE)?;
        let filepath_thumbnail_image = filepaths_img.first().cloned();

        Ok(Self {
            dir: dir.to_path_buf(),
            descriptor,
            filepaths_source,
            filepaths_img,
            filepaths_3d,
            filepaths_gcode,
            filepath_thumbnail_image,
        })
    }

    /// Name of the construction directory (its identity within the workspace).
    pub fn dir_name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

fn find(dir: &Path, subdir: &str, extensions: &[&str]) -> Result<Vec<PathBuf>, LocateError> {
    locate::find_files_by_extension(&dir.join(subdir), extensions, dir)
}

/// Expected preview location for a construction-relative source path:
/// `img/previews/<source stem>.png`.
pub fn preview_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Path::new(PREVIEW_DIR).join(format!("{stem}.png"))
}

/// The workspace root and its constructions, sorted by directory name.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub constructions: Vec<Construction>,
}

impl Workspace {
    /// Scan the immediate subdirectories of `root` for constructions.
    ///
    /// Descriptor errors are not recovered: one broken construction fails the
    /// whole scan.
    pub fn scan(root: &Path) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if path.is_dir() && descriptor_path(&path).is_some() {
                dirs.push(path);
            }
        }
        dirs.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

        let mut constructions = Vec::with_capacity(dirs.len());
        for dir in &dirs {
            tracing::debug!(dir = %dir.display(), "Reading construction");
            constructions.push(Construction::read(dir)?);
        }

        Ok(Self {
            root: root.to_path_buf(),
            constructions,
        })
    }
}
