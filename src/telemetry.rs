//! Diagnostics setup.
//!
//! Two sinks:
//!
//! - **stderr**: human-readable, filtered by `RUST_LOG` when set, otherwise
//!   by `logging.level` (`--verbose` raises it to `debug`).
//! - **log file**: `<workspace>/.logs/construction_utils.log`, always at
//!   `debug`, appended across runs. FreeCAD's full output lands here even
//!   when the console stays quiet. Disabled by `logging.file = false` or
//!   `--no-log-file`.

use crate::config::LoggingConfig;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Log directory, relative to the workspace root.
pub const LOG_DIR: &str = ".logs";
pub const LOG_FILENAME: &str = "construction_utils.log";

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to open log file {path}: {source}")]
    LogFile { path: PathBuf, source: io::Error },
    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Console filter directive used when `RUST_LOG` is not set.
pub fn console_level(config: &LoggingConfig, verbose: bool) -> &str {
    if verbose { "debug" } else { &config.level }
}

/// Install the global subscriber. Returns the log file path when file
/// logging is on.
pub fn init_tracing(
    config: &LoggingConfig,
    verbose: bool,
    workspace_root: &Path,
) -> Result<Option<PathBuf>, TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level(config, verbose)));
    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter);

    let (file_layer, log_path) = if config.file {
        let (file, path) = open_log_file(&workspace_root.join(LOG_DIR))?;
        let layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_filter(LevelFilter::DEBUG);
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()?;
    Ok(log_path)
}

/// Open (creating if needed) the log file in `dir` for appending.
pub fn open_log_file(dir: &Path) -> Result<(File, PathBuf), TelemetryError> {
    let path = dir.join(LOG_FILENAME);
    let open = || -> io::Result<File> {
        fs::create_dir_all(dir)?;
        OpenOptions::new().create(true).append(true).open(&path)
    };
    match open() {
        Ok(file) => Ok((file, path)),
        Err(source) => Err(TelemetryError::LogFile { path, source }),
    }
}
