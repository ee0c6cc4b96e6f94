//! Workspace configuration.
//!
//! An optional `construction_utils.toml` in the workspace root tunes the
//! export and documentation steps. The file is sparse: it is merged on top of
//! the stock defaults, so it only needs the keys it changes.
//!
//! ```toml
//! # Only change the CAD command, keep everything else
//! [export]
//! cad_command = "/opt/freecad/bin/FreeCAD"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Run `construction_utils
//! gen_config` for a fully commented stock file.

use crate::export::VirtualDisplayMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name, looked up in the workspace root.
pub const CONFIG_FILENAME: &str = "construction_utils.toml";

/// Largest accepted `export.stale_threshold_secs` (one year).
pub const MAX_STALE_THRESHOLD_SECS: f64 = 365.0 * 24.0 * 3600.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Preview export settings.
    pub export: ExportConfig,
    /// README generation settings.
    pub docs: DocsConfig,
    /// Diagnostics settings.
    pub logging: LoggingConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.export.stale_threshold_secs;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::Validation(
                "export.stale_threshold_secs must be a non-negative number".into(),
            ));
        }
        if threshold > MAX_STALE_THRESHOLD_SECS {
            return Err(ConfigError::Validation(format!(
                "export.stale_threshold_secs must be at most {MAX_STALE_THRESHOLD_SECS}"
            )));
        }
        if self.export.cad_command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.cad_command must not be empty".into(),
            ));
        }
        if self.export.virtual_display_command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.virtual_display_command must not be empty".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Queue and run preview exports at all.
    pub enabled: bool,
    /// FreeCAD executable.
    pub cad_command: String,
    /// When to wrap FreeCAD in the virtual display command.
    pub virtual_display: VirtualDisplayMode,
    pub virtual_display_command: String,
    /// Seconds the source may be newer than its preview before re-export.
    pub stale_threshold_secs: f64,
    /// Batch script to use instead of the embedded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cad_command: "freecad".to_string(),
            virtual_display: VirtualDisplayMode::Auto,
            virtual_display_command: "xvfb-run".to_string(),
            stale_threshold_secs: 2.0,
            script_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Heading of the workspace README.
    pub workspace_title: String,
    /// Directory with template files overriding the embedded ones by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            workspace_title: "Constructions".to_string(),
            template_dir: None,
        }
    }
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Console level when `RUST_LOG` is not set.
    pub level: String,
    /// Also write `.logs/construction_utils.log`.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `construction_utils.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config of the workspace at `root`, falling back to stock
/// defaults when there is no config file.
pub fn load_config(root: &Path) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `construction_utils.toml`.
///
/// Used by the `gen_config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# construction_utils configuration
# ================================
# Place this file in the workspace root as construction_utils.toml.
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Preview export (FreeCAD batch rendering)
# ---------------------------------------------------------------------------
[export]
# Export CAD previews during generate_docs.
enabled = true

# FreeCAD executable, looked up on PATH unless absolute.
cad_command = "freecad"

# Run FreeCAD inside a virtual X display:
#   "auto"   - when virtual_display_command is found on PATH
#   "always" - always (fails if the command is missing)
#   "never"  - never; FreeCAD windows will appear on the current display
virtual_display = "auto"
virtual_display_command = "xvfb-run"

# A preview is re-exported when its source is newer than the preview by more
# than this many seconds.
stale_threshold_secs = 2.0

# Use a custom batch script instead of the built-in one (relative to the
# workspace root). It receives the job list after a "--pass" argument.
# script_path = "tools/export_image.py"

# ---------------------------------------------------------------------------
# README generation
# ---------------------------------------------------------------------------
[docs]
# Heading of the workspace README.
workspace_title = "Constructions"

# Directory with templates overriding the built-in ones by file name
# (construction_readme.md.hbs, workspace_readme.md.hbs, construction.json.hbs,
# origins.csv), relative to the workspace root.
# template_dir = "templates"

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# Console level when RUST_LOG is not set: error, warn, info, debug, trace.
level = "info"

# Also write a debug-level log to .logs/construction_utils.log.
file = true
"##
}
