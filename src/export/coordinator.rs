//! Export job coordinator.
//!
//! Collects preview-export requests and flushes them as **one** FreeCAD
//! invocation. Starting FreeCAD costs seconds, rendering a document a fraction
//! of that, so the coordinator never runs the tool per file.
//!
//! ## Lifecycle
//!
//! ```text
//!            add_export_job            export() ok
//!   Idle ───────────────────▶ Accumulating ───────────▶ Idle
//!    │  ▲                          │  ▲
//!    │  └── export() (no-op)       │  └── export() failed (queue kept)
//!    └─────────────────────────────┘
//! ```
//!
//! ## Staleness
//!
//! When a job names its output, the coordinator skips it if the resolved
//! output file exists and the input is not newer than it by more than the
//! configured threshold (2 seconds by default). The threshold absorbs coarse
//! filesystem timestamps and copies that touch both files at nearly the same
//! moment. Jobs without an explicit output are always queued, and `force`
//! queues unconditionally.
//!
//! ## Failures
//!
//! [`ExportCoordinator::export`] never returns `Err`: failing to start the
//! tool or the tool exiting non-zero is an [`ExportOutcome::Failed`] value the
//! caller can inspect, after the full diagnostics have been logged. FreeCAD
//! tends to exit cleanly even when a document fails to render, so a completed
//! export also lists expected images that did not appear.

use super::display::DisplayStrategy;
use super::job::{ExportJob, ExportTarget};
use super::runner::{CommandRunner, ProcessRunner};
use super::script::{PASS_SEPARATOR, ScriptSource};
use crate::config::ExportConfig;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Default staleness threshold.
pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to prepare export script: {0}")]
    Script(#[source] std::io::Error),
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {}: {output}", describe_exit(.exit_code))]
    ToolFailed {
        program: String,
        exit_code: Option<i32>,
        output: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "a signal".to_string(),
    }
}

/// Result of flushing the job queue.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The queue was empty; nothing was started.
    NothingToDo,
    /// The tool ran and exited successfully.
    Completed {
        /// Resolved outputs that exist after the run.
        exported: Vec<PathBuf>,
        /// Resolved outputs that do not exist after the run.
        missing: Vec<PathBuf>,
    },
    /// The tool could not be run or reported an error. The queue is kept.
    Failed(ExportError),
}

impl ExportOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Static settings of a coordinator.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub cad_command: String,
    pub stale_threshold: Duration,
    pub script: ScriptSource,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            cad_command: "freecad".to_string(),
            stale_threshold: DEFAULT_STALE_THRESHOLD,
            script: ScriptSource::Embedded,
        }
    }
}

impl ExportSettings {
    /// Settings from the `[export]` config section. Relative script paths
    /// resolve against `workspace_root`. A threshold that does not fit a
    /// [`Duration`] falls back to the default.
    pub fn from_config(config: &ExportConfig, workspace_root: &Path) -> Self {
        Self {
            cad_command: config.cad_command.clone(),
            stale_threshold: Duration::try_from_secs_f64(config.stale_threshold_secs)
                .unwrap_or(DEFAULT_STALE_THRESHOLD),
            script: match &config.script_path {
                Some(path) => ScriptSource::External(workspace_root.join(path)),
                None => ScriptSource::Embedded,
            },
        }
    }
}

pub struct ExportCoordinator<R: CommandRunner = ProcessRunner> {
    settings: ExportSettings,
    display: DisplayStrategy,
    runner: R,
    jobs: Vec<ExportJob>,
}

impl ExportCoordinator<ProcessRunner> {
    /// Production coordinator for a workspace, detecting the virtual display
    /// wrapper once.
    pub fn from_config(config: &ExportConfig, workspace_root: &Path) -> Self {
        let display =
            DisplayStrategy::detect(config.virtual_display, &config.virtual_display_command);
        Self::new(
            ExportSettings::from_config(config, workspace_root),
            display,
            ProcessRunner,
        )
    }
}

impl<R: CommandRunner> ExportCoordinator<R> {
    pub fn new(settings: ExportSettings, display: DisplayStrategy, runner: R) -> Self {
        Self {
            settings,
            display,
            runner,
            jobs: Vec::new(),
        }
    }

    pub fn display(&self) -> &DisplayStrategy {
        &self.display
    }

    pub fn pending_jobs(&self) -> &[ExportJob] {
        &self.jobs
    }

    /// Queue a preview export of `input`.
    ///
    /// `output` is a file path or, with a trailing separator or naming an
    /// existing directory, an output directory. Without `output` the image
    /// lands next to the input. Identical jobs are not deduplicated.
    pub fn add_export_job(&mut self, input: impl Into<PathBuf>, output: Option<&Path>, force: bool) {
        let target = output.map_or(ExportTarget::Default, ExportTarget::from_path);
        let job = ExportJob::new(input, target);

        if !force && job.target != ExportTarget::Default {
            let resolved = job.resolve_output();
            if is_up_to_date(&job.input, &resolved, self.settings.stale_threshold) {
                tracing::debug!(
                    input = %job.input.display(),
                    output = %resolved.display(),
                    "Preview up to date, skipping"
                );
                return;
            }
        }

        tracing::debug!(job = %job, "Queued export job");
        self.jobs.push(job);
    }

    /// Run all pending jobs in one tool invocation.
    pub fn export(&mut self) -> ExportOutcome {
        if self.jobs.is_empty() {
            tracing::info!("No FreeCAD export jobs available");
            return ExportOutcome::NothingToDo;
        }

        tracing::info!(count = self.jobs.len(), "Running FreeCAD export");
        let job_args: Vec<String> = self.jobs.iter().map(ExportJob::to_arg).collect();
        for arg in &job_args {
            tracing::info!("- {arg}");
        }

        let script = match self.settings.script.materialize() {
            Ok(script) => script,
            Err(e) => {
                tracing::error!(error = %e, "Export failed: could not prepare export script");
                return ExportOutcome::Failed(ExportError::Script(e));
            }
        };

        let mut args = Vec::with_capacity(job_args.len() + 2);
        args.push(script.path().to_string_lossy().to_string());
        args.push(PASS_SEPARATOR.to_string());
        args.extend(job_args);
        let (program, args) = self.display.wrap(&self.settings.cad_command, args);

        tracing::debug!(command = %format!("{} {}", program, args.join(" ")), "FreeCAD command");

        let output = match self.runner.run(&program, &args) {
            Ok(output) => output,
            Err(source) => {
                tracing::error!(program = %program, error = %source, "Export failed: could not launch");
                return ExportOutcome::Failed(ExportError::Launch { program, source });
            }
        };
        drop(script);

        let combined = output.combined();
        for line in combined.lines() {
            tracing::debug!("{line}");
        }

        if !output.success {
            tracing::error!(
                program = %program,
                exit_code = ?output.exit_code,
                output = %combined,
                "Export failed"
            );
            return ExportOutcome::Failed(ExportError::ToolFailed {
                program,
                exit_code: output.exit_code,
                output: combined,
            });
        }

        let (exported, missing): (Vec<PathBuf>, Vec<PathBuf>) = self
            .jobs
            .drain(..)
            .map(|job| job.resolve_output())
            .partition(|path| path.is_file());
        for path in &missing {
            tracing::warn!(path = %path.display(), "Expected preview image was not created");
        }
        tracing::info!(exported = exported.len(), missing = missing.len(), "Export done");

        ExportOutcome::Completed { exported, missing }
    }
}

/// Whether `output` is current with respect to `input`.
///
/// Up to date means: both timestamps are readable and `input` is not newer
/// than `output` by more than `threshold`.
pub fn is_up_to_date(input: &Path, output: &Path, threshold: Duration) -> bool {
    let (Some(input_mtime), Some(output_mtime)) = (modified(input), modified(output)) else {
        return false;
    };
    match input_mtime.duration_since(output_mtime) {
        Ok(input_newer_by) => input_newer_by <= threshold,
        Err(_) => true,
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
