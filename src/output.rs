//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Constructions are listed by positional index and display name, with their
//! directory and files shown as indented context lines. This reads as an
//! inventory of the workspace while still pointing at the files behind it.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Constructions
//! 001 Cable Clip (id 4711)
//!     Source: cable_clip/
//!     Tags: clip, cable
//!     Description: Clip for 6mm cables.
//!     CAD: source/clip.FCStd → img/previews/clip.png (missing)
//!     Images: 2, 3D: 1, G-code: 0
//!
//! 1 construction, 1 CAD source, 1 preview missing
//! ```
//!
//! ## Generate docs
//!
//! ```text
//! README → cable_clip/README.md
//! README → README.md
//!
//! Export: 1 preview exported
//!     img/previews/clip.png
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects. The one exception is the preview status
//! in check output, which is computed by the caller and passed in.

use crate::export::ExportOutcome;
use crate::generate::DocsReport;
use crate::locate::to_slash;
use crate::project::ProjectOutcome;
use crate::scan::Workspace;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate to `max` characters, appending `...` when cut.
fn truncate_desc(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() <= max {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

/// Show `path` relative to `root` when possible.
fn display_path(path: &Path, root: &Path) -> String {
    to_slash(path.strip_prefix(root).unwrap_or(path))
}

// ============================================================================
// Check
// ============================================================================

/// Format the workspace inventory.
///
/// `preview_exists` reports whether the preview at a given absolute path is
/// present, so the listing can flag missing previews without doing I/O here.
pub fn format_check_output(
    workspace: &Workspace,
    preview_exists: impl Fn(&Path) -> bool,
) -> Vec<String> {
    let mut lines = vec!["Constructions".to_string()];
    let mut sources = 0;
    let mut missing = 0;

    for (i, c) in workspace.constructions.iter().enumerate() {
        let d = &c.descriptor;
        lines.push(format!("{} {} (id {})", format_index(i + 1), d.name, d.id));
        lines.push(format!("{}Source: {}/", indent(1), c.dir_name()));
        if !d.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), d.tags.join(", ")));
        }
        if !d.description.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(&d.description, 60)
            ));
        }
        for s in &c.filepaths_source {
            sources += 1;
            let status = if preview_exists(&c.dir.join(&s.preview)) {
                ""
            } else {
                missing += 1;
                " (missing)"
            };
            lines.push(format!(
                "{}CAD: {} → {}{}",
                indent(1),
                to_slash(&s.source),
                to_slash(&s.preview),
                status
            ));
        }
        lines.push(format!(
            "{}Images: {}, 3D: {}, G-code: {}",
            indent(1),
            c.filepaths_img.len(),
            c.filepaths_3d.len(),
            c.filepaths_gcode.len()
        ));
    }

    if workspace.constructions.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines.push(String::new());
    lines.push(format!(
        "{}, {}, {} missing",
        plural(workspace.constructions.len(), "construction", "constructions"),
        plural(sources, "CAD source", "CAD sources"),
        plural(missing, "preview", "previews")
    ));
    lines
}

/// Print the workspace inventory, checking previews on disk.
pub fn print_check_output(workspace: &Workspace) {
    for line in format_check_output(workspace, |p| p.is_file()) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

pub fn format_export_outcome(outcome: &ExportOutcome, root: &Path) -> Vec<String> {
    match outcome {
        ExportOutcome::NothingToDo => vec!["Export: all previews up to date".to_string()],
        ExportOutcome::Completed { exported, missing } => {
            let mut lines = vec![format!(
                "Export: {} exported",
                plural(exported.len(), "preview", "previews")
            )];
            for path in exported {
                lines.push(format!("{}{}", indent(1), display_path(path, root)));
            }
            if !missing.is_empty() {
                lines.push(format!(
                    "Export: {} not created",
                    plural(missing.len(), "preview", "previews")
                ));
                for path in missing {
                    lines.push(format!("{}{}", indent(1), display_path(path, root)));
                }
            }
            lines
        }
        ExportOutcome::Failed(err) => vec![
            "Export failed".to_string(),
            format!("{}{}", indent(1), err.to_string().lines().next().unwrap_or("")),
            format!("{}See the log for the full tool output", indent(1)),
        ],
    }
}

// ============================================================================
// Generate docs
// ============================================================================

pub fn format_docs_report(report: &DocsReport, root: &Path) -> Vec<String> {
    let mut lines: Vec<String> = report
        .readmes
        .iter()
        .map(|p| format!("README → {}", display_path(p, root)))
        .collect();
    lines.push(String::new());
    match &report.export {
        Some(outcome) => lines.extend(format_export_outcome(outcome, root)),
        None => lines.push("Export: disabled".to_string()),
    }
    lines
}

pub fn print_docs_report(report: &DocsReport, root: &Path) {
    for line in format_docs_report(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Create project
// ============================================================================

pub fn format_project_outcome(outcome: &ProjectOutcome) -> Vec<String> {
    match outcome {
        ProjectOutcome::Created(dir) => vec![format!("Created {}", dir.display())],
        ProjectOutcome::AlreadyExists(dir) => {
            vec![format!("{} already exists, nothing created", dir.display())]
        }
    }
}

pub fn print_project_outcome(outcome: &ProjectOutcome) {
    for line in format_project_outcome(outcome) {
        println!("{}", line);
    }
}
