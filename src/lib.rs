//! # Construction Utils
//!
//! Documentation tooling for a workspace of physical "constructions": 3D
//! printable or buildable objects, each kept in its own directory with CAD
//! sources, photos, printable models, and G-code.
//!
//! # Architecture: Scan, Render, Export
//!
//! ```text
//! 1. Scan      workspace/  →  Workspace { Construction, .. }   (descriptor + file listings)
//! 2. Render    Construction →  <construction>/README.md        (Handlebars templates)
//!              Workspace    →  README.md
//! 3. Export    CAD sources  →  img/previews/<stem>.png         (one batched FreeCAD run)
//! ```
//!
//! The scan is read-only and produces plain data. Rendering references the
//! *expected* preview paths, so READMEs never wait on FreeCAD. Export jobs are
//! collected while rendering and flushed in a single tool invocation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Finds constructions in a workspace and lists their files |
//! | [`descriptor`] | `construction.json` / legacy `things.json` parsing and validation |
//! | [`locate`] | Extension-filtered, sorted, relative file listing |
//! | [`generate`] | README rendering and the `generate_docs` pipeline |
//! | [`templates`] | Embedded Handlebars templates with per-workspace overrides |
//! | [`export`] | FreeCAD batch export: jobs, staleness, virtual display, subprocess |
//! | [`project`] | Scaffolds a new construction directory |
//! | [`config`] | `construction_utils.toml` loading, merging onto defaults, validation |
//! | [`telemetry`] | Console and file logging via `tracing` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One FreeCAD Process per Run
//!
//! FreeCAD takes seconds to start. The [`export::ExportCoordinator`] queues
//! every requested preview and hands the whole list to one FreeCAD process
//! running an embedded batch script. Previews whose source has not changed
//! are not queued again (see [`export::coordinator::is_up_to_date`]).
//!
//! ## Headless by Default
//!
//! FreeCAD renders through its GUI. When `xvfb-run` is available the export
//! runs inside a throwaway virtual X display; the decision is made once per
//! coordinator and can be forced either way in the config.
//!
//! ## Outcomes, Not Exceptions
//!
//! A failed export does not abort documentation. [`export::ExportOutcome`]
//! reports what happened, the READMEs are written anyway, and
//! `generate_docs --strict-export` turns a failure into a nonzero exit.

pub mod config;
pub mod descriptor;
pub mod export;
pub mod generate;
pub mod locate;
pub mod output;
pub mod project;
pub mod scan;
pub mod telemetry;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_helpers;
