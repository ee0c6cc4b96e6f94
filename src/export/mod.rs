//! FreeCAD preview export.
//!
//! | Module | Role |
//! |--------|------|
//! | [`job`] | Export jobs and the `input[:target]` argument grammar |
//! | [`coordinator`] | Queue, staleness policy, single batched invocation |
//! | [`display`] | `xvfb-run` detection, resolved once per coordinator |
//! | [`runner`] | Subprocess seam (`CommandRunner`) |
//! | [`script`] | The embedded batch script FreeCAD executes |

pub mod coordinator;
pub mod display;
pub mod job;
pub mod runner;
pub mod script;

pub use coordinator::{ExportCoordinator, ExportError, ExportOutcome, ExportSettings};
pub use display::{DisplayStrategy, VirtualDisplayMode};
pub use job::{ExportJob, ExportTarget};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
