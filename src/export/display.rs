//! Virtual display selection.
//!
//! FreeCAD's GUI module needs a display even when it only renders to a file.
//! On a headless host (CI, a server, an SSH session) the export is wrapped in
//! `xvfb-run -a`, which starts a throwaway X server on a free display number.
//! Without the wrapper FreeCAD is launched directly and its window shows up on
//! whatever display is current.
//!
//! The choice is made once, when the coordinator is built, and never
//! re-checked per export: a run either always wraps or never does.

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::PathBuf;

/// Configured policy for the virtual display wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualDisplayMode {
    /// Wrap when the wrapper is found on `PATH`.
    #[default]
    Auto,
    /// Always wrap, even if the wrapper cannot be found.
    Always,
    /// Never wrap.
    Never,
}

/// Resolved strategy: how the CAD command is launched for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayStrategy {
    Direct,
    VirtualDisplay { wrapper: String },
}

impl DisplayStrategy {
    /// Resolve the strategy against the current process's `PATH`.
    pub fn detect(mode: VirtualDisplayMode, wrapper: &str) -> Self {
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        Self::detect_with_path(mode, wrapper, &path_var)
    }

    /// Resolve the strategy against an explicit `PATH` value.
    pub fn detect_with_path(mode: VirtualDisplayMode, wrapper: &str, path_var: &OsStr) -> Self {
        let wrap = match mode {
            VirtualDisplayMode::Always => true,
            VirtualDisplayMode::Never => false,
            VirtualDisplayMode::Auto => find_on_path(wrapper, path_var).is_some(),
        };

        if wrap {
            tracing::info!(
                wrapper,
                "Virtual display available - visual output will be redirected and hidden"
            );
            Self::VirtualDisplay {
                wrapper: wrapper.to_string(),
            }
        } else {
            tracing::info!("Virtual display NOT used - unable to hide visual output");
            Self::Direct
        }
    }

    /// Build `(program, args)` for running `command` with `args` under this
    /// strategy.
    pub fn wrap(&self, command: &str, args: Vec<String>) -> (String, Vec<String>) {
        match self {
            Self::Direct => (command.to_string(), args),
            Self::VirtualDisplay { wrapper } => {
                let mut wrapped = Vec::with_capacity(args.len() + 2);
                // -a: pick a free server number instead of failing on :99
                wrapped.push("-a".to_string());
                wrapped.push(command.to_string());
                wrapped.extend(args);
                (wrapper.clone(), wrapped)
            }
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::VirtualDisplay { .. })
    }
}

/// Locate an executable named `program` in the directories of `path_var`.
pub fn find_on_path(program: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}

#[cfg(windows)]
fn candidates(dir: &std::path::Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program), dir.join(format!("{program}.exe"))]
}

#[cfg(not(windows))]
fn candidates(dir: &std::path::Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn path_with(dirs: &[&std::path::Path]) -> OsString {
        std::env::join_paths(dirs).unwrap()
    }

    fn write_executable(path: &std::path::Path) {
        std::fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn auto_wraps_when_wrapper_is_on_path() {
        let bin = TempDir::new().unwrap();
        write_executable(&bin.path().join("xvfb-run"));

        let strategy = DisplayStrategy::detect_with_path(
            VirtualDisplayMode::Auto,
            "xvfb-run",
            &path_with(&[bin.path()]),
        );
        assert_eq!(
            strategy,
            DisplayStrategy::VirtualDisplay {
                wrapper: "xvfb-run".into()
            }
        );
    }

    #[test]
    fn auto_runs_direct_when_wrapper_is_missing() {
        let empty = TempDir::new().unwrap();
        let strategy = DisplayStrategy::detect_with_path(
            VirtualDisplayMode::Auto,
            "xvfb-run",
            &path_with(&[empty.path()]),
        );
        assert_eq!(strategy, DisplayStrategy::Direct);
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_wrapper_is_ignored() {
        let bin = TempDir::new().unwrap();
        std::fs::write(bin.path().join("xvfb-run"), "#!/bin/sh\n").unwrap();

        let path = path_with(&[bin.path()]);
        assert_eq!(find_on_path("xvfb-run", &path), None);
        assert_eq!(
            DisplayStrategy::detect_with_path(VirtualDisplayMode::Auto, "xvfb-run", &path),
            DisplayStrategy::Direct
        );
    }

    #[test]
    fn explicit_modes_ignore_path() {
        let empty = TempDir::new().unwrap();
        let path = path_with(&[empty.path()]);
        assert!(
            DisplayStrategy::detect_with_path(VirtualDisplayMode::Always, "xvfb-run", &path)
                .is_virtual()
        );

        let bin = TempDir::new().unwrap();
        write_executable(&bin.path().join("xvfb-run"));
        assert!(
            !DisplayStrategy::detect_with_path(
                VirtualDisplayMode::Never,
                "xvfb-run",
                &path_with(&[bin.path()])
            )
            .is_virtual()
        );
    }

    #[test]
    fn wrap_prefixes_wrapper_with_auto_display() {
        let strategy = DisplayStrategy::VirtualDisplay {
            wrapper: "xvfb-run".into(),
        };
        let (program, args) = strategy.wrap("freecad", vec!["script.py".into(), "--pass".into()]);
        assert_eq!(program, "xvfb-run");
        assert_eq!(args, vec!["-a", "freecad", "script.py", "--pass"]);
    }

    #[test]
    fn direct_wrap_is_identity() {
        let (program, args) = DisplayStrategy::Direct.wrap("freecad", vec!["script.py".into()]);
        assert_eq!(program, "freecad");
        assert_eq!(args, vec!["script.py"]);
    }

    #[test]
    fn mode_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: VirtualDisplayMode,
        }
        let w: Wrapper = toml::from_str("mode = \"never\"").unwrap();
        assert_eq!(w.mode, VirtualDisplayMode::Never);
    }
}
