use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Read-only view of host state consulted by step guards.
///
/// Guards probe the live machine, never recorded state, so idempotency is
/// a property of what is actually installed.
pub trait HostProbe {
    /// Resolve a binary on `$PATH`, `command -v` semantics.
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    /// Whether a directory exists at `path`.
    fn dir_exists(&self, path: &Path) -> bool;

    /// Whether a regular file exists at `path`.
    fn file_exists(&self, path: &Path) -> bool;
}

/// `HostProbe` backed by the real filesystem and process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }

    /// Best-effort version string for an installed tool, for `status`
    /// display. Runs `<program> --version` and extracts the first dotted
    /// number from its output.
    pub fn probe_version(&self, program: &Path) -> Option<String> {
        let output = Command::new(program).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let re = Regex::new(r"\d+\.\d+(?:\.\d+)?").ok()?;
        re.find(&text).map(|m| m.as_str().to_string())
    }
}

impl HostProbe for SystemHost {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let paths = env::var_os("PATH")?;
        for dir in env::split_paths(&paths) {
            let candidate = dir.join(name);
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
