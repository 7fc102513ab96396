//! The optional external command run for every item.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::CommandError;

/// Validated command configuration.
///
/// Without an executable the dispatcher relays items straight to the output
/// directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    executable: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl CommandSpec {
    /// Validate `executable` once, eagerly. An empty string selects
    /// pass-through mode; `timeout` of `None` lets the command run unbounded.
    pub fn new(executable: &str, timeout: Option<Duration>) -> Result<Self, CommandError> {
        if executable.is_empty() {
            return Ok(Self::pass_through());
        }

        let path = PathBuf::from(executable);
        let metadata = std::fs::metadata(&path)
            .ok()
            .filter(|m| m.is_file())
            .ok_or_else(|| CommandError::NotFound { path: path.clone() })?;

        if !is_executable(&metadata) {
            return Err(CommandError::NotExecutable { path });
        }

        Ok(Self {
            executable: Some(path),
            timeout,
        })
    }

    pub fn pass_through() -> Self {
        Self::default()
    }

    pub fn is_pass_through(&self) -> bool {
        self.executable.is_none()
    }

    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}
