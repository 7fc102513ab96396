//! Error types for command validation and item dispatch.

use std::path::PathBuf;
use thiserror::Error;

/// Configured command cannot be used. Fatal at startup.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("command {path} not found")]
    NotFound { path: PathBuf },

    #[error("command {path} is not executable")]
    NotExecutable { path: PathBuf },
}

/// Failure scoped to a single item. Never stops the run loop.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{path} is not inside the incoming path")]
    OutsideIncoming { path: PathBuf },

    #[error("item {path} no longer exists")]
    Missing { path: PathBuf },

    #[error("failed to move {from} to {to}: {source}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DispatchError {
    /// Events for items that are already gone are expected noise: a writer's
    /// burst of events can outlive the item.
    pub fn is_benign(&self) -> bool {
        matches!(self, DispatchError::Missing { .. })
    }
}
