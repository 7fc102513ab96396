//! Startup and notifier errors for the hot folder.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent the watcher from starting.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Cannot create {role} path {path}: {source}")]
    DirectoryCreate {
        role: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
