//! Results of running the command and where items end up.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How a command invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Exit status zero within the time limit.
    Success,
    /// Command ran to completion with a failing status.
    /// `code` is `None` when a signal ended the process.
    NonzeroExit { code: Option<i32>, stderr: String },
    /// Time limit expired; the process was killed.
    Timeout { after: Duration },
    /// The process could not be started.
    SpawnFailure { reason: String },
    /// Started, but waiting on it failed.
    Other { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "finished successfully"),
            Outcome::NonzeroExit { code: Some(code), stderr } => {
                write!(f, "encountered an error.\nReturn code: {code}\nSTDERR: {stderr}")
            }
            Outcome::NonzeroExit { code: None, stderr } => {
                write!(f, "was terminated by a signal.\nSTDERR: {stderr}")
            }
            Outcome::Timeout { after } => {
                write!(f, "timed-out after {} seconds", after.as_secs())
            }
            Outcome::SpawnFailure { reason } => write!(f, "could not be started: {reason}"),
            Outcome::Other { reason } => write!(f, "encountered an error: {reason}"),
        }
    }
}

/// Final placement of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Moved to the output directory.
    Delivered,
    /// Moved to the failure directory.
    Quarantined,
    /// Command succeeded and took the item with it.
    Consumed,
    /// Command failed and the item was already gone.
    Lost,
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub name: PathBuf,
    /// `None` in pass-through mode.
    pub outcome: Option<Outcome>,
    pub disposition: Disposition,
}
