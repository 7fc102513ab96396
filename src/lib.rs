//! Hot folder job queue.
//!
//! Items dropped into an incoming directory are optionally run through an
//! external command and end up in an output or failure directory.

pub mod logging;

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod watcher;

pub use config::Settings;
pub use dispatch::{CommandSpec, Dispatcher, Disposition, ItemReport, Outcome};
pub use watcher::{HotFolder, MatchRule, NotifierMode, PathRegistry};
