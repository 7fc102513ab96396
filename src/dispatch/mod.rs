//! Item dispatch: the move/execute/move lifecycle for admitted items.
//!
//! # Lifecycle
//!
//! ```text
//! pass-through:  incoming ──────────────────────────────▶ output
//!
//! command:       incoming ──▶ processing ──▶ run command ─┬▶ output   (exit 0)
//!                                                         └▶ failure  (exit != 0,
//!                                                                      timeout,
//!                                                                      spawn error)
//! ```
//!
//! Every failure stays with the item that caused it; the dispatcher never
//! aborts the process.

mod command;
mod dispatcher;
mod error;
mod outcome;
pub mod relocate;
mod runner;

pub use command::CommandSpec;
pub use dispatcher::Dispatcher;
pub use error::{CommandError, DispatchError};
pub use outcome::{Disposition, ItemReport, Outcome};
pub use runner::{CommandRunner, Invocation, ProcessRunner};
