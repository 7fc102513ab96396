//! Hot folder watcher: detects new items and feeds them to the dispatcher.
//!
//! # Architecture
//!
//! ```text
//! HotFolder
//!   - Notifier (notify::PollWatcher or RecommendedWatcher)
//!   - Matcher (include/exclude patterns, directory filter)
//!   - Debouncer (settle period per item)
//!   - Dispatcher (one item at a time)
//! ```

mod debouncer;
mod error;
mod event;
mod hot_folder;
mod matcher;
mod notifier;
mod path_registry;

pub use debouncer::Debouncer;
pub use error::WatchError;
pub use event::{ChangeKind, EventRecord};
pub use hot_folder::{HotFolder, HotFolderBuilder};
pub use matcher::{MatchRule, Matcher};
pub use notifier::{Notifier, NotifierMode};
pub use path_registry::{ItemPaths, PathRegistry, Role, RoleDirectory};
