//! Filesystem change records consumed by the matcher and dispatcher.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

/// Kind of change reported for a path under the incoming directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Moved,
    Deleted,
}

/// A single change: what happened, where, and for moves where it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub kind: ChangeKind,
    pub src_path: PathBuf,
    pub dest_path: Option<PathBuf>,
}

impl EventRecord {
    pub fn new(kind: ChangeKind, src_path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            src_path: src_path.into(),
            dest_path: None,
        }
    }

    pub fn moved(src_path: impl Into<PathBuf>, dest_path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ChangeKind::Moved,
            src_path: src_path.into(),
            dest_path: Some(dest_path.into()),
        }
    }

    /// Path the item lives at after this change: the destination for moves,
    /// the source otherwise.
    pub fn item_path(&self) -> &Path {
        self.dest_path.as_deref().unwrap_or(&self.src_path)
    }

    /// Convert a raw notify event.
    ///
    /// Returns `None` for access notifications and kinds that carry no
    /// meaning for item submission.
    pub fn from_notify(event: &Event) -> Option<Self> {
        let first = event.paths.first()?;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::Both if event.paths.len() >= 2 => {
                    return Some(Self::moved(first.clone(), event.paths[1].clone()));
                }
                // Renamed into the watched directory from elsewhere
                RenameMode::To => ChangeKind::Created,
                // Renamed away; the item is no longer here
                RenameMode::From => ChangeKind::Deleted,
                _ => ChangeKind::Modified,
            },
            EventKind::Modify(_) => ChangeKind::Modified,
            EventKind::Remove(_) => ChangeKind::Deleted,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => return None,
        };

        Some(Self::new(kind, first.clone()))
    }
}
