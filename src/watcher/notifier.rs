//! Change notification for the incoming directory.
//!
//! Wraps a `notify` watcher (polling or native) and forwards its raw events
//! over a bounded channel. A full channel blocks the notify thread, so a slow
//! dispatcher leaves the backlog with the notifier rather than in memory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::WatchError;

/// Events buffered between the notify thread and the run loop.
const CHANNEL_CAPACITY: usize = 100;

/// How changes in the incoming directory are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NotifierMode {
    /// Rescan the directory every poll period. Works on network mounts.
    #[default]
    Poll,
    /// Use the platform's native notification API.
    Native,
}

/// Live watch on a single directory, non-recursive.
pub struct Notifier {
    root: PathBuf,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    /// The underlying watcher; dropping it stops event delivery.
    watcher: Box<dyn Watcher + Send>,
}

impl Notifier {
    /// Start watching `root`.
    pub fn start(root: &Path, mode: NotifierMode, period: Duration) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut watcher: Box<dyn Watcher + Send> = match mode {
            NotifierMode::Poll => {
                let config = notify::Config::default().with_poll_interval(period);
                Box::new(notify::PollWatcher::new(
                    move |res: notify::Result<Event>| {
                        let _ = tx.blocking_send(res);
                    },
                    config,
                )?)
            }
            NotifierMode::Native => Box::new(notify::recommended_watcher(
                move |res: notify::Result<Event>| {
                    let _ = tx.blocking_send(res);
                },
            )?),
        };

        watcher
            .watch(root, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.to_path_buf(),
                reason: e.to_string(),
            })?;

        crate::debug_event!("notifier", "watching", "{} ({mode:?})", root.display());

        Ok(Self {
            root: root.to_path_buf(),
            event_rx: rx,
            watcher,
        })
    }

    /// Next raw event; `None` once the watcher is gone.
    pub async fn recv(&mut self) -> Option<notify::Result<Event>> {
        self.event_rx.recv().await
    }

    /// Stop watching and discard whatever is still queued.
    ///
    /// Returns the number of drained events.
    pub fn stop(self) -> usize {
        let Self {
            root,
            mut event_rx,
            mut watcher,
        } = self;

        if let Err(e) = watcher.unwatch(&root) {
            tracing::warn!("[notifier] failed to unwatch {}: {e}", root.display());
        }
        // Dropping the watcher drops its sender, which closes the channel
        drop(watcher);

        let mut drained = 0;
        while event_rx.try_recv().is_ok() {
            drained += 1;
        }
        crate::debug_event!("notifier", "stopped", "{drained} queued events discarded");
        drained
    }
}
