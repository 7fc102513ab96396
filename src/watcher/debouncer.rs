//! Settling of item events before dispatch.
//!
//! Writers rarely produce a single event: a copy shows up as a create
//! followed by one or more modifications. Holding each item until it has
//! been quiet for a while turns that burst into one dispatch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Debounces item events by path.
///
/// Records change timestamps and returns paths that have been stable
/// for the configured duration, oldest first.
#[derive(Debug)]
pub struct Debouncer {
    /// Pending items: path -> (first seen, last change).
    pending: HashMap<PathBuf, (Instant, Instant)>,
    /// How long an item must be quiet before it is dispatched.
    duration: Duration,
}

impl Debouncer {
    /// Create a new debouncer with the given duration in milliseconds.
    pub fn new(settle_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            duration: Duration::from_millis(settle_ms),
        }
    }

    /// Record a change, resetting the settle timer for this path.
    pub fn record(&mut self, path: PathBuf) {
        let now = Instant::now();
        self.pending
            .entry(path)
            .and_modify(|(_, last)| *last = now)
            .or_insert((now, now));
    }

    /// Forget a path (e.g., when the item was removed).
    pub fn remove(&mut self, path: &Path) {
        self.pending.remove(path);
    }

    /// Take all paths that have been quiet for the settle duration.
    ///
    /// Ready paths are removed from pending and ordered by first sighting,
    /// so items are dispatched in arrival order.
    pub fn take_ready(&mut self) -> Vec<PathBuf> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.pending.retain(|path, (first_seen, last_change)| {
            if now.duration_since(*last_change) >= self.duration {
                ready.push((*first_seen, path.clone()));
                false
            } else {
                true
            }
        });

        ready.sort();
        ready.into_iter().map(|(_, path)| path).collect()
    }

    /// Check if there are any pending items.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_debouncer_basic() {
        let mut debouncer = Debouncer::new(50);

        let path = PathBuf::from("/in/a.csv");
        debouncer.record(path.clone());

        // Immediately after, nothing should be ready
        assert!(debouncer.take_ready().is_empty());
        assert!(debouncer.has_pending());

        sleep(Duration::from_millis(60));

        let ready = debouncer.take_ready();
        assert_eq!(ready, vec![path]);
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_repeated_events_coalesce() {
        let mut debouncer = Debouncer::new(50);

        let path = PathBuf::from("/in/a.csv");
        debouncer.record(path.clone());
        sleep(Duration::from_millis(30));
        debouncer.record(path.clone());
        assert_eq!(debouncer.pending_count(), 1);

        // 60ms since the first event, only 30ms since the second
        sleep(Duration::from_millis(30));
        assert!(debouncer.take_ready().is_empty());

        sleep(Duration::from_millis(30));
        assert_eq!(debouncer.take_ready().len(), 1);
    }

    #[test]
    fn test_ready_in_arrival_order() {
        let mut debouncer = Debouncer::new(0);

        debouncer.record(PathBuf::from("/in/z"));
        sleep(Duration::from_millis(2));
        debouncer.record(PathBuf::from("/in/a"));
        sleep(Duration::from_millis(2));
        debouncer.record(PathBuf::from("/in/m"));

        let ready = debouncer.take_ready();
        assert_eq!(
            ready,
            vec![
                PathBuf::from("/in/z"),
                PathBuf::from("/in/a"),
                PathBuf::from("/in/m")
            ]
        );
    }

    #[test]
    fn test_debouncer_remove() {
        let mut debouncer = Debouncer::new(50);

        let path = PathBuf::from("/in/gone");
        debouncer.record(path.clone());
        assert!(debouncer.has_pending());

        debouncer.remove(&path);
        assert!(!debouncer.has_pending());
    }
}
