//! The run loop: notifier events in, dispatched items out.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use notify::Event;
use tokio::time::{MissedTickBehavior, interval};

use crate::dispatch::Dispatcher;

use super::debouncer::Debouncer;
use super::error::WatchError;
use super::event::{ChangeKind, EventRecord};
use super::matcher::{MatchRule, Matcher};
use super::notifier::{Notifier, NotifierMode};

/// How often settled items are checked for.
const TICK: Duration = Duration::from_millis(100);

/// A watched incoming directory with its dispatcher.
///
/// Runs on a single task. Items are dispatched strictly one after another,
/// so a slow command holds back the next item; events that arrive meanwhile
/// wait in the notifier's channel.
pub struct HotFolder {
    dispatcher: Dispatcher,
    matcher: Matcher,
    debouncer: Debouncer,
    notifier: Notifier,
}

impl HotFolder {
    /// Create a builder for configuring the hot folder.
    pub fn builder() -> HotFolderBuilder {
        HotFolderBuilder::new()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> Result<(), WatchError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("[watcher] cannot listen for interrupt: {e}");
                std::future::pending::<()>().await;
            }
            crate::log_event!("watcher", "interrupted");
        })
        .await
    }

    /// Run until `shutdown` resolves.
    ///
    /// This is the main event loop that:
    /// 1. Receives change events from the notifier
    /// 2. Filters them through the matcher
    /// 3. Holds admitted items until they settle
    /// 4. Dispatches settled items one at a time
    ///
    /// A dispatch in progress always finishes before shutdown is observed.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), WatchError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        crate::log_event!(
            "watcher",
            "started",
            "{}",
            self.dispatcher.registry().incoming().display()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,

                res = self.notifier.recv() => match res {
                    Some(Ok(event)) => self.handle_event(&event),
                    Some(Err(e)) => tracing::error!("[watcher] file watch error: {e}"),
                    None => {
                        tracing::warn!("[watcher] notifier closed unexpectedly");
                        break;
                    }
                },

                _ = ticker.tick() => {
                    for path in self.debouncer.take_ready() {
                        dispatch(&self.dispatcher, &path).await;
                    }
                }
            }
        }

        let pending = self.debouncer.pending_count();
        if pending > 0 {
            crate::debug_event!("watcher", "unsettled items left in place", "{pending}");
        }
        self.notifier.stop();
        crate::log_event!("watcher", "stopped");
        Ok(())
    }

    /// Route an incoming notify event.
    fn handle_event(&mut self, event: &Event) {
        let Some(record) = EventRecord::from_notify(event) else {
            return;
        };

        // The old name is gone either way
        if matches!(record.kind, ChangeKind::Deleted | ChangeKind::Moved) {
            self.debouncer.remove(&record.src_path);
        }

        if !self.matcher.admits(&record) {
            crate::debug_event!(
                "watcher",
                "ignored",
                "{:?} {}",
                record.kind,
                record.src_path.display()
            );
            return;
        }

        crate::debug_event!(
            "watcher",
            "event",
            "{:?} for {}",
            record.kind,
            record.src_path.display()
        );
        self.debouncer.record(record.item_path().to_path_buf());
    }
}

/// Dispatch one settled item, logging whatever happens to it.
async fn dispatch(dispatcher: &Dispatcher, path: &Path) {
    match dispatcher.dispatch(path).await {
        Ok(report) => {
            crate::debug_event!(
                "watcher",
                "dispatched",
                "{} -> {:?}",
                report.name.display(),
                report.disposition
            );
        }
        Err(e) if e.is_benign() => {
            crate::debug_event!("watcher", "skipped", "{e}");
        }
        Err(e) => {
            tracing::error!("[watcher] {e}");
        }
    }
}

/// Builder for constructing a HotFolder.
pub struct HotFolderBuilder {
    dispatcher: Option<Dispatcher>,
    rule: MatchRule,
    mode: NotifierMode,
    period: Duration,
    settle_ms: u64,
}

impl HotFolderBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            dispatcher: None,
            rule: MatchRule::default(),
            mode: NotifierMode::default(),
            period: Duration::from_secs(15),
            settle_ms: 500,
        }
    }

    /// Set the dispatcher; its registry provides the incoming directory.
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Set the admission rule.
    pub fn rule(mut self, rule: MatchRule) -> Self {
        self.rule = rule;
        self
    }

    /// Set how changes are detected.
    pub fn mode(mut self, mode: NotifierMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the poll period (poll mode only).
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the settle duration in milliseconds.
    pub fn settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Compile the rule and start the notifier.
    pub fn build(self) -> Result<HotFolder, WatchError> {
        let dispatcher = self.dispatcher.ok_or_else(|| WatchError::InitFailed {
            reason: "Dispatcher is required".to_string(),
        })?;

        let incoming = dispatcher.registry().incoming();
        let matcher = Matcher::new(&self.rule, incoming)?;
        let notifier = Notifier::start(incoming, self.mode, self.period)?;

        Ok(HotFolder {
            dispatcher,
            matcher,
            debouncer: Debouncer::new(self.settle_ms),
            notifier,
        })
    }
}

impl Default for HotFolderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
