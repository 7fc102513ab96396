//! Item lifecycle: incoming → processing → output or failure.

use std::path::Path;

use crate::watcher::{ItemPaths, PathRegistry};

use super::relocate::{is_present, relocate};
use super::runner::{CommandRunner, Invocation, ProcessRunner};
use super::{CommandSpec, Disposition, DispatchError, ItemReport, Outcome};

/// Moves each item through its lifecycle, one at a time.
///
/// In pass-through mode (no command) items go straight from the incoming to
/// the output directory. Otherwise the item is moved to the processing
/// directory, the command runs there with the item's relative name as its
/// argument, and the outcome decides between output and failure.
pub struct Dispatcher {
    registry: PathRegistry,
    command: CommandSpec,
    runner: Box<dyn CommandRunner>,
}

impl Dispatcher {
    pub fn new(registry: PathRegistry, command: CommandSpec) -> Self {
        Self::with_runner(registry, command, ProcessRunner)
    }

    pub fn with_runner(
        registry: PathRegistry,
        command: CommandSpec,
        runner: impl CommandRunner + 'static,
    ) -> Self {
        Self {
            registry,
            command,
            runner: Box::new(runner),
        }
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Process the item at `item_path` to a terminal state.
    ///
    /// Errors are scoped to this item; callers log them and carry on.
    pub async fn dispatch(&self, item_path: &Path) -> Result<ItemReport, DispatchError> {
        let item = self.registry.locate(item_path)?;

        if !is_present(&item.incoming) {
            return Err(DispatchError::Missing {
                path: item.incoming,
            });
        }
        crate::log_event!("dispatch", "found item", "{}", item.incoming.display());

        let Some(executable) = self.command.executable() else {
            move_item(&item.incoming, &item.output)?;
            crate::log_event!(
                "dispatch",
                "moved",
                "item {} to output path {}",
                item.incoming.display(),
                item.output.display()
            );
            return Ok(ItemReport {
                name: item.name,
                outcome: None,
                disposition: Disposition::Delivered,
            });
        };

        move_item(&item.incoming, &item.processing)?;
        crate::debug_event!(
            "dispatch",
            "moved",
            "item {} to processing path {}",
            item.incoming.display(),
            item.processing.display()
        );

        crate::log_event!(
            "dispatch",
            "running",
            "{} {} in folder {}",
            executable.display(),
            item.name.display(),
            self.registry.processing().display()
        );
        let outcome = self
            .runner
            .run(&Invocation {
                executable,
                argument: item.name.as_os_str(),
                working_dir: self.registry.processing(),
                timeout: self.command.timeout(),
            })
            .await;

        let disposition = if outcome.is_success() {
            crate::debug_event!("dispatch", "command finished", "{}", item.name.display());
            self.settle_success(&item)?
        } else {
            tracing::error!(
                "[dispatch] command {} {} for item {}",
                executable.display(),
                outcome,
                item.name.display()
            );
            self.quarantine(&item)?
        };

        Ok(ItemReport {
            name: item.name,
            outcome: Some(outcome),
            disposition,
        })
    }

    fn settle_success(&self, item: &ItemPaths) -> Result<Disposition, DispatchError> {
        if !is_present(&item.processing) {
            tracing::error!(
                "[dispatch] item {} not found in process path {} after command execution",
                item.name.display(),
                self.registry.processing().display()
            );
            return Ok(Disposition::Consumed);
        }

        move_item(&item.processing, &item.output)?;
        crate::log_event!(
            "dispatch",
            "moved",
            "item {} to output path {}",
            item.name.display(),
            item.output.display()
        );
        Ok(Disposition::Delivered)
    }

    fn quarantine(&self, item: &ItemPaths) -> Result<Disposition, DispatchError> {
        if !is_present(&item.processing) {
            tracing::error!(
                "[dispatch] item {} not found in process path {}, cannot move it to fail path",
                item.name.display(),
                self.registry.processing().display()
            );
            return Ok(Disposition::Lost);
        }

        move_item(&item.processing, &item.failure)?;
        crate::log_event!(
            "dispatch",
            "moved",
            "item {} to fail path {}",
            item.name.display(),
            item.failure.display()
        );
        Ok(Disposition::Quarantined)
    }
}

fn move_item(from: &Path, to: &Path) -> Result<(), DispatchError> {
    relocate(from, to).map_err(|source| DispatchError::Relocate {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
