//! Run command - wire settings into a hot folder and watch until interrupted.

use anyhow::Context;

use crate::config::Settings;
use crate::dispatch::{CommandSpec, Dispatcher};
use crate::watcher::{HotFolder, NotifierMode, PathRegistry, Role};

/// Arguments for the run command.
pub struct RunArgs {
    pub notifier: Option<NotifierMode>,
    pub period: Option<u64>,
}

/// Apply CLI overrides on top of loaded settings.
pub fn apply_overrides(mut settings: Settings, args: &RunArgs) -> Settings {
    if let Some(mode) = args.notifier {
        settings.notifier = mode;
    }
    if let Some(period) = args.period {
        settings.period = period;
    }
    settings
}

/// Validate the configuration and build the hot folder.
///
/// Every fatal misconfiguration surfaces here, before the loop starts:
/// directories that cannot be created, a missing or non-executable command,
/// an invalid pattern, a zero poll period, or an incoming path that cannot
/// be watched.
pub fn prepare(settings: &Settings) -> anyhow::Result<HotFolder> {
    if settings.notifier == NotifierMode::Poll && settings.period == 0 {
        anyhow::bail!("period must be at least 1 second in poll mode");
    }

    let registry = PathRegistry::new(
        &settings.path_in,
        &settings.path_proc,
        &settings.path_out,
        &settings.path_fail,
    )?;

    let command = CommandSpec::new(&settings.proc_cmd, settings.command_timeout())
        .context("invalid process command")?;

    HotFolder::builder()
        .dispatcher(Dispatcher::new(registry, command))
        .rule(settings.match_rule())
        .mode(settings.notifier)
        .period(settings.poll_period())
        .settle_ms(settings.settle_ms)
        .build()
        .context("cannot start watching the input path")
}

/// Run the watcher until Ctrl-C.
pub async fn run(settings: Settings, args: RunArgs) -> anyhow::Result<()> {
    let settings = apply_overrides(settings, &args);
    let hot_folder = prepare(&settings)?;

    for line in summary(&settings, hot_folder.dispatcher()) {
        tracing::info!("{line}");
    }
    hot_folder.run().await?;
    Ok(())
}

/// Startup report: the validated directories and command, plus the rule.
fn summary(settings: &Settings, dispatcher: &Dispatcher) -> Vec<String> {
    let registry = dispatcher.registry();
    let command = dispatcher.command();
    let quoted = |label: &str, value: &dyn std::fmt::Display| format!("{label:<16}: \"{value}\"");

    let mut lines = vec!["started".to_string()];
    for role in [Role::Incoming, Role::Output, Role::Processing, Role::Failure] {
        let dir = registry.directory(role);
        lines.push(quoted(&format!("{role} path"), &dir.path().display()));
    }

    let executable = command
        .executable()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let timeout = command
        .timeout()
        .map(|t| t.as_secs().to_string())
        .unwrap_or_else(|| "None".to_string());
    lines.push(quoted("process command", &executable));
    lines.push(quoted("process timeout", &timeout));
    lines.push(quoted("poll period", &settings.period));
    lines.push(quoted("notifier", &format!("{:?}", settings.notifier)));
    lines.push(quoted("regex", &settings.regex));
    lines.push(quoted(
        "ignore_regex",
        &settings.ignore_regex.as_deref().unwrap_or_default(),
    ));
    lines
}
