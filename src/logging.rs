//! Process-wide logging setup.
//!
//! Installs a single `tracing` subscriber with a timestamped, compact format.
//! Components never configure logging themselves; they emit events through
//! `tracing` (usually via [`log_event!`] and [`debug_event!`]) and whatever
//! subscriber the binary installed receives them.
//!
//! # Levels
//!
//! The configured level uses the names operators already know from the
//! environment variable (`HOTSPUD_LOG_LEVEL`):
//!
//! | setting    | tracing filter |
//! |------------|----------------|
//! | `CRITICAL` | `error`        |
//! | `ERROR`    | `error`        |
//! | `WARNING`  | `warn`         |
//! | `INFO`     | `info`         |
//! | `DEBUG`    | `debug`        |
//!
//! Anything else, including an unset variable, falls back to `info`.
//!
//! # Environment Variable
//!
//! `RUST_LOG` takes precedence over the configured level:
//! ```bash
//! RUST_LOG=hotspud=trace hotspud run
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Wall-clock time format: YYYY-MM-DD HH:MM:SS
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Map a configured level name to a tracing filter directive.
pub fn level_filter(level: &str) -> &'static str {
    match level.trim().to_ascii_uppercase().as_str() {
        "CRITICAL" | "ERROR" => "error",
        "WARNING" => "warn",
        "DEBUG" => "debug",
        _ => "info",
    }
}

/// Initialize logging at the given level name.
///
/// Call once at startup. Safe to call multiple times (only first call takes effect).
/// The `RUST_LOG` environment variable takes precedence over `level`.
pub fn init(level: &str) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(level_filter(level))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_timer(LocalTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Log an event with component context.
///
/// # Examples
/// ```ignore
/// log_event!("dispatch", "found", "{}", path.display());
/// log_event!("watcher", "started");
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// # Examples
/// ```ignore
/// debug_event!("watcher", "unmatched", "{}", path.display());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(level_filter("CRITICAL"), "error");
        assert_eq!(level_filter("ERROR"), "error");
        assert_eq!(level_filter("WARNING"), "warn");
        assert_eq!(level_filter("DEBUG"), "debug");
        assert_eq!(level_filter("INFO"), "info");
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(level_filter(""), "info");
        assert_eq!(level_filter("VERBOSE"), "info");
        assert_eq!(level_filter(" debug "), "debug");
    }
}
