//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::watcher::NotifierMode;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const AFTER_HELP: &str = "Quick Start:
  $ hotspud init                        # Write hotspud.toml in current directory
  $ HOTSPUD_PROC_CMD=/usr/bin/gzip hotspud run
  $ hotspud run --notifier native       # Use OS notifications instead of polling

Every setting can also be given as HOTSPUD_<KEY>, e.g. HOTSPUD_PATH_IN.";

/// Hot folder job queue
#[derive(Parser, Debug)]
#[command(
    name = "hotspud",
    version = env!("CARGO_PKG_VERSION"),
    about = "Watch a directory, run a command on every new item, and file the result",
    long_about = "Items dropped into the input path are moved to the process path, handed \
                  to the configured command, and then filed into the output path on \
                  success or the fail path on error.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Path to custom settings file (default: ./hotspud.toml)
    #[arg(short, long, global = true, env = "HOTSPUD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the input path and dispatch items until interrupted
    Run {
        /// How changes are detected (overrides config)
        #[arg(long, value_enum)]
        notifier: Option<NotifierMode>,

        /// Poll period in seconds (overrides config)
        #[arg(long)]
        period: Option<u64>,
    },

    /// Display active settings
    Config,

    /// Write a default hotspud.toml in the current directory
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
