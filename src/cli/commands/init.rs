//! Init and Config commands.

use std::path::PathBuf;

use crate::config::{SETTINGS_FILE, Settings};

/// Write a default `hotspud.toml`, refusing to clobber one unless forced.
pub fn run_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from(SETTINGS_FILE);
    let existed = config_path.exists();

    let path = Settings::init_config_file(force).map_err(|e| anyhow::anyhow!("{e}"))?;

    let verb = if existed { "Overwrote" } else { "Created" };
    println!("{verb} configuration at: {}", path.display());
    println!("Set proc_cmd to the program that should handle each item,");
    println!("or leave it empty to relay items straight to path_out.");
    Ok(())
}

/// Print the effective settings, after file and environment layering.
pub fn run_config(config: &Settings) -> anyhow::Result<()> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    println!("{}", toml::to_string_pretty(config)?);

    let mode = if config.proc_cmd.is_empty() {
        "pass-through".to_string()
    } else {
        format!("command {}", config.proc_cmd)
    };
    let timeout = config
        .command_timeout()
        .map(|t| format!("{}s (including grace)", t.as_secs()))
        .unwrap_or_else(|| "none".to_string());
    println!("# mode: {mode}");
    println!("# effective timeout: {timeout}");
    Ok(())
}
