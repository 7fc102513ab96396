//! Configuration module for the hot folder.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables are prefixed with `HOTSPUD_`; the remainder of the
//! name is the lowercased setting key:
//! - `HOTSPUD_PATH_IN=/srv/spool/in` sets `path_in`
//! - `HOTSPUD_PROC_CMD=/usr/local/bin/convert` sets `proc_cmd`
//! - `HOTSPUD_PROC_TIMEOUT=30` sets `proc_timeout`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::watcher::{MatchRule, NotifierMode};

/// Name of the settings file looked up in the current directory.
pub const SETTINGS_FILE: &str = "hotspud.toml";

/// Grace added on top of the configured command timeout.
pub const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Log verbosity: CRITICAL, ERROR, WARNING, INFO or DEBUG
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Full-match pattern an item path must satisfy to be processed
    #[serde(default = "default_regex")]
    pub regex: String,

    /// Full-match pattern that excludes an item path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_regex: Option<String>,

    /// Match patterns case-sensitively
    #[serde(default)]
    pub case_sensitive: bool,

    /// Never process directories dropped into the incoming path
    #[serde(default)]
    pub ignore_directories: bool,

    /// Incoming directory watched for new items
    #[serde(default = "default_path_in")]
    pub path_in: PathBuf,

    /// Terminal directory for processed items
    #[serde(default = "default_path_out")]
    pub path_out: PathBuf,

    /// Working directory the command runs in
    #[serde(default = "default_path_proc")]
    pub path_proc: PathBuf,

    /// Quarantine directory for failed items
    #[serde(default = "default_path_fail")]
    pub path_fail: PathBuf,

    /// Executable run for every item; empty relays items untouched
    #[serde(default)]
    pub proc_cmd: String,

    /// Seconds the command may run before it is killed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proc_timeout: Option<u64>,

    /// Poll period in seconds
    #[serde(default = "default_period")]
    pub period: u64,

    /// How changes are detected
    #[serde(default)]
    pub notifier: NotifierMode,

    /// Quiet time in milliseconds an item needs before it is dispatched
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

// Default value functions
fn default_log_level() -> String {
    "INFO".to_string()
}
fn default_regex() -> String {
    ".*".to_string()
}
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
fn default_path_in() -> PathBuf {
    home_dir().join("in")
}
fn default_path_out() -> PathBuf {
    home_dir().join("out")
}
fn default_path_proc() -> PathBuf {
    home_dir().join("proc")
}
fn default_path_fail() -> PathBuf {
    home_dir().join("fail")
}
fn default_period() -> u64 {
    15
}
fn default_settle_ms() -> u64 {
    500
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            regex: default_regex(),
            ignore_regex: None,
            case_sensitive: false,
            ignore_directories: false,
            path_in: default_path_in(),
            path_out: default_path_out(),
            path_proc: default_path_proc(),
            path_fail: default_path_fail(),
            proc_cmd: String::new(),
            proc_timeout: None,
            period: default_period(),
            notifier: NotifierMode::default(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// Uses `path` when given, otherwise `hotspud.toml` in the current
    /// directory if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, then environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path))
            // HOTSPUD_PATH_IN -> path_in
            .merge(Env::prefixed("HOTSPUD_"))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(SETTINGS_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }

    /// Inclusion/exclusion rule for the matcher
    pub fn match_rule(&self) -> MatchRule {
        MatchRule {
            patterns: vec![self.regex.clone()],
            ignore_patterns: self.ignore_regex.iter().cloned().collect(),
            case_sensitive: self.case_sensitive,
            ignore_directories: self.ignore_directories,
        }
    }

    /// Effective command timeout: the configured seconds plus one second of grace.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.proc_timeout
            .map(|secs| Duration::from_secs(secs) + TIMEOUT_GRACE)
    }

    /// Poll period as a duration
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "INFO");
        assert_eq!(settings.regex, ".*");
        assert!(settings.ignore_regex.is_none());
        assert!(settings.proc_cmd.is_empty());
        assert!(settings.proc_timeout.is_none());
        assert_eq!(settings.period, 15);
        assert_eq!(settings.notifier, NotifierMode::Poll);
        assert!(settings.path_in.ends_with("in"));
        assert!(settings.path_fail.ends_with("fail"));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("hotspud.toml");

        let toml_content = r#"
log_level = "DEBUG"
regex = '.*\.csv'
ignore_regex = '.*\.tmp'
path_in = "/srv/spool/in"
proc_cmd = "/bin/true"
proc_timeout = 30
notifier = "native"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.log_level, "DEBUG");
        assert_eq!(settings.regex, r".*\.csv");
        assert_eq!(settings.ignore_regex.as_deref(), Some(r".*\.tmp"));
        assert_eq!(settings.path_in, PathBuf::from("/srv/spool/in"));
        assert_eq!(settings.proc_cmd, "/bin/true");
        assert_eq!(settings.proc_timeout, Some(30));
        assert_eq!(settings.notifier, NotifierMode::Native);
        // Untouched keys keep their defaults
        assert_eq!(settings.period, 15);
        assert_eq!(settings.settle_ms, 500);
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("hotspud.toml");

        let settings = Settings {
            period: 2,
            proc_timeout: Some(9),
            ..Settings::default()
        };

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.period, 2);
        assert_eq!(loaded.proc_timeout, Some(9));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.period, 15);
        assert_eq!(settings.regex, ".*");
    }

    #[test]
    fn test_command_timeout_adds_grace() {
        let mut settings = Settings::default();
        assert_eq!(settings.command_timeout(), None);

        settings.proc_timeout = Some(1);
        assert_eq!(settings.command_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_match_rule() {
        let settings = Settings {
            regex: r".*\.csv".to_string(),
            ignore_regex: Some(r".*skip.*".to_string()),
            ignore_directories: true,
            ..Settings::default()
        };

        let rule = settings.match_rule();
        assert_eq!(rule.patterns, vec![r".*\.csv".to_string()]);
        assert_eq!(rule.ignore_patterns, vec![r".*skip.*".to_string()]);
        assert!(!rule.case_sensitive);
        assert!(rule.ignore_directories);
    }
}
