//! Configuration data structures

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODES_DIR: &str = "modes";
pub const DEFAULT_MODE_NAME: &str = "DEFAULT";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Logging level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    #[default]
    Warn,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "trace")]
    Trace,
}

impl LogLevel {
    /// Map a `-v` repetition count onto a level
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Settings file contents. Every field can be overridden on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory containing mode definition files
    pub modes_dir: PathBuf,
    /// Mode active at startup and target of idle reverts
    pub default_mode: String,
    /// Seconds without a scan before reverting to the default mode (None = never)
    pub idle_timeout_seconds: Option<u64>,
    /// Request timeout for modes that do not set their own
    pub request_timeout_seconds: u64,
    /// Logging verbosity; `-v` flags take precedence when given
    pub log_level: Option<LogLevel>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            modes_dir: PathBuf::from(DEFAULT_MODES_DIR),
            default_mode: DEFAULT_MODE_NAME.to_string(),
            idle_timeout_seconds: None,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: None,
        }
    }
}

impl Settings {
    /// Load settings from file. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(settings)
    }

    /// `<config dir>/scanner/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scanner").join("config.toml"))
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.idle_timeout_seconds == Some(0) {
            errors.push("idle_timeout_seconds must be at least 1 (omit it to disable)".to_string());
        }
        if self.request_timeout_seconds == 0 {
            errors.push("request_timeout_seconds must be at least 1".to_string());
        }
        if self.default_mode.trim().is_empty() {
            errors.push("default_mode cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
