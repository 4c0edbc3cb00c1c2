//! Settings resolution: built-in defaults, then the settings file, then flags

use anyhow::{Context, Result};
use scanner_core::models::{LogLevel, Settings};
use std::path::{Path, PathBuf};

/// Values given on the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub modes_dir: Option<PathBuf>,
    pub default_mode: Option<String>,
    pub idle_timeout_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
    /// Number of `-v` flags
    pub verbosity: u8,
}

/// Load the settings file (explicit path or default location) and apply overrides
pub fn resolve_settings(config: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let settings = match config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Settings file not found: {}", path.display());
            }
            Settings::load_from_file(path)?
        }
        None => match Settings::default_config_path() {
            Some(path) => Settings::load_from_file(&path)
                .context("Failed to load default settings file")?,
            None => Settings::default(),
        },
    };

    let settings = apply_overrides(settings, overrides);

    if let Err(errors) = settings.validate() {
        anyhow::bail!("Invalid settings:\n  {}", errors.join("\n  "));
    }

    Ok(settings)
}

pub fn apply_overrides(mut settings: Settings, overrides: Overrides) -> Settings {
    if let Some(dir) = overrides.modes_dir {
        settings.modes_dir = dir;
    }
    if let Some(mode) = overrides.default_mode {
        settings.default_mode = mode;
    }
    if let Some(seconds) = overrides.idle_timeout_seconds {
        settings.idle_timeout_seconds = Some(seconds);
    }
    if let Some(seconds) = overrides.request_timeout_seconds {
        settings.request_timeout_seconds = seconds;
    }
    if overrides.verbosity > 0 {
        settings.log_level = Some(LogLevel::from_verbosity(overrides.verbosity));
    }
    settings
}
