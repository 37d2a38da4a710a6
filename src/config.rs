//! Configuration types for the reminder subsystem.

use serde::{Deserialize, Serialize};
use siyam_times::TimesConfig;
use std::path::{Path, PathBuf};

use crate::error::{ReminderError, Result};
use crate::settings::ReminderSettings;

/// Top-level configuration, one TOML section per concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiyamConfig {
    /// Time-calculation service client.
    pub times: TimesConfig,
    /// Reminder preferences seeded into the settings store.
    pub reminders: ReminderSettings,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Also write a daily rolling log file under the logs directory.
    pub file: bool,
    /// Override for the log directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: false,
            directory: None,
        }
    }
}

impl SiyamConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ReminderError::Config(e.to_string()))
    }

    /// Load the file at `path` if it exists, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ReminderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `config_dir()/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::siyam_dirs::config_file()
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.times
            .validate()
            .map_err(|e| ReminderError::Config(e.to_string()))?;
        self.reminders.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(ReminderError::Config("logging.level must not be empty".into()));
        }
        Ok(())
    }
}
