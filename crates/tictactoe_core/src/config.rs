//! Runtime configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Timing knobs for the background threads.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Period of the automated mover's timer, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    tick_interval_ms: u64,

    /// Consumer sleep between idle ticks, in milliseconds.
    #[serde(default = "default_consumer_idle_ms")]
    consumer_idle_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    2000
}

fn default_consumer_idle_ms() -> u64 {
    1
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            consumer_idle_ms: default_consumer_idle_ms(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(tick_interval_ms = config.tick_interval_ms, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()
    }

    /// Replaces the timer period.
    pub fn with_tick_interval_ms(self, tick_interval_ms: u64) -> Result<Self, ConfigError> {
        Self {
            tick_interval_ms,
            ..self
        }
        .validate()
    }

    /// Timer period as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Consumer idle sleep as a [`Duration`].
    pub fn consumer_idle(&self) -> Duration {
        Duration::from_millis(self.consumer_idle_ms)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::new("tick_interval_ms must be positive".to_string()));
        }
        Ok(self)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
