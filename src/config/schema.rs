//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! default every field, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::backend::Format;
use crate::config::ConfigError;
use crate::level::Level;

/// Root configuration of the demo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Logger construction knobs.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Logging configuration.
///
/// Kept as raw strings so that a bad value is reported with the text the
/// operator wrote, at logger construction time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format (console, json).
    pub format: String,

    /// Minimum level (debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn format(&self) -> Result<Format, ConfigError> {
        self.format.parse()
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        self.level.parse()
    }
}
