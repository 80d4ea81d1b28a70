//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::validate_config;

/// Error type for configuration loading and logger construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid log level {0:?}: expected one of debug, info, warn, error")]
    InvalidLevel(String),

    #[error("invalid log format {0:?}: expected one of console, json")]
    InvalidFormat(String),

    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ConfigError>),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
