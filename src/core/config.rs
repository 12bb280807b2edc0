//! Console configuration
//!
//! Loaded from an optional TOML file. Every field has a default so a partial
//! file (or none at all) is valid.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration for the interactive console
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// `tracing_subscriber` filter directive, used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Pretty-print response envelopes
    pub pretty: bool,

    /// Prompt shown by the REPL
    pub prompt: String,

    /// Longest accepted command in bytes; 0 disables the limit
    ///
    /// Longer commands are answered with the same envelope as a syntax error
    /// and never reach the dispatcher.
    pub max_command_len: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_filter: "gm_command=info".to_string(),
            pretty: false,
            prompt: "gm> ".to_string(),
            max_command_len: 4096,
        }
    }
}

/// Error type for config loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConsoleConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ConsoleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".into()));
        }
        Ok(())
    }

    /// Whether a command exceeds the configured length limit
    pub fn exceeds_limit(&self, command: &str) -> bool {
        self.max_command_len != 0 && command.len() > self.max_command_len
    }
}
