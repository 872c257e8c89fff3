//! Configuration management for pubkey
//!
//! This module handles loading, validating, and generating the TOML
//! configuration that drives inventory collection.

use crate::inventory::{RegistryMode, DEFAULT_REGISTRY_PATH};
use crate::key::{KeyLineParser, OptionsPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "PUBKEY_CONFIG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Validation error
    #[error("Config validation failed: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Registry of exported `account:path` pairs
    #[serde(default = "default_registry")]
    pub registry: PathBuf,

    /// Where leading key options are stored
    #[serde(default)]
    pub options_policy: OptionsPolicy,

    /// Treatment of registry lines that are not entries
    #[serde(default)]
    pub registry_mode: RegistryMode,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_registry() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTRY_PATH)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            options_policy: OptionsPolicy::default(),
            registry_mode: RegistryMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Checks in order:
    /// 1. Path from PUBKEY_CONFIG environment variable
    /// 2. ~/.config/pubkey/config.toml
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                let mut config = Self::default();
                config.expand_paths();
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml_str)?;
        config.expand_paths();
        config.validate_config()?;
        Ok(config)
    }

    /// Load configuration with optional custom path (async wrapper)
    pub async fn load_config(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_path(&path),
            None => Self::load(),
        }
    }

    /// Default config file location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pubkey").join("config.toml"))
    }

    /// Find configuration file path
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        Self::default_config_path().filter(|p| p.exists())
    }

    /// Expand tilde in paths
    fn expand_paths(&mut self) {
        self.registry = expand_path(&self.registry);
    }

    /// Validate configuration values
    fn validate_config(&self) -> Result<(), ConfigError> {
        if self.registry.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "registry must not be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }

        Ok(())
    }

    /// Parser configured with this config's options policy
    pub fn parser(&self) -> KeyLineParser {
        KeyLineParser::new(self.options_policy)
    }

    /// Write the example configuration to `path`
    pub fn write_example(path: &Path, force: bool) -> Result<(), ConfigError> {
        if !force && path.exists() {
            return Err(ConfigError::Validation(
                "Config file already exists. Use --force to overwrite.".to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::generate_example())?;
        Ok(())
    }

    /// Generate example configuration file
    pub fn generate_example() -> String {
        let config = Config::default();

        format!(
            r#"# pubkey Configuration File
# Location: ~/.config/pubkey/config.toml

# Registry of exported keys, one account:path pair per line
registry = "{}"

# Where authorized_keys options in front of the key type go:
# "separate" keeps them in their own field, "concatenate" prefixes the type
options_policy = "separate"

# "lenient" skips registry lines that are not account:path pairs,
# "strict" rejects them
registry_mode = "lenient"

# Logging level (trace, debug, info, warn, error)
log_level = "{}"
"#,
            config.registry.display(),
            config.log_level
        )
    }
}

/// Expand tilde in path
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(path_str.as_ref());
    PathBuf::from(expanded.into_owned())
}
