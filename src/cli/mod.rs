use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::inventory::{InventoryBuilder, RegistryMode};
use crate::key::{path, KeyKind, KeyLineParser, OptionsPolicy, PublicKeyRecord};

#[derive(Parser)]
#[command(name = "pubkey")]
#[command(about = "Inventory OpenSSH public keys by account")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print the public-key inventory as JSON")]
    Inventory {
        #[arg(short, long)]
        registry: Option<PathBuf>,

        #[arg(long)]
        strict: bool,

        #[arg(long)]
        compact: bool,
    },

    #[command(about = "Parse a single public-key file")]
    Parse {
        file: PathBuf,

        #[arg(long)]
        concatenate_options: bool,

        #[arg(long)]
        check: bool,
    },

    #[command(about = "Print the conventional path of a key")]
    Path {
        dir: String,

        #[arg(short = 't', long = "type", default_value = path::DEFAULT_KEY_TYPE)]
        key_type: String,

        #[arg(long)]
        private: bool,
    },

    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Generate example configuration")]
    Init {
        #[arg(long)]
        force: bool,
    },

    #[command(about = "Validate configuration")]
    Validate,
}

/// Output of the `parse` command
#[derive(Debug, Serialize)]
pub struct ParseReport {
    #[serde(flatten)]
    pub record: PublicKeyRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<KeyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl ParseReport {
    pub fn new(record: PublicKeyRecord) -> Self {
        let fingerprint = match record.fingerprint() {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                debug!("skipping fingerprint: {}", e);
                None
            }
        };

        Self {
            alias: record.kind(),
            fingerprint,
            record,
        }
    }
}

/// Write the example configuration without loading the current one
///
/// Writes to `config_path` when given, otherwise to the default location.
pub fn init_config(config_path: Option<&Path>, force: bool) -> Result<String> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?,
    };

    Config::write_example(&path, force)?;
    info!(path = %path.display(), "wrote example configuration");
    Ok(format!("Example configuration written to {}", path.display()))
}

pub struct CliHandler {
    config: Config,
    config_path: Option<PathBuf>,
}

impl CliHandler {
    pub async fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_config(config_path.clone()).await?;
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        let output = self.render(command).await?;
        if !output.is_empty() {
            println!("{}", output);
        }
        Ok(())
    }

    /// Run a command and return what it would print
    pub async fn render(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Inventory {
                registry,
                strict,
                compact,
            } => self.inventory(registry, strict, compact),
            Commands::Parse {
                file,
                concatenate_options,
                check,
            } => self.parse(file, concatenate_options, check),
            Commands::Path {
                dir,
                key_type,
                private,
            } => Ok(path::ssh_key_path(&dir, &key_type, !private)?),
            Commands::Config { action } => self.handle_config_action(action),
        }
    }

    fn inventory(&self, registry: Option<PathBuf>, strict: bool, compact: bool) -> Result<String> {
        let registry = registry.unwrap_or_else(|| self.config.registry.clone());
        let mode = if strict {
            RegistryMode::Strict
        } else {
            self.config.registry_mode
        };

        info!(registry = %registry.display(), ?mode, "collecting public keys");
        let inventory =
            InventoryBuilder::new(self.config.parser()).build_from_registry_file(&registry, mode)?;
        debug!(accounts = inventory.len(), "inventory built");

        let json = if compact {
            serde_json::to_string(&inventory)?
        } else {
            serde_json::to_string_pretty(&inventory)?
        };
        Ok(json)
    }

    fn parse(&self, file: PathBuf, concatenate_options: bool, check: bool) -> Result<String> {
        let parser = if concatenate_options {
            KeyLineParser::new(OptionsPolicy::Concatenate)
        } else {
            self.config.parser()
        };

        let record = parser.parse_file(&file)?;
        if check {
            record.check_blob()?;
        }

        Ok(serde_json::to_string_pretty(&ParseReport::new(record))?)
    }

    fn handle_config_action(&self, action: ConfigAction) -> Result<String> {
        match action {
            ConfigAction::Show => Ok(toml::to_string_pretty(&self.config)?),
            ConfigAction::Init { force } => init_config(self.config_path.as_deref(), force),
            // Config is already loaded and validated in CliHandler::new()
            ConfigAction::Validate => Ok("Configuration is valid".to_string()),
        }
    }
}
