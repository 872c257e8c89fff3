//! pubkey - OpenSSH public-key inventory
//!
//! This is the main entry point for the pubkey command line tool.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pubkey::cli::{init_config, Cli, CliHandler, Commands, ConfigAction};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // init must work when the current config is missing or invalid
    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        println!("{}", init_config(cli.config.as_deref(), *force)?);
        return Ok(());
    }

    let handler = CliHandler::new(cli.config.clone()).await?;

    // Initialize logging; stdout is reserved for command output
    let log_level = if cli.verbose {
        "debug"
    } else {
        handler.config().log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pubkey={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("pubkey v{}", env!("CARGO_PKG_VERSION"));

    handler.handle_command(cli.command).await?;

    Ok(())
}
