use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use super::commands::Commands;
use super::env::CliArgs;
use super::runtime::init_logging;
use super::{cmd_inspect, cmd_rehearse};
use flow_replay::{load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let LoadedConfig {
        config,
        path,
        found,
    } = load_config(cli.config.as_ref()).await?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    init_logging(&level, cli.debug)?;

    info!("Starting flow-replay v{}", env!("CARGO_PKG_VERSION"));
    if found {
        info!("Loaded configuration from: {}", path.display());
    } else {
        warn!("Config file not found, using defaults: {}", path.display());
    }

    let settings = config.settings();
    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect(args, &settings, cli.output).await,
        Commands::Rehearse(args) => cmd_rehearse(args, settings).await,
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
