use std::path::Path;

use anyhow::{Context, Result};
use flow_replay::Flow;
use tokio::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

/// Read and parse a recorded flow document
pub async fn read_flow(path: &Path) -> Result<Flow> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read flow file {}", path.display()))?;
    Flow::from_json(&content)
        .with_context(|| format!("Failed to parse flow file {}", path.display()))
}
