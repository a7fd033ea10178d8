use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flow_replay::{summarize, ReplaySettings};

use super::output::OutputFormat;
use super::runtime::read_flow;

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    /// Recorded flow (JSON)
    pub flow: PathBuf,

    /// Print JSON regardless of the global output format
    #[arg(long)]
    pub json: bool,
}

pub async fn cmd_inspect(
    args: InspectArgs,
    settings: &ReplaySettings,
    output: OutputFormat,
) -> Result<()> {
    let flow = read_flow(&args.flow).await?;
    let summary = summarize(&flow, settings);

    let format = if args.json { OutputFormat::Json } else { output };
    match format {
        OutputFormat::Human => print!("{}", summary),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to render summary")?
        ),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(&summary).context("Failed to render summary")?
        ),
    }
    Ok(())
}
