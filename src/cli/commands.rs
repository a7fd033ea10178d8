use clap::Subcommand;

use super::inspect::InspectArgs;
use super::rehearse::RehearseArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Show what a recorded flow will do: steps, targets, timeouts, selectors
    Inspect(InspectArgs),

    /// Run a flow against the in-memory driver and print every driver call
    Rehearse(RehearseArgs),
}
