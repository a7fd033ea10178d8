//! Flow Replay library
//!
//! Facade over the replay workspace plus the pieces the CLI shares with
//! integration tests (configuration and flow summaries).

pub mod config;
pub mod inspect;

pub use config::{load_config, LoadedConfig, ReplayConfig};
pub use inspect::{summarize, FlowSummary, StepSummary};

// Re-export the engine for embedders
pub use replay_core_types::{Flow, Step, StepKind};
pub use replay_locator::{DefaultElementResolver, ElementResolver, LocatorError};
pub use replay_flow::{
    NoopExtension, ReplayError, ReplayExtension, ReplaySettings, Runner, RunnerExtension,
    StepExecutor,
};
