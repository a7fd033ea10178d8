//! Flow replay engine
//!
//! Walks a recorded [`Flow`](replay_core_types::Flow) step by step against a
//! driver-controlled browser:
//! - `Runner` sequences steps through the `RunnerExtension` lifecycle hooks
//! - `StepExecutor` resolves each step's page, frame and elements, then drives
//!   the action while awaiting any asserted navigation
//! - `TargetResolver` maps a step's `target` / `frame` path to live handles

pub mod errors;
pub mod executor;
pub mod extension;
pub mod runner;
pub mod settings;
pub mod target;

pub use errors::ReplayError;
pub use executor::{click_options, type_diff, StepExecutor, TypeDiff};
pub use extension::{NoopExtension, ReplayExtension, RunnerExtension};
pub use runner::Runner;
pub use settings::ReplaySettings;
pub use target::{StepContext, TargetResolver};
