//! Recorded user-flow model
//!
//! Strongly-typed representation of a recorded browser journey:
//! - `Flow`: title, optional flow-level timeout, ordered steps
//! - `Step`: common routing fields plus a closed `StepKind` variant
//! - Selector candidate chains and asserted side-effect events
//!
//! The model is produced once (usually from recorder JSON) and only read by
//! the replay engine afterwards.

pub mod errors;
pub mod flow;
pub mod selector;
pub mod step;

pub use errors::FlowParseError;
pub use flow::{effective_timeout_ms, Flow, DEFAULT_STEP_TIMEOUT_MS};
pub use selector::{describe_selectors, SelectorChain};
pub use step::*;
