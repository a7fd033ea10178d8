//! Flow definition and timeout resolution

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::FlowParseError;
use crate::step::Step;

/// Timeout applied when neither step, flow nor engine provides one
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 5000;

/// Recorded user flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Flow title
    pub title: String,

    /// Flow-level timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Steps, executed strictly in declaration order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub steps: Vec<Step>,
}

impl Flow {
    /// Create an empty flow
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            timeout: None,
            steps: Vec::new(),
        }
    }

    /// Set flow timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    /// Append a step
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse a recorder JSON document
    pub fn from_json(json: &str) -> Result<Self, FlowParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a recorder JSON document from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FlowParseError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize back to pretty JSON
    pub fn to_json(&self) -> Result<String, FlowParseError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Effective timeout for `step` under this flow
    pub fn timeout_for(&self, step: &Step, engine_default_ms: Option<u64>) -> u64 {
        effective_timeout_ms(step, self, engine_default_ms)
    }
}

/// First present value of `step.timeout`, `flow.timeout`, the engine default,
/// then [`DEFAULT_STEP_TIMEOUT_MS`].
pub fn effective_timeout_ms(step: &Step, flow: &Flow, engine_default_ms: Option<u64>) -> u64 {
    step.timeout
        .or(flow.timeout)
        .or(engine_default_ms)
        .unwrap_or(DEFAULT_STEP_TIMEOUT_MS)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Step>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Step>>::deserialize(deserializer)?.unwrap_or_default())
}
