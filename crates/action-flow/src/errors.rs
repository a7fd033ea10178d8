//! Replay error types

use replay_locator::LocatorError;
use replay_primitives::DriverError;
use thiserror::Error;

/// Errors that abort a replay
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Neither a page nor a frame matched the step's target
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// Every selector chain timed out
    #[error("Could not find element for selectors: {0}")]
    SelectorNotFound(String),

    /// Asserted event kind the engine cannot wait for
    #[error("Unsupported asserted event type: {0}")]
    UnsupportedEventType(String),

    /// A bounded engine-side wait expired
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Frame path index past the end of the child frame list
    #[error("Frame index {index} out of range ({available} child frames)")]
    InvalidFrameIndex { index: usize, available: usize },

    /// Capability layer failure, passed through unmodified
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Failure raised by an embedder's hook
    #[error("Extension error: {0}")]
    Extension(String),
}

impl ReplayError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ReplayError::Timeout(_) => true,
            ReplayError::Driver(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<LocatorError> for ReplayError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::SelectorNotFound(selectors) => ReplayError::SelectorNotFound(selectors),
            LocatorError::EmptySelectors => {
                ReplayError::SelectorNotFound("(no selectors recorded)".to_string())
            }
            LocatorError::Timeout(message) => ReplayError::Timeout(message),
            LocatorError::Driver(e) => ReplayError::Driver(e),
        }
    }
}
