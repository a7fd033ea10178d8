//! Error types for selector resolution

use replay_primitives::DriverError;
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No candidate chain resolved before its deadline
    #[error("Could not find element for selectors: {0}")]
    SelectorNotFound(String),

    /// Multi-element evaluation exceeded its deadline
    #[error("Resolution timeout: {0}")]
    Timeout(String),

    /// No chain (or an empty chain) was supplied
    #[error("Selector list is empty")]
    EmptySelectors,

    /// Driver failure other than a deadline expiry
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl LocatorError {
    /// Check if the error came from a deadline rather than a driver fault
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            LocatorError::SelectorNotFound(_) | LocatorError::Timeout(_)
        )
    }
}
