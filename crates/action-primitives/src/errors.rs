//! Error types surfaced by driver implementations

use std::time::Duration;
use thiserror::Error;

/// Failures reported by the capability layer.
///
/// The engine passes these through unmodified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A bounded wait exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Navigation failed or was aborted
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Page, frame or element handle is gone
    #[error("Target closed: {0}")]
    TargetClosed(String),

    /// Element exists but cannot receive input
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Page script threw or returned an unusable value
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// Protocol / transport failure
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DriverError {
    /// Timeout error for `what` after `after`
    pub fn timed_out(what: impl std::fmt::Display, after: Duration) -> Self {
        DriverError::Timeout(format!("{} (after {}ms)", what, after.as_millis()))
    }

    /// Check if this error is a deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout(_))
    }
}
