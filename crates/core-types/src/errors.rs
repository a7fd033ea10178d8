//! Flow parsing errors

use thiserror::Error;

/// Errors raised while materializing a flow document
#[derive(Debug, Error)]
pub enum FlowParseError {
    /// The document is not valid JSON or does not match the flow model
    /// (including an unknown step `type`)
    #[error("Invalid flow document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
