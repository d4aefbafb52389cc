//! Source API error types.

use thiserror::Error;

/// Errors that can occur while talking to the source API.
///
/// All source errors are transient from the pipeline's point of view:
/// the affected item is dropped (or its ancestor walk aborted) and
/// processing continues.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The HTTP request failed (network, timeout, non-success status).
    #[error("source request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be interpreted.
    #[error("source response invalid: {0}")]
    InvalidBody(String),
}

impl SourceError {
    /// Create an invalid-body error.
    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }
}
