//! Index API error types.

use thiserror::Error;

/// Errors that can occur while uploading chunks to the index API.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The HTTP request itself failed (network, timeout).
    #[error("index request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The index API rejected the credentials. This indicates a
    /// configuration error and must terminate the process rather than
    /// silently drop data.
    #[error("index API rejected credentials (status {status})")]
    AuthRejected { status: u16 },

    /// The index API rejected the batch for any other reason. The
    /// caller logs the batch's tracking ids for manual replay and
    /// continues.
    #[error("index API rejected batch (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

impl IndexError {
    /// Whether this error should terminate the uploader instead of
    /// being logged and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IndexError::AuthRejected { .. })
    }
}
