//! Work queue error types.

use thiserror::Error;

/// Errors that can occur during queue operations.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Failed to establish a connection to the queue backend.
    #[error("queue connection error: {0}")]
    Connection(String),

    /// A queue command failed.
    #[error("queue command error: {0}")]
    Command(#[from] redis::RedisError),
}

impl QueueError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}
