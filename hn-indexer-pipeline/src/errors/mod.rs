//! Error types for the ingestion pipeline.

use hn_indexer_repository::{IndexError, QueueError, SourceError};
use thiserror::Error;

/// Errors that can occur in the ingestion pipeline.
///
/// Stage main loops handle their own item-level failures; an error of
/// this type escaping a stage's `run` means the stage cannot make
/// progress (or, for `Index(AuthRejected)`, must not).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from the seeder stage.
    #[error("Seeder error: {0}")]
    SeederError(String),

    /// Error from the fetcher stage.
    #[error("Fetcher error: {0}")]
    FetcherError(String),

    /// Error from the processor stage.
    #[error("Processor error: {0}")]
    ProcessorError(String),

    /// Error from the loader stage.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Error from the work queue.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Error from the source API.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Error from the index API.
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

impl PipelineError {
    /// Create a seeder error.
    pub fn seeder(msg: impl Into<String>) -> Self {
        Self::SeederError(msg.into())
    }

    /// Create a fetcher error.
    pub fn fetcher(msg: impl Into<String>) -> Self {
        Self::FetcherError(msg.into())
    }

    /// Create a processor error.
    pub fn processor(msg: impl Into<String>) -> Self {
        Self::ProcessorError(msg.into())
    }

    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }
}
