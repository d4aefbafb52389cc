//! Error types for the repository clients.

mod index_error;
mod queue_error;
mod source_error;

pub use index_error::IndexError;
pub use queue_error::QueueError;
pub use source_error::SourceError;
