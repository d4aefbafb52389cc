//! Work queue trait definition.
//!
//! The pipeline's only shared mutable state is a set of durable FIFO
//! lists plus one counter key for the seeder's high-water mark. All
//! access goes through this trait so stages can be tested against an
//! in-memory queue.

use async_trait::async_trait;

use crate::errors::QueueError;

/// Abstract interface for the durable FIFO work queues.
///
/// Ordering is FIFO per list: `push` appends to the tail, pops remove
/// from the head. Producers that want newest-first service push their
/// range in reverse.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Append payloads to the tail of a list. A no-op for an empty
    /// slice.
    async fn push(&self, queue: &str, payloads: &[String]) -> Result<(), QueueError>;

    /// Pop one payload from the head of a list, suspending until one
    /// is available.
    ///
    /// Implementations may wake up periodically and return `Ok(None)`
    /// so callers can observe a shutdown signal between pops.
    async fn pop_blocking(&self, queue: &str) -> Result<Option<String>, QueueError>;

    /// Pop up to `count` payloads from the head of a list without
    /// blocking. Returns an empty vector when the list is empty.
    async fn pop_many(&self, queue: &str, count: usize) -> Result<Vec<String>, QueueError>;

    /// Read a counter key. `None` when the key has never been set.
    async fn get_counter(&self, key: &str) -> Result<Option<u64>, QueueError>;

    /// Set a counter key.
    async fn set_counter(&self, key: &str, value: u64) -> Result<(), QueueError>;
}
