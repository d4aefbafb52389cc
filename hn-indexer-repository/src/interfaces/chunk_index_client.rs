//! Chunk index client trait definition.

use async_trait::async_trait;

use crate::errors::IndexError;
use hn_indexer_shared::IndexChunk;

/// Abstract interface for the write side of the search index.
///
/// The index upserts by `tracking_id`, so re-uploading a chunk is
/// idempotent and the pipeline never needs to deduplicate upstream.
#[async_trait]
pub trait ChunkIndexClient: Send + Sync {
    /// Upload a batch of chunks in a single call.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The batch was accepted
    /// * `Err(IndexError::AuthRejected)` - Credentials rejected; fatal
    /// * `Err(IndexError)` - Any other failure; the caller logs the
    ///   batch for manual replay and continues
    async fn upsert_chunks(&self, chunks: &[IndexChunk]) -> Result<(), IndexError>;
}
