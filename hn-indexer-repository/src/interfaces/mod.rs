//! Trait interfaces for the repository clients.

mod chunk_index_client;
mod source_api;
mod work_queue;

pub use chunk_index_client::ChunkIndexClient;
pub use source_api::{Listing, SourceApi};
pub use work_queue::WorkQueue;
