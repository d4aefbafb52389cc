//! # HN Indexer Shared
//!
//! Shared data types for the Hacker News search indexer system:
//! the source API's item representation and the chunk document
//! uploaded to the search index.

pub mod chunk;
pub mod item;

pub use chunk::{ChunkMetadata, IndexChunk, RankingPhrase};
pub use item::{Item, ItemType};
