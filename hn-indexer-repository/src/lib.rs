//! # HN Indexer Repository
//!
//! This crate provides traits and implementations for the external
//! collaborators of the ingestion pipeline: the Hacker News source
//! API, the chunk index API, and the Redis-backed work queues.
//! Pipeline code depends only on the trait interfaces, so each
//! backend can be swapped for a mock in tests.

pub mod chunk_api;
pub mod errors;
pub mod firebase;
pub mod interfaces;
pub mod queue;

pub use chunk_api::ChunkApiClient;
pub use errors::{IndexError, QueueError, SourceError};
pub use firebase::FirebaseClient;
pub use interfaces::{ChunkIndexClient, Listing, SourceApi, WorkQueue};
pub use queue::RedisQueue;
