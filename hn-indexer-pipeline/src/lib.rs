//! # HN Indexer Pipeline
//!
//! This crate provides the pipeline stages for mirroring the Hacker
//! News API into the chunk index.
//!
//! ## Architecture
//!
//! Data flows one-directionally through two durable queues:
//!
//! 1. **Seeder**: Enumerates candidate item ids onto the frontier queue
//! 2. **Fetcher**: Pops ids, fetches items, filters tombstones, queues raw items
//! 3. **Processor**: Transforms raw items into index chunks
//! 4. **Loader**: Uploads chunk batches and records sent tracking ids
//! 5. **Orchestrator**: Runs the stages as tasks and coordinates shutdown

pub mod errors;
pub mod fetcher;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod seeder;

#[cfg(test)]
pub(crate) mod testutil;

pub use errors::PipelineError;

/// Frontier list: item ids awaiting fetch.
pub const TO_VISIT_QUEUE: &str = "tovisit";

/// Raw item list: fetched items awaiting transform and upload.
pub const RAW_ITEMS_QUEUE: &str = "hn";

/// Best-effort audit list of uploaded tracking ids.
pub const SENT_QUEUE: &str = "sent";

/// Counter key holding the highest item id the seeder has enqueued.
pub const HIGH_WATER_MARK_KEY: &str = "last_final";
