//! Processor module for the ingestion pipeline.
//!
//! Transforms raw items into indexable chunks.

mod item_processor;

pub use item_processor::{AncestorResolution, ItemProcessor, ProcessorConfig};
