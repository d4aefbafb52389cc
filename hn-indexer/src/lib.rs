//! # HN Indexer
//!
//! Main library for the Hacker News search indexer.
//!
//! This crate provides the entry point and configuration for running
//! the ingestion pipeline.

pub mod config;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error. Fatal at startup.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] hn_indexer_pipeline::PipelineError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
