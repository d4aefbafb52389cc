//! Chunk index API client.
//!
//! Concrete [`ChunkIndexClient`] implementation that POSTs chunk
//! batches to the index API's `/chunk` endpoint. The destination
//! dataset and the credential travel as headers on every request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::errors::IndexError;
use crate::interfaces::ChunkIndexClient;
use hn_indexer_shared::IndexChunk;

/// Header naming the destination dataset.
const DATASET_HEADER: &str = "TR-Dataset";

/// Request timeout for index API calls. Larger than the source
/// timeout since a batch upload carries real payload.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the chunk index API.
pub struct ChunkApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    dataset_id: String,
}

impl ChunkApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Index API base URL
    /// * `api_key` - Authorization credential
    /// * `dataset_id` - Destination dataset id
    pub fn new(base_url: &str, api_key: &str, dataset_id: &str) -> Result<Self, IndexError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, dataset_id = %dataset_id, "Created index API client");

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
            dataset_id: dataset_id.to_string(),
        })
    }
}

#[async_trait]
impl ChunkIndexClient for ChunkApiClient {
    async fn upsert_chunks(&self, chunks: &[IndexChunk]) -> Result<(), IndexError> {
        let url = format!("{}/chunk", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(DATASET_HEADER, self.dataset_id.as_str())
            .header(AUTHORIZATION, self.api_key.as_str())
            .json(&chunks)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(IndexError::AuthRejected {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(count = chunks.len(), "Uploaded chunk batch");
        Ok(())
    }
}
