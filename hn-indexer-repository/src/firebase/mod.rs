//! Hacker News Firebase API client.
//!
//! Concrete [`SourceApi`] implementation over HTTP. Endpoints follow
//! the public v0 API: `/item/{id}.json`, `/maxitem.json`, and the
//! listing endpoints (`/updates.json`, `/topstories.json`, ...).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::SourceError;
use crate::interfaces::{Listing, SourceApi};
use hn_indexer_shared::Item;

/// Request timeout for source API calls. Conservative so a hung
/// request cannot stall a fetcher for long.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the Hacker News Firebase API.
pub struct FirebaseClient {
    http: reqwest::Client,
    base_url: String,
}

/// Response shape of the `updates` endpoint, which wraps its ids in
/// an object unlike the plain-array story listings.
#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    items: Vec<u64>,
}

impl FirebaseClient {
    /// Create a new client against the given API base URL
    /// (e.g. `https://hacker-news.firebaseio.com/v0`).
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, "Created source API client");

        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl SourceApi for FirebaseClient {
    async fn item(&self, id: u64) -> Result<Option<Item>, SourceError> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        let item = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Option<Item>>()
            .await?;

        debug!(id, found = item.is_some(), "Fetched item");
        Ok(item)
    }

    async fn max_item(&self) -> Result<u64, SourceError> {
        let url = format!("{}/maxitem.json", self.base_url);
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        body.trim()
            .parse::<u64>()
            .map_err(|e| SourceError::invalid_body(format!("maxitem not an integer: {}", e)))
    }

    async fn listing(&self, listing: Listing) -> Result<Vec<u64>, SourceError> {
        let url = format!("{}/{}.json", self.base_url, listing.endpoint());
        let response = self.http.get(&url).send().await?.error_for_status()?;

        let ids = match listing {
            Listing::Updates => response.json::<UpdatesResponse>().await?.items,
            _ => response.json::<Vec<u64>>().await?,
        };

        debug!(listing = ?listing, count = ids.len(), "Fetched listing");
        Ok(ids)
    }
}
