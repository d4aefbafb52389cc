//! Fetcher stage for the ingestion pipeline.
//!
//! Pops item ids from the frontier, fetches them from the source API,
//! filters out tombstoned items, and queues survivors as raw item
//! payloads. Best-effort: a failed fetch drops the id with no retry
//! and no requeue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::errors::PipelineError;
use crate::{RAW_ITEMS_QUEUE, TO_VISIT_QUEUE};
use hn_indexer_repository::{SourceApi, WorkQueue};
use hn_indexer_shared::Item;

/// Backoff after a queue error before the next pop attempt.
const POP_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Fetcher that turns frontier ids into raw item payloads.
///
/// Any number of fetchers may run concurrently against the same
/// frontier; the queue's atomic pop is the only coordination.
pub struct Fetcher {
    queue: Arc<dyn WorkQueue>,
    source: Arc<dyn SourceApi>,
}

impl Fetcher {
    /// Create a new fetcher.
    pub fn new(queue: Arc<dyn WorkQueue>, source: Arc<dyn SourceApi>) -> Self {
        Self { queue, source }
    }

    /// Run the fetch loop until the shutdown signal fires.
    ///
    /// A single id's failure never terminates the loop.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), PipelineError> {
        info!("Fetcher started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Fetcher received shutdown signal");
                    break;
                }
                popped = self.queue.pop_blocking(TO_VISIT_QUEUE) => {
                    match popped {
                        Ok(Some(payload)) => self.handle_frontier_entry(&payload).await,
                        // Periodic wakeup with nothing pending.
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, "Frontier pop failed, backing off");
                            tokio::time::sleep(POP_RETRY_DELAY).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Process one frontier entry end to end.
    pub async fn handle_frontier_entry(&self, payload: &str) {
        let id: u64 = match payload.trim().parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(payload, "Dropping malformed frontier entry");
                return;
            }
        };

        let item = match self.fetch_filtered(id).await {
            Some(item) => item,
            None => return,
        };

        let serialized = match serde_json::to_string(&item) {
            Ok(json) => json,
            Err(e) => {
                warn!(id, error = %e, "Failed to serialize item, dropping");
                return;
            }
        };

        if let Err(e) = self.queue.push(RAW_ITEMS_QUEUE, &[serialized]).await {
            warn!(id, error = %e, "Failed to queue raw item, dropping");
        }
    }

    /// Fetch an item and apply the tombstone filter.
    ///
    /// Returns `None` for fetch failures, null items, and tombstoned
    /// items; all are dropped silently apart from a debug log.
    async fn fetch_filtered(&self, id: u64) -> Option<Item> {
        let item = match self.source.item(id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!(id, "Item is null, dropping");
                return None;
            }
            Err(e) => {
                debug!(id, error = %e, "Item fetch failed, dropping");
                return None;
            }
        };

        if item.is_tombstoned() {
            debug!(id, "Item is tombstoned, dropping");
            return None;
        }

        Some(item)
    }
}
