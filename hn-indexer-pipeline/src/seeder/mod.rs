//! Frontier seeder for the ingestion pipeline.
//!
//! Enumerates candidate item ids onto the frontier queue: the id
//! range above the high-water mark on every cycle, plus the listing
//! endpoints on bootstrap. Re-seeding an already-processed id is
//! harmless because the index upserts by tracking id.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::errors::PipelineError;
use crate::{HIGH_WATER_MARK_KEY, TO_VISIT_QUEUE};
use hn_indexer_repository::{Listing, SourceApi, WorkQueue};

/// Ids per push command, so a large backfill range does not become a
/// single oversized queue command.
const SEED_PUSH_CHUNK: usize = 1000;

/// Configuration for the frontier seeder.
#[derive(Debug, Clone)]
pub struct SeederConfig {
    /// Sleep between refresh cycles.
    pub interval: Duration,
    /// How far below the current max id to start when no high-water
    /// mark exists yet.
    pub backfill_window: u64,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            backfill_window: 10_000,
        }
    }
}

/// Seeder that keeps the frontier queue topped up with candidate ids.
pub struct FrontierSeeder {
    queue: Arc<dyn WorkQueue>,
    source: Arc<dyn SourceApi>,
    config: SeederConfig,
}

impl FrontierSeeder {
    /// Create a new seeder with default configuration.
    pub fn new(queue: Arc<dyn WorkQueue>, source: Arc<dyn SourceApi>) -> Self {
        Self {
            queue,
            source,
            config: SeederConfig::default(),
        }
    }

    /// Create a new seeder with custom configuration.
    pub fn with_config(
        queue: Arc<dyn WorkQueue>,
        source: Arc<dyn SourceApi>,
        config: SeederConfig,
    ) -> Self {
        Self {
            queue,
            source,
            config,
        }
    }

    /// Seed the frontier from the listing endpoints.
    ///
    /// Ids are not deduplicated against history. A single listing's
    /// failure is logged and skipped; the remaining listings still
    /// run.
    #[instrument(skip(self))]
    pub async fn seed_listings(&self) -> Result<usize, PipelineError> {
        let mut queued = 0;

        for listing in Listing::ALL {
            match self.source.listing(listing).await {
                Ok(ids) => {
                    let payloads: Vec<String> = ids.iter().map(u64::to_string).collect();
                    self.queue.push(TO_VISIT_QUEUE, &payloads).await?;
                    queued += payloads.len();
                }
                Err(e) => {
                    warn!(listing = ?listing, error = %e, "Listing fetch failed, skipping");
                }
            }
        }

        info!(queued, "Seeded listing endpoints");
        Ok(queued)
    }

    /// Run refresh cycles until the shutdown signal fires.
    ///
    /// A failed cycle is logged and retried on the next interval.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), PipelineError> {
        info!(interval = ?self.config.interval, "Seeder started");

        loop {
            if let Err(e) = self.seed_cycle().await {
                warn!(error = %e, "Seed cycle failed, retrying next interval");
            }

            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Seeder received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        Ok(())
    }

    /// Enqueue every id above the high-water mark, newest first, then
    /// advance the mark.
    ///
    /// A crash between pushes leaves the mark behind some already
    /// pushed ids; the next cycle re-seeds them, which is idempotent.
    pub async fn seed_cycle(&self) -> Result<u64, PipelineError> {
        let max = self.source.max_item().await?;
        let high_water_mark = match self.queue.get_counter(HIGH_WATER_MARK_KEY).await? {
            Some(mark) => mark,
            None => max.saturating_sub(self.config.backfill_window),
        };

        if max <= high_water_mark {
            debug!(max, high_water_mark, "No new items to seed");
            return Ok(0);
        }

        // Newest first, so fresh items surface ahead of the backfill.
        let ids: Vec<String> = (high_water_mark + 1..=max)
            .rev()
            .map(|id| id.to_string())
            .collect();

        for chunk in ids.chunks(SEED_PUSH_CHUNK) {
            self.queue.push(TO_VISIT_QUEUE, chunk).await?;
        }
        self.queue.set_counter(HIGH_WATER_MARK_KEY, max).await?;

        info!(
            from = high_water_mark + 1,
            to = max,
            queued = ids.len(),
            "Seeded id range"
        );
        Ok(ids.len() as u64)
    }
}
