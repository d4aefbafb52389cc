//! Loader stage for the ingestion pipeline.
//!
//! Pops raw item batches, runs them through the processor, uploads
//! the surviving chunks to the index API in one call, and records the
//! uploaded tracking ids on the sent audit list.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::processor::ItemProcessor;
use crate::{RAW_ITEMS_QUEUE, SENT_QUEUE};
use hn_indexer_repository::{ChunkIndexClient, WorkQueue};
use hn_indexer_shared::{IndexChunk, Item};

/// Configuration for the chunk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum raw items popped per batch.
    pub batch_size: usize,
    /// Sleep when the raw item queue is empty.
    pub poll_interval: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 120,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Loader that transforms and uploads raw item batches.
pub struct ChunkLoader {
    queue: Arc<dyn WorkQueue>,
    index: Arc<dyn ChunkIndexClient>,
    processor: ItemProcessor,
    config: LoaderConfig,
}

impl ChunkLoader {
    /// Create a new loader with default configuration.
    pub fn new(
        queue: Arc<dyn WorkQueue>,
        index: Arc<dyn ChunkIndexClient>,
        processor: ItemProcessor,
    ) -> Self {
        Self {
            queue,
            index,
            processor,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(
        queue: Arc<dyn WorkQueue>,
        index: Arc<dyn ChunkIndexClient>,
        processor: ItemProcessor,
        config: LoaderConfig,
    ) -> Self {
        Self {
            queue,
            index,
            processor,
            config,
        }
    }

    /// Run the load loop until the shutdown signal fires.
    ///
    /// Upload failures are non-fatal and the next batch is still
    /// processed, with one exception: an auth rejection from the
    /// index API propagates out so the process terminates loudly
    /// instead of silently dropping every batch.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), PipelineError> {
        info!(batch_size = self.config.batch_size, "Loader started");

        loop {
            let payloads = match self
                .queue
                .pop_many(RAW_ITEMS_QUEUE, self.config.batch_size)
                .await
            {
                Ok(payloads) => payloads,
                Err(e) => {
                    warn!(error = %e, "Raw item pop failed, backing off");
                    Vec::new()
                }
            };

            if payloads.is_empty() {
                debug!("No raw items pending");
                tokio::select! {
                    _ = shutdown.recv() => {
                        info!("Loader received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
                continue;
            }

            self.process_batch(payloads).await?;

            // Drain-friendly shutdown check between full batches.
            if !matches!(
                shutdown.try_recv(),
                Err(broadcast::error::TryRecvError::Empty)
            ) {
                info!("Loader received shutdown signal");
                break;
            }
        }

        Ok(())
    }

    /// Transform and upload one batch of raw item payloads.
    ///
    /// Returns the number of chunks accepted by the index. Only a
    /// fatal index error is returned as `Err`.
    async fn process_batch(&self, payloads: Vec<String>) -> Result<usize, PipelineError> {
        let mut chunks: Vec<IndexChunk> = Vec::with_capacity(payloads.len());

        for payload in &payloads {
            let item: Item = match serde_json::from_str(payload) {
                Ok(item) => item,
                Err(e) => {
                    // Never requeued, to avoid poison-pill loops.
                    warn!(error = %e, "Dropping malformed raw item payload");
                    continue;
                }
            };

            if let Some(chunk) = self.processor.process(&item).await {
                chunks.push(chunk);
            }
        }

        if chunks.is_empty() {
            debug!(popped = payloads.len(), "Batch produced no chunks");
            return Ok(0);
        }

        let count = chunks.len();
        match self.index.upsert_chunks(&chunks).await {
            Ok(()) => {
                debug!(count, "Uploaded chunk batch");
                self.record_sent(&chunks).await;
                Ok(count)
            }
            Err(e) if e.is_fatal() => {
                error!(error = %e, "Index API rejected credentials, terminating");
                Err(e.into())
            }
            Err(e) => {
                let tracking_ids: Vec<&str> =
                    chunks.iter().map(|c| c.tracking_id.as_str()).collect();
                error!(
                    error = %e,
                    ?tracking_ids,
                    "Chunk upload failed, batch dropped for manual replay"
                );
                Ok(0)
            }
        }
    }

    /// Append the batch's tracking ids to the sent audit list.
    /// Best-effort: a failure here never blocks forward progress.
    async fn record_sent(&self, chunks: &[IndexChunk]) {
        let tracking_ids: Vec<String> =
            chunks.iter().map(|c| c.tracking_id.clone()).collect();

        if let Err(e) = self.queue.push(SENT_QUEUE, &tracking_ids).await {
            warn!(error = %e, "Failed to record sent tracking ids");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{comment, story, MemoryQueue, RecordingIndex, StaticSource};
    use hn_indexer_shared::ItemType;

    fn loader_with(
        queue: Arc<MemoryQueue>,
        index: Arc<RecordingIndex>,
        source: StaticSource,
    ) -> ChunkLoader {
        ChunkLoader::new(queue, index, ItemProcessor::new(Arc::new(source)))
    }

    fn payload(item: &Item) -> String {
        serde_json::to_string(item).unwrap()
    }

    #[tokio::test]
    async fn uploads_batch_and_records_sent_ids() {
        let queue = Arc::new(MemoryQueue::new());
        let index = Arc::new(RecordingIndex::new());
        let loader = loader_with(queue.clone(), index.clone(), StaticSource::new());

        let batch = vec![payload(&story(1, "One")), payload(&story(2, "Two"))];
        let uploaded = loader.process_batch(batch).await.unwrap();

        assert_eq!(uploaded, 2);
        assert_eq!(index.uploaded_tracking_ids(), vec!["1", "2"]);
        assert_eq!(queue.list(SENT_QUEUE), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn malformed_payloads_are_dropped_not_requeued() {
        let queue = Arc::new(MemoryQueue::new());
        let index = Arc::new(RecordingIndex::new());
        let loader = loader_with(queue.clone(), index.clone(), StaticSource::new());

        let batch = vec!["{not json".to_string(), payload(&story(3, "Fine"))];
        let uploaded = loader.process_batch(batch).await.unwrap();

        assert_eq!(uploaded, 1);
        assert_eq!(index.uploaded_tracking_ids(), vec!["3"]);
        assert!(queue.list(RAW_ITEMS_QUEUE).is_empty());
    }

    #[tokio::test]
    async fn filtered_out_items_produce_no_upload() {
        let queue = Arc::new(MemoryQueue::new());
        let index = Arc::new(RecordingIndex::new());
        let loader = loader_with(queue.clone(), index.clone(), StaticSource::new());

        let untitled = Item {
            id: 4,
            item_type: Some(ItemType::Story),
            ..Item::default()
        };
        let uploaded = loader.process_batch(vec![payload(&untitled)]).await.unwrap();

        assert_eq!(uploaded, 0);
        assert!(index.uploaded_tracking_ids().is_empty());
        assert!(queue.list(SENT_QUEUE).is_empty());
    }

    #[tokio::test]
    async fn upload_rejection_is_not_fatal_and_skips_sent_log() {
        let queue = Arc::new(MemoryQueue::new());
        let index = Arc::new(RecordingIndex::new());
        index.fail_next(1);
        let loader = loader_with(queue.clone(), index.clone(), StaticSource::new());

        let first = loader.process_batch(vec![payload(&story(5, "Lost"))]).await;
        assert_eq!(first.unwrap(), 0);
        assert!(queue.list(SENT_QUEUE).is_empty());

        // The next batch still goes through.
        let second = loader.process_batch(vec![payload(&story(6, "Kept"))]).await;
        assert_eq!(second.unwrap(), 1);
        assert_eq!(index.uploaded_tracking_ids(), vec!["6"]);
        assert_eq!(queue.list(SENT_QUEUE), vec!["6"]);
    }

    #[tokio::test]
    async fn auth_rejection_is_fatal() {
        let queue = Arc::new(MemoryQueue::new());
        let index = Arc::new(RecordingIndex::new());
        index.reject_auth();
        let loader = loader_with(queue.clone(), index.clone(), StaticSource::new());

        let result = loader.process_batch(vec![payload(&story(7, "Doomed"))]).await;
        assert!(matches!(
            result,
            Err(PipelineError::Index(
                hn_indexer_repository::IndexError::AuthRejected { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn comment_batch_resolves_ancestors_through_source() {
        let queue = Arc::new(MemoryQueue::new());
        let index = Arc::new(RecordingIndex::new());
        let source = StaticSource::with_items(vec![story(10, "Root thread")]);
        let loader = loader_with(queue.clone(), index.clone(), source);

        let reply = comment(11, "nice", 10);
        loader.process_batch(vec![payload(&reply)]).await.unwrap();

        let uploaded = index.uploaded.lock().unwrap();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].metadata.top_parent_id, 10);
        assert_eq!(
            uploaded[0].metadata.parent_title.as_deref(),
            Some("Root thread")
        );
    }

    #[tokio::test]
    async fn run_processes_queued_batches_until_shutdown() {
        let queue = Arc::new(MemoryQueue::new());
        queue.push_front(RAW_ITEMS_QUEUE, &payload(&story(20, "Queued")));
        let index = Arc::new(RecordingIndex::new());
        let loader = Arc::new(ChunkLoader::with_config(
            queue.clone(),
            index.clone(),
            ItemProcessor::new(Arc::new(StaticSource::new())),
            LoaderConfig {
                batch_size: 10,
                poll_interval: Duration::from_millis(10),
            },
        ));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let worker = loader.clone();
        let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loader did not shut down")
            .unwrap()
            .unwrap();
        assert_eq!(index.uploaded_tracking_ids(), vec!["20"]);
    }
}
