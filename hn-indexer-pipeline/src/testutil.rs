//! In-memory fakes for the repository traits, shared by the stage
//! test modules.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use hn_indexer_repository::{
    ChunkIndexClient, IndexError, Listing, QueueError, SourceApi, SourceError, WorkQueue,
};
use hn_indexer_shared::{IndexChunk, Item, ItemType};

/// In-memory work queue. Pops are non-blocking: `pop_blocking`
/// returns `Ok(None)` when the list is empty, which matches the
/// real implementation's periodic-wakeup contract.
#[derive(Default)]
pub struct MemoryQueue {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot a list's payloads, head first.
    pub fn list(&self, queue: &str) -> Vec<String> {
        self.lists
            .lock()
            .unwrap()
            .get(queue)
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn push_front(&self, queue: &str, payload: &str) {
        self.lists
            .lock()
            .unwrap()
            .entry(queue.to_string())
            .or_default()
            .push_front(payload.to_string());
    }

    pub fn set(&self, key: &str, value: u64) {
        self.counters
            .lock()
            .unwrap()
            .insert(key.to_string(), value);
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn push(&self, queue: &str, payloads: &[String]) -> Result<(), QueueError> {
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(queue.to_string()).or_default();
        list.extend(payloads.iter().cloned());
        Ok(())
    }

    async fn pop_blocking(&self, queue: &str) -> Result<Option<String>, QueueError> {
        let popped = self
            .lists
            .lock()
            .unwrap()
            .get_mut(queue)
            .and_then(VecDeque::pop_front);
        if popped.is_none() {
            // Emulate the real implementation's bounded block.
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        Ok(popped)
    }

    async fn pop_many(&self, queue: &str, count: usize) -> Result<Vec<String>, QueueError> {
        let mut lists = self.lists.lock().unwrap();
        let Some(list) = lists.get_mut(queue) else {
            return Ok(Vec::new());
        };
        let take = count.min(list.len());
        Ok(list.drain(..take).collect())
    }

    async fn get_counter(&self, key: &str) -> Result<Option<u64>, QueueError> {
        Ok(self.counters.lock().unwrap().get(key).copied())
    }

    async fn set_counter(&self, key: &str, value: u64) -> Result<(), QueueError> {
        self.counters
            .lock()
            .unwrap()
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// In-memory source API backed by a fixed set of items.
#[derive(Default)]
pub struct StaticSource {
    items: HashMap<u64, Item>,
    failing_ids: Vec<u64>,
    max_item: u64,
    max_item_fails: bool,
    listings: HashMap<Listing, Vec<u64>>,
    failing_listings: Vec<Listing>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let mut source = Self::default();
        for item in items {
            source.items.insert(item.id, item);
        }
        source
    }

    pub fn insert(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    /// Make fetches of `id` fail with a source error.
    pub fn fail_item(&mut self, id: u64) {
        self.failing_ids.push(id);
    }

    pub fn set_max_item(&mut self, max: u64) {
        self.max_item = max;
    }

    pub fn fail_max_item(&mut self) {
        self.max_item_fails = true;
    }

    pub fn set_listing(&mut self, listing: Listing, ids: Vec<u64>) {
        self.listings.insert(listing, ids);
    }

    pub fn fail_listing(&mut self, listing: Listing) {
        self.failing_listings.push(listing);
    }
}

#[async_trait]
impl SourceApi for StaticSource {
    async fn item(&self, id: u64) -> Result<Option<Item>, SourceError> {
        if self.failing_ids.contains(&id) {
            return Err(SourceError::invalid_body("simulated fetch failure"));
        }
        Ok(self.items.get(&id).cloned())
    }

    async fn max_item(&self) -> Result<u64, SourceError> {
        if self.max_item_fails {
            return Err(SourceError::invalid_body("simulated maxitem failure"));
        }
        Ok(self.max_item)
    }

    async fn listing(&self, listing: Listing) -> Result<Vec<u64>, SourceError> {
        if self.failing_listings.contains(&listing) {
            return Err(SourceError::invalid_body("simulated listing failure"));
        }
        Ok(self.listings.get(&listing).cloned().unwrap_or_default())
    }
}

/// Index client that records uploaded chunks, optionally failing the
/// first N calls.
#[derive(Default)]
pub struct RecordingIndex {
    pub uploaded: Mutex<Vec<IndexChunk>>,
    fail_next: AtomicUsize,
    reject_auth: AtomicBool,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` uploads fail with a non-fatal rejection.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Make every upload fail with an auth rejection.
    pub fn reject_auth(&self) {
        self.reject_auth.store(true, Ordering::SeqCst);
    }

    pub fn uploaded_tracking_ids(&self) -> Vec<String> {
        self.uploaded
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.tracking_id.clone())
            .collect()
    }
}

#[async_trait]
impl ChunkIndexClient for RecordingIndex {
    async fn upsert_chunks(&self, chunks: &[IndexChunk]) -> Result<(), IndexError> {
        if self.reject_auth.load(Ordering::SeqCst) {
            return Err(IndexError::AuthRejected { status: 401 });
        }
        if self.fail_next.load(Ordering::SeqCst) > 0 {
            self.fail_next.fetch_sub(1, Ordering::SeqCst);
            return Err(IndexError::Rejected {
                status: 500,
                body: "simulated rejection".to_string(),
            });
        }
        self.uploaded.lock().unwrap().extend_from_slice(chunks);
        Ok(())
    }
}

/// A minimal story item for tests.
pub fn story(id: u64, title: &str) -> Item {
    Item {
        id,
        item_type: Some(ItemType::Story),
        title: Some(title.to_string()),
        ..Item::default()
    }
}

/// A minimal comment item for tests.
pub fn comment(id: u64, text: &str, parent: u64) -> Item {
    Item {
        id,
        item_type: Some(ItemType::Comment),
        text: Some(text.to_string()),
        parent: Some(parent),
        ..Item::default()
    }
}
