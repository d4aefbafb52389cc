//! Redis-backed work queue.
//!
//! Concrete [`WorkQueue`] implementation over Redis lists. `push`
//! maps to `RPUSH`, blocking pops to `BLPOP`, batch pops to
//! `LPOP count`, and the counter surface to `GET`/`SET`. A
//! [`ConnectionManager`] handles reconnection; clones of it share one
//! multiplexed connection.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::errors::QueueError;
use crate::interfaces::WorkQueue;

/// How long a blocking pop waits before returning empty. Bounded so
/// callers get a chance to observe a shutdown signal between pops.
const BLOCKING_POP_TIMEOUT_SECS: f64 = 5.0;

/// Redis implementation of the work queue.
pub struct RedisQueue {
    conn: ConnectionManager,
}

impl RedisQueue {
    /// Connect to Redis at the given URL (e.g. `redis://localhost`).
    pub async fn connect(url: &str) -> Result<Self, QueueError> {
        let client =
            redis::Client::open(url).map_err(|e| QueueError::connection(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| QueueError::connection(e.to_string()))?;

        info!(url = %url, "Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl WorkQueue for RedisQueue {
    async fn push(&self, queue: &str, payloads: &[String]) -> Result<(), QueueError> {
        if payloads.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        let _: () = conn.rpush(queue, payloads).await?;
        Ok(())
    }

    async fn pop_blocking(&self, queue: &str) -> Result<Option<String>, QueueError> {
        let mut conn = self.conn.clone();
        let popped: Option<(String, String)> =
            conn.blpop(queue, BLOCKING_POP_TIMEOUT_SECS).await?;
        Ok(popped.map(|(_, payload)| payload))
    }

    async fn pop_many(&self, queue: &str, count: usize) -> Result<Vec<String>, QueueError> {
        let mut conn = self.conn.clone();
        let payloads: Vec<String> = conn.lpop(queue, NonZeroUsize::new(count)).await?;
        Ok(payloads)
    }

    async fn get_counter(&self, key: &str) -> Result<Option<u64>, QueueError> {
        let mut conn = self.conn.clone();
        let value: Option<u64> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_counter(&self, key: &str, value: u64) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }
}
