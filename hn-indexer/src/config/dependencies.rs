//! Dependency initialization and wiring for the indexer.
//!
//! Each stage owns its queue and HTTP client handles, constructed
//! once here and passed in explicitly.

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::IndexingError;
use hn_indexer_pipeline::{
    fetcher::Fetcher,
    loader::{ChunkLoader, LoaderConfig},
    orchestrator::{Orchestrator, OrchestratorConfig},
    processor::{ItemProcessor, ProcessorConfig},
    seeder::{FrontierSeeder, SeederConfig},
};
use hn_indexer_repository::{
    ChunkApiClient, ChunkIndexClient, FirebaseClient, RedisQueue, SourceApi, WorkQueue,
};

/// Default source API base URL.
const DEFAULT_SOURCE_API_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Default raw items per upload batch.
const DEFAULT_BATCH_SIZE: usize = 120;

/// Default boost factor for story titles.
const DEFAULT_STORY_BOOST_FACTOR: f64 = 1.5;

/// Default distance factor for comment thread titles.
const DEFAULT_COMMENT_DISTANCE_FACTOR: f64 = 1.3;

/// Default seconds between seeder refresh cycles.
const DEFAULT_SEED_INTERVAL_SECS: u64 = 30;

/// Default id backfill window when no high-water mark exists.
const DEFAULT_SEED_BACKFILL_WINDOW: u64 = 10_000;

/// Default number of concurrent fetchers.
const DEFAULT_FETCHER_COUNT: usize = 4;

/// Runtime settings loaded from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub redis_url: String,
    pub api_base_url: String,
    pub api_key: String,
    pub dataset_id: String,
    pub source_api_url: String,
    pub batch_size: usize,
    pub story_boost_factor: f64,
    pub comment_distance_factor: f64,
    pub seed_interval: Duration,
    pub seed_backfill_window: u64,
    pub fetcher_count: usize,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required: `REDIS_URL`, `API_BASE_URL`, `API_KEY`, `DATASET_ID`.
    ///
    /// Optional: `SOURCE_API_URL`, `BATCH_SIZE`, `STORY_BOOST_FACTOR`,
    /// `COMMENT_DISTANCE_FACTOR`, `SEED_INTERVAL_SECS`,
    /// `SEED_BACKFILL_WINDOW`, `FETCHER_COUNT`.
    pub fn from_env() -> Result<Self, IndexingError> {
        Ok(Self {
            redis_url: require("REDIS_URL")?,
            api_base_url: require("API_BASE_URL")?,
            api_key: require("API_KEY")?,
            dataset_id: require("DATASET_ID")?,
            source_api_url: env::var("SOURCE_API_URL")
                .unwrap_or_else(|_| DEFAULT_SOURCE_API_URL.to_string()),
            batch_size: parse_or("BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            story_boost_factor: parse_or("STORY_BOOST_FACTOR", DEFAULT_STORY_BOOST_FACTOR)?,
            comment_distance_factor: parse_or(
                "COMMENT_DISTANCE_FACTOR",
                DEFAULT_COMMENT_DISTANCE_FACTOR,
            )?,
            seed_interval: Duration::from_secs(parse_or(
                "SEED_INTERVAL_SECS",
                DEFAULT_SEED_INTERVAL_SECS,
            )?),
            seed_backfill_window: parse_or("SEED_BACKFILL_WINDOW", DEFAULT_SEED_BACKFILL_WINDOW)?,
            fetcher_count: parse_or("FETCHER_COUNT", DEFAULT_FETCHER_COUNT)?,
        })
    }
}

/// Read a required environment variable.
fn require(name: &str) -> Result<String, IndexingError> {
    env::var(name).map_err(|_| IndexingError::config(format!("{} is required", name)))
}

/// Read an optional environment variable, parsing it into `T`.
/// An unparseable value is a configuration error, not a silent default.
fn parse_or<T>(name: &str, default: T) -> Result<T, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| IndexingError::config(format!("{} is invalid: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    pub async fn new() -> Result<Self, IndexingError> {
        let settings = Settings::from_env()?;
        Self::from_settings(settings).await
    }

    /// Initialize all dependencies from explicit settings.
    pub async fn from_settings(settings: Settings) -> Result<Self, IndexingError> {
        info!(
            source_api_url = %settings.source_api_url,
            api_base_url = %settings.api_base_url,
            dataset_id = %settings.dataset_id,
            batch_size = settings.batch_size,
            fetcher_count = settings.fetcher_count,
            "Initializing dependencies"
        );

        let queue: Arc<dyn WorkQueue> = Arc::new(
            RedisQueue::connect(&settings.redis_url)
                .await
                .map_err(|e| {
                    IndexingError::config(format!("Failed to connect to Redis: {}", e))
                })?,
        );
        info!("Queue connection verified");

        let source: Arc<dyn SourceApi> = Arc::new(
            FirebaseClient::new(&settings.source_api_url).map_err(|e| {
                IndexingError::config(format!("Failed to create source API client: {}", e))
            })?,
        );

        let index: Arc<dyn ChunkIndexClient> = Arc::new(
            ChunkApiClient::new(
                &settings.api_base_url,
                &settings.api_key,
                &settings.dataset_id,
            )
            .map_err(|e| {
                IndexingError::config(format!("Failed to create index API client: {}", e))
            })?,
        );

        let seeder = FrontierSeeder::with_config(
            queue.clone(),
            source.clone(),
            SeederConfig {
                interval: settings.seed_interval,
                backfill_window: settings.seed_backfill_window,
            },
        );

        let fetcher = Fetcher::new(queue.clone(), source.clone());

        let processor = ItemProcessor::with_config(
            source.clone(),
            ProcessorConfig {
                story_boost_factor: settings.story_boost_factor,
                comment_distance_factor: settings.comment_distance_factor,
            },
        );

        let loader = ChunkLoader::with_config(
            queue,
            index,
            processor,
            LoaderConfig {
                batch_size: settings.batch_size,
                ..LoaderConfig::default()
            },
        );

        let orchestrator = Orchestrator::with_config(
            seeder,
            fetcher,
            loader,
            OrchestratorConfig {
                fetcher_count: settings.fetcher_count,
            },
        );

        Ok(Self { orchestrator })
    }
}
