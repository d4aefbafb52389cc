//! Orchestrator module for the ingestion pipeline.
//!
//! Runs the seeder, fetchers, and loader as independent tasks that
//! share nothing but the queues, and coordinates their shutdown.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::fetcher::Fetcher;
use crate::loader::ChunkLoader;
use crate::seeder::FrontierSeeder;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Number of concurrent fetcher instances.
    pub fetcher_count: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { fetcher_count: 4 }
    }
}

/// Orchestrator that coordinates the pipeline stages.
///
/// The orchestrator:
/// - Bootstraps the frontier from the listing endpoints
/// - Spawns the seeder, fetcher, and loader tasks
/// - Broadcasts the shutdown signal on ctrl-c or a fatal loader error
pub struct Orchestrator {
    seeder: Arc<FrontierSeeder>,
    fetcher: Arc<Fetcher>,
    loader: Arc<ChunkLoader>,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given stages.
    pub fn new(seeder: FrontierSeeder, fetcher: Fetcher, loader: ChunkLoader) -> Self {
        Self::with_config(seeder, fetcher, loader, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        seeder: FrontierSeeder,
        fetcher: Fetcher,
        loader: ChunkLoader,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            seeder: Arc::new(seeder),
            fetcher: Arc::new(fetcher),
            loader: Arc::new(loader),
            config,
            shutdown_tx,
        }
    }

    /// Run the pipeline.
    ///
    /// Blocks until ctrl-c or a fatal loader error. Returns the fatal
    /// error, if any, after all stage tasks have wound down.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), PipelineError> {
        info!(
            fetcher_count = self.config.fetcher_count,
            "Starting ingest orchestrator"
        );

        // Bootstrap the frontier once before the steady-state loops.
        if let Err(e) = self.seeder.seed_listings().await {
            warn!(error = %e, "Listing bootstrap failed, continuing with refresh cycles");
        }

        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        let seeder = self.seeder.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            if let Err(e) = seeder.run(shutdown_rx).await {
                error!(error = %e, "Seeder terminated with error");
            }
        }));

        for worker in 0..self.config.fetcher_count {
            let fetcher = self.fetcher.clone();
            let shutdown_rx = self.shutdown_tx.subscribe();
            handles.push(tokio::spawn(async move {
                if let Err(e) = fetcher.run(shutdown_rx).await {
                    error!(worker, error = %e, "Fetcher terminated with error");
                }
            }));
        }

        let loader = self.loader.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        let mut loader_handle = tokio::spawn(async move { loader.run(shutdown_rx).await });

        let result = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                let _ = self.shutdown_tx.send(());
                match (&mut loader_handle).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(error = %e, "Loader task panicked");
                        Ok(())
                    }
                }
            }
            // The loader only returns before shutdown on a fatal
            // index error.
            joined = &mut loader_handle => {
                let _ = self.shutdown_tx.send(());
                match joined {
                    Ok(result) => result,
                    Err(e) => {
                        error!(error = %e, "Loader task panicked");
                        Ok(())
                    }
                }
            }
        };

        for handle in handles {
            let _ = handle.await;
        }

        info!("Orchestrator shutdown complete");
        result
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
