//! Entry point for the Hacker News search indexer.

use tracing::info;
use tracing_subscriber::EnvFilter;

use hn_indexer::{Dependencies, IndexingError};

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting HN search indexer");

    let deps = Dependencies::new().await?;
    deps.orchestrator.run().await?;

    Ok(())
}
