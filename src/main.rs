use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use tripmate::weather::VisualCrossingClient;
use tripmate::{TripMateConfig, TripService, TripStore, WeatherCache, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripMateConfig::load().with_context(|| "Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    let store = TripStore::connect(&config.database.url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.url))?;
    store.init_schema().await?;

    let provider = Arc::new(VisualCrossingClient::new(config.weather.clone())?);
    let service = Arc::new(TripService::new(store, provider, WeatherCache::new()));

    web::run(config.server.port, service).await?;
    Ok(())
}
