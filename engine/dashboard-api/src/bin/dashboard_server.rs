//! Dashboard HTTP server

use anyhow::{Context, Result};
use dashboard_api::logging::initialize_logging_with_config;
use dashboard_api::{create_routes, ApiSettings, AppState, DashboardConfig, ResponseCache};
use league_store::{DatabaseConfig, LeagueStore};
use stats_aggregator::{AggregationJob, AggregatorConfig, LeagueDataSource};
use std::sync::Arc;
use std::time::Duration;
use token_store::{TokenService, TokenStoreConfig};
use tracing::{info, warn};
use yahoo_client::{ProviderConfig, YahooClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = DashboardConfig::load().context("failed to load configuration")?;
    initialize_logging_with_config(&config.logging.level, &config.logging.format)?;

    info!("Starting dashboard server (game key {})", config.current_game_key);

    let store = LeagueStore::connect(&DatabaseConfig::from_env()?).await?;
    store.migrate().await.context("failed to run migrations")?;
    info!("Connected to database");

    let tokens = Arc::new(TokenService::from_config(&TokenStoreConfig::from_env()?).await?);
    let yahoo = Arc::new(YahooClient::new(ProviderConfig::from_env()?, tokens.clone())?);

    let source: Arc<dyn LeagueDataSource> = yahoo.clone();
    let repository = Arc::new(store.clone());
    let job = Arc::new(AggregationJob::new(AggregatorConfig::from_env()?, source, repository));

    let cache = match &config.cache.redis_url {
        Some(url) => {
            let ttl = Duration::from_secs(config.cache.rankings_ttl_secs);
            match ResponseCache::connect(url, ttl).await {
                Ok(cache) => {
                    info!("Caching rankings in Redis for {}s", ttl.as_secs());
                    Some(Arc::new(cache))
                }
                Err(e) => {
                    warn!("Redis unavailable, serving rankings uncached: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    if config.cron_secret.is_none() {
        warn!("CRON_SECRET not set, /api/cron/aggregate-stats is open");
    }
    if config.setup_secret.is_none() {
        warn!("SETUP_SECRET not set, /api/auth/setup-tokens will refuse every request");
    }

    let state = AppState {
        store,
        yahoo,
        tokens,
        job,
        cache,
        settings: Arc::new(ApiSettings::from(&config)),
    };
    let routes = create_routes(state);

    let addr = config.bind_address()?;
    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on {}", bound);
    server.await;
    info!("Dashboard server stopped");

    Ok(())
}
