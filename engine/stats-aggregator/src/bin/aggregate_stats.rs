//! Run the stats aggregation once, or on a schedule with `--watch`

use anyhow::{Context, Result};
use clap::Parser;
use league_store::{DatabaseConfig, LeagueStore};
use stats_aggregator::{AggregationJob, AggregationScheduler, AggregationScope, AggregatorConfig};
use std::sync::Arc;
use token_store::{TokenService, TokenStoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use yahoo_client::{ProviderConfig, YahooClient};

#[derive(Parser)]
#[command(name = "aggregate-stats")]
#[command(about = "Pull league data from Yahoo and rebuild standings and rankings")]
struct Cli {
    /// Aggregate every season instead of only the current one
    #[arg(long)]
    all_seasons: bool,

    /// Keep running and re-aggregate every AGGREGATE_INTERVAL_HOURS
    #[arg(long)]
    watch: bool,

    /// Season year to refresh, overrides AGGREGATE_SEASON
    #[arg(long)]
    season: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = AggregatorConfig::from_env()?;
    if cli.all_seasons {
        config = config.with_scope(AggregationScope::AllSeasons);
    }
    if let Some(season) = cli.season {
        config.season = season;
    }

    let store = LeagueStore::connect(&DatabaseConfig::from_env()?).await?;
    store.migrate().await.context("failed to run migrations")?;

    let tokens = Arc::new(TokenService::from_config(&TokenStoreConfig::from_env()?).await?);
    let client = YahooClient::new(ProviderConfig::from_env()?, tokens)?;
    let job = Arc::new(AggregationJob::new(config, Arc::new(client), Arc::new(store)));

    if cli.watch {
        AggregationScheduler::new(job).start().await;
        return Ok(());
    }

    let summary = job.run().await?;
    info!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
