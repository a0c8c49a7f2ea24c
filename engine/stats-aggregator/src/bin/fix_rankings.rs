//! Rebuild all-time rankings from stored team rows, without calling Yahoo

use anyhow::Result;
use clap::Parser;
use league_store::{ChampionshipRule, DatabaseConfig, LeagueStore};
use stats_aggregator::recompute_all_time_rankings;
use std::collections::HashMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fix-rankings")]
#[command(about = "Recompute all-time rankings from the database")]
struct Cli {
    /// Which rank-1 finishes count as championships (finished | rank-only)
    #[arg(long, default_value = "finished")]
    championship_rule: ChampionshipRule,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let store = LeagueStore::connect(&DatabaseConfig::from_env()?).await?;

    let before: HashMap<i64, (String, i32)> = store
        .all_rankings()
        .await?
        .into_iter()
        .map(|r| (r.manager_id, (r.nickname, r.championships)))
        .collect();

    let rankings = recompute_all_time_rankings(&store, cli.championship_rule).await?;

    let mut changed = 0;
    for ranking in &rankings {
        let Some((name, old)) = before.get(&ranking.manager_id) else {
            continue;
        };
        if *old != ranking.championships {
            info!("{}: championships {} -> {}", name, old, ranking.championships);
            changed += 1;
        }
    }

    info!(
        "Recomputed {} rankings with rule {}, {} championship counts changed",
        rankings.len(),
        cli.championship_rule,
        changed
    );
    Ok(())
}
