//! Aggregation settings read from `AGGREGATE_*` environment variables

use anyhow::{anyhow, Context};
use chrono::{Datelike, Utc};
use league_store::ChampionshipRule;
use serde::{Deserialize, Serialize};

/// Which leagues a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationScope {
    /// Only leagues of the configured season, resuming from the last stored week
    CurrentSeason,
    /// Every season the user has played, fetching all weeks
    AllSeasons,
}

/// Configuration for the aggregation job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub scope: AggregationScope,

    /// Season year whose leagues are refreshed, e.g. "2025"
    pub season: String,

    /// Pause between weekly scoreboard requests
    pub week_delay_ms: u64,

    /// Pause after each league
    pub league_delay_ms: u64,

    pub championship_rule: ChampionshipRule,

    /// Interval between runs in watch mode
    pub interval_hours: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            scope: AggregationScope::CurrentSeason,
            season: Utc::now().year().to_string(),
            week_delay_ms: 50,
            league_delay_ms: 100,
            championship_rule: ChampionshipRule::default(),
            interval_hours: 168,
        }
    }
}

impl AggregatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(season) = std::env::var("AGGREGATE_SEASON") {
            config.season = season;
        }
        if let Ok(delay) = std::env::var("AGGREGATE_WEEK_DELAY_MS") {
            config.week_delay_ms = delay.parse().context("AGGREGATE_WEEK_DELAY_MS")?;
        }
        if let Ok(delay) = std::env::var("AGGREGATE_LEAGUE_DELAY_MS") {
            config.league_delay_ms = delay.parse().context("AGGREGATE_LEAGUE_DELAY_MS")?;
        }
        if let Ok(rule) = std::env::var("AGGREGATE_CHAMPIONSHIP_RULE") {
            config.championship_rule = rule.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Ok(hours) = std::env::var("AGGREGATE_INTERVAL_HOURS") {
            config.interval_hours = hours.parse().context("AGGREGATE_INTERVAL_HOURS")?;
        }

        if config.interval_hours == 0 {
            return Err(anyhow!("AGGREGATE_INTERVAL_HOURS must be greater than 0"));
        }

        Ok(config)
    }

    pub fn with_scope(mut self, scope: AggregationScope) -> Self {
        self.scope = scope;
        self
    }
}
