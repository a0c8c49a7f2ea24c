//! Shared handles passed to every route

use crate::cache::ResponseCache;
use crate::config::DashboardConfig;
use league_store::LeagueStore;
use stats_aggregator::AggregationJob;
use std::sync::Arc;
use token_store::TokenService;
use yahoo_client::YahooClient;

/// Secrets and the current game key, read once at startup
#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    pub cron_secret: Option<String>,
    pub setup_secret: Option<String>,
    pub current_game_key: String,
}

impl From<&DashboardConfig> for ApiSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            cron_secret: config.cron_secret.clone(),
            setup_secret: config.setup_secret.clone(),
            current_game_key: config.current_game_key.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: LeagueStore,
    pub yahoo: Arc<YahooClient>,
    pub tokens: Arc<TokenService>,
    pub job: Arc<AggregationJob>,
    pub cache: Option<Arc<ResponseCache>>,
    pub settings: Arc<ApiSettings>,
}
