//! Yahoo Fantasy Sports API client

use crate::config::ProviderConfig;
use crate::error::ShapeError;
use crate::models::{LeagueInfo, Matchup, RosterPlayer, SeasonLeagues, TeamInfo, TeamStanding};
use crate::{parse, ProviderError, Result};
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use token_store::TokenService;
use tracing::{debug, warn};

/// Yahoo API client
///
/// A non-2xx response is an error carrying the status. A response with an
/// unexpected shape is logged and reads as "no data".
pub struct YahooClient {
    config: ProviderConfig,
    client: reqwest::Client,
    tokens: Arc<TokenService>,
}

impl YahooClient {
    /// Create a new Yahoo API client
    pub fn new(config: ProviderConfig, tokens: Arc<TokenService>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client, tokens })
    }

    /// Leagues of the logged-in user, grouped by season, newest first
    pub async fn user_leagues(&self) -> Result<Vec<SeasonLeagues>> {
        let path = "/users;use_login=1/games;game_codes=nfl/leagues";
        let root = self.request(path).await?;
        Ok(or_empty(path, parse::parse_user_leagues(&root)))
    }

    pub async fn league(&self, league_key: &str) -> Result<Option<LeagueInfo>> {
        let path = format!("/league/{}", league_key);
        let root = self.request(&path).await?;

        match parse::parse_league(&root) {
            Ok(league) => Ok(league),
            Err(e) => {
                warn!("Failed to parse {}: {}", path, e);
                Ok(None)
            }
        }
    }

    pub async fn standings(&self, league_key: &str) -> Result<Vec<TeamStanding>> {
        let path = format!("/league/{}/standings", league_key);
        let root = self.request(&path).await?;
        Ok(or_empty(&path, parse::parse_standings(&root)))
    }

    pub async fn teams(&self, league_key: &str) -> Result<Vec<TeamInfo>> {
        let path = format!("/league/{}/teams", league_key);
        let root = self.request(&path).await?;
        Ok(or_empty(&path, parse::parse_teams(&root)))
    }

    pub async fn scoreboard(&self, league_key: &str, week: u32) -> Result<Vec<Matchup>> {
        let path = format!("/league/{}/scoreboard;week={}", league_key, week);
        let root = self.request(&path).await?;
        Ok(or_empty(&path, parse::parse_scoreboard(&root, week)))
    }

    /// Roster with player points; `None` means the current week
    pub async fn roster(&self, team_key: &str, week: Option<u32>) -> Result<Vec<RosterPlayer>> {
        let week_param = week.map(|w| format!(";week={}", w)).unwrap_or_default();
        let path = format!("/team/{}/roster{}/players/stats", team_key, week_param);
        let root = self.request(&path).await?;
        Ok(or_empty(&path, parse::parse_roster(&root)))
    }

    async fn request(&self, path: &str) -> Result<Value> {
        let access_token = self.tokens.get_valid_token().await?;
        let url = request_url(&self.config.api_base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Yahoo API {} returned {}", path, status);
            return Err(ProviderError::Api { status: status.as_u16(), message });
        }

        Ok(response.json().await?)
    }
}

fn request_url(base: &str, path: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}format=json", base, path, separator)
}

fn or_empty<T>(path: &str, parsed: std::result::Result<Vec<T>, ShapeError>) -> Vec<T> {
    parsed.unwrap_or_else(|e| {
        warn!("Failed to parse {}: {}", path, e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_appends_format() {
        assert_eq!(
            request_url("https://api.example/v2", "/league/461.l.1/scoreboard;week=3"),
            "https://api.example/v2/league/461.l.1/scoreboard;week=3?format=json"
        );
        assert_eq!(
            request_url("https://api.example/v2", "/league/461.l.1?out=settings"),
            "https://api.example/v2/league/461.l.1?out=settings&format=json"
        );
    }

    #[test]
    fn test_shape_errors_read_as_empty() {
        let parsed: std::result::Result<Vec<u32>, ShapeError> = Err(ShapeError("league"));
        assert!(or_empty("/league/x", parsed).is_empty());
        assert_eq!(or_empty("/league/x", Ok(vec![1, 2])), vec![1, 2]);
    }
}
