//! Ranking, fun-fact and manager endpoints, all served from the league store

use crate::cache::ALL_TIME_RANKINGS_KEY;
use crate::cache_control::{with_cache, ONE_YEAR};
use crate::error::ApiError;
use crate::state::AppState;
use league_store::{LeagueRow, RankingEntry, WeeklyRankingEntry};
use serde::{Deserialize, Serialize};
use serde_json::json;
use stats_aggregator::fun_facts;
use tracing::{debug, warn};
use warp::{Rejection, Reply};

const RANKINGS_MAX_AGE: u32 = 300;
const WEEKLY_RANKINGS_MAX_AGE: u32 = 300;
const FUN_FACTS_MAX_AGE: u32 = 3600;

/// One row of the all-time leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedManager {
    pub rank: u32,
    pub manager_id: i64,
    pub name: String,
    pub guid: String,
    pub image_url: Option<String>,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub point_diff: f64,
    pub seasons_played: i32,
    pub championships: i32,
    pub playoff_appearances: i32,
}

/// Rows come back already ordered; rank is the 1-based position
pub fn ranked(entries: Vec<RankingEntry>) -> Vec<RankedManager> {
    entries
        .into_iter()
        .zip(1..)
        .map(|(e, rank)| RankedManager {
            rank,
            manager_id: e.manager_id,
            name: e.nickname,
            guid: e.guid,
            image_url: e.image_url,
            wins: e.total_wins,
            losses: e.total_losses,
            ties: e.total_ties,
            win_pct: e.win_pct,
            points_for: e.total_points_for,
            points_against: e.total_points_against,
            point_diff: e.point_diff,
            seasons_played: e.seasons_played,
            championships: e.championships,
            playoff_appearances: e.playoff_appearances,
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyQuery {
    pub league_key: Option<String>,
    pub league_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRank {
    pub manager_id: i64,
    pub manager_name: String,
    pub rank: i32,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRankings {
    pub week: i32,
    pub rankings: Vec<WeeklyRank>,
}

/// Group rows ordered by (week, rank) into one entry per week
pub fn group_by_week(entries: Vec<WeeklyRankingEntry>) -> Vec<WeekRankings> {
    let mut weeks: Vec<WeekRankings> = Vec::new();

    for e in entries {
        let rank = WeeklyRank {
            manager_id: e.manager_id,
            manager_name: e.manager_name,
            rank: e.rank,
            wins: e.wins,
            losses: e.losses,
            ties: e.ties,
            win_pct: e.win_pct,
            points_for: e.points_for,
            points_against: e.points_against,
        };

        match weeks.last_mut() {
            Some(current) if current.week == e.week => current.rankings.push(rank),
            _ => weeks.push(WeekRankings { week: e.week, rankings: vec![rank] }),
        }
    }

    weeks
}

/// GET /api/rankings
pub async fn all_time(state: AppState) -> Result<impl Reply, Rejection> {
    if let Some(cache) = &state.cache {
        match cache.get::<Vec<RankedManager>>(ALL_TIME_RANKINGS_KEY).await {
            Ok(Some(rankings)) => {
                let reply = warp::reply::json(&json!({ "rankings": rankings }));
                return Ok(with_cache(reply, RANKINGS_MAX_AGE));
            }
            Ok(None) => {}
            Err(e) => warn!("Rankings cache read failed: {}", e),
        }
    }

    let rankings = ranked(state.store.all_rankings().await.map_err(ApiError::from)?);

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(ALL_TIME_RANKINGS_KEY, &rankings).await {
            warn!("Rankings cache write failed: {}", e);
        }
    }

    Ok(with_cache(warp::reply::json(&json!({ "rankings": rankings })), RANKINGS_MAX_AGE))
}

/// GET /api/rankings/weekly?leagueKey=|leagueId=
///
/// `leagueKey` is the provider key; `leagueId` is the stored row id.
pub async fn weekly(query: WeeklyQuery, state: AppState) -> Result<impl Reply, Rejection> {
    let league = find_league(&state, &query).await?;
    let entries = state.store.weekly_rankings(league.id).await.map_err(ApiError::from)?;
    debug!("{} weekly ranking rows for {}", entries.len(), league.league_key);

    let body = json!({
        "leagueKey": league.league_key,
        "weeklyRankings": group_by_week(entries),
    });
    Ok(with_cache(warp::reply::json(&body), WEEKLY_RANKINGS_MAX_AGE))
}

async fn find_league(state: &AppState, query: &WeeklyQuery) -> Result<LeagueRow, ApiError> {
    let league = match (&query.league_key, &query.league_id) {
        (Some(key), _) => state.store.find_league_by_key(key).await?,
        (None, Some(id)) => {
            let id: i64 = id
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid leagueId: {}", id)))?;
            state.store.find_league(id).await?
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "leagueId or leagueKey parameter is required".to_string(),
            ))
        }
    };

    league.ok_or_else(|| ApiError::NotFound("League not found".to_string()))
}

/// GET /api/fun-facts
pub async fn fun_facts_handler(state: AppState) -> Result<impl Reply, Rejection> {
    let matchups = state.store.matchup_details().await.map_err(ApiError::from)?;
    let facts = fun_facts(&matchups);

    Ok(with_cache(warp::reply::json(&facts), FUN_FACTS_MAX_AGE))
}

/// GET /api/managers
pub async fn managers(state: AppState) -> Result<impl Reply, Rejection> {
    let managers = state.store.managers_with_teams().await.map_err(ApiError::from)?;

    Ok(with_cache(warp::reply::json(&json!({ "managers": managers })), ONE_YEAR))
}
