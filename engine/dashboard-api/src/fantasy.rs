//! League endpoints under `/api/fantasy`
//!
//! League metadata, standings and rosters are read live from Yahoo. The
//! scoreboard comes from the league store so past weeks stay available
//! without provider calls.

use crate::cache_control::{is_historical, league_key, max_age, with_cache};
use crate::error::ApiError;
use crate::state::AppState;
use league_store::ScoreboardRow;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use warp::{Rejection, Reply};

const MY_LEAGUES_MAX_AGE: u32 = 300;
const LEAGUE_MAX_AGE: u32 = 300;
const STANDINGS_MAX_AGE: u32 = 120;
const SCOREBOARD_MAX_AGE: u32 = 60;
const ROSTER_MAX_AGE: u32 = 120;

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub week: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardResponse {
    pub league_key: String,
    pub week: i32,
    pub matchups: Vec<ScoreboardMatchup>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardMatchup {
    pub week: i32,
    pub is_playoff: bool,
    pub is_tie: bool,
    pub teams: [ScoreboardTeam; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardTeam {
    pub team_id: String,
    pub team_key: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub points: Option<f64>,
    pub is_winner: bool,
    pub manager: ScoreboardManager,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardManager {
    pub guid: String,
    pub nickname: String,
    pub image_url: Option<String>,
}

impl From<ScoreboardRow> for ScoreboardMatchup {
    fn from(row: ScoreboardRow) -> Self {
        let team1 = ScoreboardTeam {
            is_winner: row.winner_id == Some(row.team1_id),
            team_id: row.team1_team_id,
            team_key: row.team1_key,
            name: row.team1_name,
            logo_url: row.team1_logo_url,
            points: row.team1_points,
            manager: ScoreboardManager {
                guid: row.team1_manager_guid,
                nickname: row.team1_manager_nickname,
                image_url: row.team1_manager_image_url,
            },
        };
        let team2 = ScoreboardTeam {
            is_winner: row.winner_id == Some(row.team2_id),
            team_id: row.team2_team_id,
            team_key: row.team2_key,
            name: row.team2_name,
            logo_url: row.team2_logo_url,
            points: row.team2_points,
            manager: ScoreboardManager {
                guid: row.team2_manager_guid,
                nickname: row.team2_manager_nickname,
                image_url: row.team2_manager_image_url,
            },
        };

        Self {
            week: row.week,
            is_playoff: row.is_playoff,
            is_tie: row.is_tie,
            teams: [team1, team2],
        }
    }
}

/// GET /api/fantasy/my-leagues
pub async fn my_leagues(state: AppState) -> Result<impl Reply, Rejection> {
    let seasons = state.yahoo.user_leagues().await.map_err(ApiError::from)?;
    debug!("Found {} seasons for the signed-in user", seasons.len());

    Ok(with_cache(warp::reply::json(&json!({ "seasons": seasons })), MY_LEAGUES_MAX_AGE))
}

/// GET /api/fantasy/league/{leagueId}
pub async fn league(league_id: String, state: AppState) -> Result<impl Reply, Rejection> {
    let game_key = &state.settings.current_game_key;
    let key = league_key(&league_id, game_key);

    let league = state
        .yahoo
        .league(&key)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("League {} not found", key)))?;

    let age = max_age(is_historical(&key, game_key), LEAGUE_MAX_AGE);
    Ok(with_cache(warp::reply::json(&json!({ "league": league })), age))
}

/// GET /api/fantasy/league/{leagueId}/standings
pub async fn standings(league_id: String, state: AppState) -> Result<impl Reply, Rejection> {
    let game_key = &state.settings.current_game_key;
    let key = league_key(&league_id, game_key);

    let standings = state.yahoo.standings(&key).await.map_err(ApiError::from)?;

    let age = max_age(is_historical(&key, game_key), STANDINGS_MAX_AGE);
    Ok(with_cache(warp::reply::json(&json!({ "standings": standings })), age))
}

/// GET /api/fantasy/league/{leagueId}/scoreboard?week=N
pub async fn scoreboard(
    league_id: String,
    query: WeekQuery,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let game_key = &state.settings.current_game_key;
    let key = league_key(&league_id, game_key);

    let league = state
        .store
        .find_league_by_key(&key)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("League {} not found", key)))?;

    let week = match query.week {
        Some(week) => i32::try_from(week)
            .map_err(|_| ApiError::BadRequest(format!("Invalid week: {}", week)))?,
        None => league.current_week.max(1),
    };

    let rows = state.store.scoreboard(league.id, week).await.map_err(ApiError::from)?;
    let response = ScoreboardResponse {
        league_key: league.league_key.clone(),
        week,
        matchups: rows.into_iter().map(ScoreboardMatchup::from).collect(),
    };

    let age = max_age(league.is_historical(game_key), SCOREBOARD_MAX_AGE);
    Ok(with_cache(warp::reply::json(&response), age))
}

/// GET /api/fantasy/league/{leagueId}/team/{teamId}?week=N
pub async fn team_roster(
    league_id: String,
    team_id: String,
    query: WeekQuery,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let game_key = &state.settings.current_game_key;
    let key = league_key(&league_id, game_key);
    let team_key = format!("{}.t.{}", key, team_id);

    let roster = state.yahoo.roster(&team_key, query.week).await.map_err(ApiError::from)?;

    let age = max_age(is_historical(&key, game_key), ROSTER_MAX_AGE);
    Ok(with_cache(warp::reply::json(&json!({ "roster": roster })), age))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(winner_id: Option<i64>) -> ScoreboardRow {
        ScoreboardRow {
            matchup_id: 7,
            week: 3,
            is_playoff: false,
            is_tie: false,
            winner_id,
            team1_id: 11,
            team1_key: "461.l.1.t.1".to_string(),
            team1_team_id: "1".to_string(),
            team1_name: "Gridiron Gang".to_string(),
            team1_logo_url: None,
            team1_points: Some(101.5),
            team1_manager_guid: "GUID1".to_string(),
            team1_manager_nickname: "Alex".to_string(),
            team1_manager_image_url: None,
            team2_id: 12,
            team2_key: "461.l.1.t.2".to_string(),
            team2_team_id: "2".to_string(),
            team2_name: "Fourth and Long".to_string(),
            team2_logo_url: Some("https://example.com/logo.png".to_string()),
            team2_points: Some(99.0),
            team2_manager_guid: "GUID2".to_string(),
            team2_manager_nickname: "Sam".to_string(),
            team2_manager_image_url: None,
        }
    }

    #[test]
    fn test_scoreboard_matchup_marks_winner() {
        let matchup = ScoreboardMatchup::from(row(Some(11)));
        assert!(matchup.teams[0].is_winner);
        assert!(!matchup.teams[1].is_winner);
        assert_eq!(matchup.teams[1].manager.nickname, "Sam");
    }

    #[test]
    fn test_unplayed_matchup_has_no_winner() {
        let matchup = ScoreboardMatchup::from(row(None));
        assert!(matchup.teams.iter().all(|t| !t.is_winner));
    }

    #[test]
    fn test_scoreboard_json_shape() {
        let response = ScoreboardResponse {
            league_key: "461.l.1".to_string(),
            week: 3,
            matchups: vec![ScoreboardMatchup::from(row(Some(12)))],
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["leagueKey"], "461.l.1");
        assert_eq!(json["matchups"][0]["isPlayoff"], false);
        assert_eq!(json["matchups"][0]["teams"][0]["teamKey"], "461.l.1.t.1");
        assert_eq!(json["matchups"][0]["teams"][1]["isWinner"], true);
        assert_eq!(json["matchups"][0]["teams"][1]["logoUrl"], "https://example.com/logo.png");
        assert_eq!(json["matchups"][0]["teams"][0]["manager"]["imageUrl"], serde_json::Value::Null);
    }
}
