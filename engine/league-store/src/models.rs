//! Rows read from and written to the league database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ManagerRow {
    pub id: i64,
    pub guid: String,
    pub nickname: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeagueRow {
    pub id: i64,
    pub league_key: String,
    pub league_id: String,
    pub game_key: String,
    pub name: String,
    pub season: String,
    pub num_teams: i32,
    pub current_week: i32,
    pub start_week: i32,
    pub end_week: i32,
    pub is_finished: bool,
    pub logo_url: Option<String>,
    pub url: Option<String>,
}

impl LeagueRow {
    /// A league from an earlier game than the one currently being played
    pub fn is_historical(&self, current_game_key: &str) -> bool {
        self.game_key != current_game_key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamRow {
    pub id: i64,
    pub team_key: String,
    pub team_id: String,
    pub league_id: i64,
    pub manager_id: i64,
    pub name: String,
    pub logo_url: Option<String>,
    pub url: Option<String>,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub rank: Option<i32>,
    pub playoff_seed: Option<i32>,
    pub is_playoff_team: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MatchupRow {
    pub id: i64,
    pub league_id: i64,
    pub week: i32,
    pub team1_id: i64,
    pub team2_id: i64,
    pub team1_points: Option<f64>,
    pub team2_points: Option<f64>,
    pub winner_id: Option<i64>,
    pub is_playoff: bool,
    pub is_tie: bool,
}

/// All-time ranking joined with its manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub manager_id: i64,
    pub guid: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub total_wins: i32,
    pub total_losses: i32,
    pub total_ties: i32,
    pub win_pct: f64,
    pub total_points_for: f64,
    pub total_points_against: f64,
    pub point_diff: f64,
    pub seasons_played: i32,
    pub championships: i32,
    pub playoff_appearances: i32,
    pub updated_at: DateTime<Utc>,
}

/// Weekly ranking joined with its manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRankingEntry {
    pub league_id: i64,
    pub manager_id: i64,
    pub manager_name: String,
    pub week: i32,
    pub rank: i32,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
}

/// One scoreboard matchup with both teams and managers resolved
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ScoreboardRow {
    pub matchup_id: i64,
    pub week: i32,
    pub is_playoff: bool,
    pub is_tie: bool,
    pub winner_id: Option<i64>,
    pub team1_id: i64,
    pub team1_key: String,
    pub team1_team_id: String,
    pub team1_name: String,
    pub team1_logo_url: Option<String>,
    pub team1_points: Option<f64>,
    pub team1_manager_guid: String,
    pub team1_manager_nickname: String,
    pub team1_manager_image_url: Option<String>,
    pub team2_id: i64,
    pub team2_key: String,
    pub team2_team_id: String,
    pub team2_name: String,
    pub team2_logo_url: Option<String>,
    pub team2_points: Option<f64>,
    pub team2_manager_guid: String,
    pub team2_manager_nickname: String,
    pub team2_manager_image_url: Option<String>,
}

/// Matchup with league and team names, input for fun facts
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MatchupDetail {
    pub matchup_id: i64,
    pub league_id: i64,
    pub league_name: String,
    pub season: String,
    pub week: i32,
    pub is_playoff: bool,
    pub team1_id: i64,
    pub team1_name: String,
    pub team1_points: Option<f64>,
    pub team2_id: i64,
    pub team2_name: String,
    pub team2_points: Option<f64>,
    pub winner_id: Option<i64>,
}

/// Per-manager sums over every team the manager owned
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManagerTotals {
    pub manager_id: i64,
    pub total_wins: i64,
    pub total_losses: i64,
    pub total_ties: i64,
    pub total_points_for: f64,
    pub total_points_against: f64,
    pub seasons_played: i64,
    pub championships: i64,
    pub playoff_appearances: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerWithTeams {
    #[serde(flatten)]
    pub manager: ManagerRow,
    pub teams: Vec<TeamRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewManager {
    pub guid: String,
    pub nickname: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLeague {
    pub league_key: String,
    pub league_id: String,
    pub game_key: String,
    pub name: String,
    pub season: String,
    pub num_teams: i32,
    pub current_week: i32,
    pub start_week: i32,
    pub end_week: i32,
    pub is_finished: bool,
    pub logo_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamUpsert {
    pub team_key: String,
    pub team_id: String,
    pub league_id: i64,
    pub manager_id: i64,
    pub name: String,
    pub logo_url: Option<String>,
    pub url: Option<String>,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub rank: Option<i32>,
    pub playoff_seed: Option<i32>,
    pub is_playoff_team: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchupUpsert {
    pub league_id: i64,
    pub week: i32,
    pub team1_id: i64,
    pub team2_id: i64,
    pub team1_points: Option<f64>,
    pub team2_points: Option<f64>,
    pub winner_id: Option<i64>,
    pub is_playoff: bool,
    pub is_tie: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRankingUpsert {
    pub league_id: i64,
    pub manager_id: i64,
    pub week: i32,
    pub rank: i32,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingUpsert {
    pub manager_id: i64,
    pub total_wins: i32,
    pub total_losses: i32,
    pub total_ties: i32,
    pub win_pct: f64,
    pub total_points_for: f64,
    pub total_points_against: f64,
    pub point_diff: f64,
    pub seasons_played: i32,
    pub championships: i32,
    pub playoff_appearances: i32,
}

/// Which rank-1 finishes count as championships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChampionshipRule {
    /// Rank 1 in a league whose season is over
    #[default]
    RequireFinished,
    /// Rank 1 at any point, including a season in progress
    RankOnly,
}

impl ChampionshipRule {
    /// Whether a final `rank` in a league counts as a title
    pub fn is_championship(self, rank: Option<i32>, league_finished: bool) -> bool {
        match self {
            ChampionshipRule::RequireFinished => rank == Some(1) && league_finished,
            ChampionshipRule::RankOnly => rank == Some(1),
        }
    }
}

impl FromStr for ChampionshipRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "finished" | "require-finished" => Ok(ChampionshipRule::RequireFinished),
            "rank-only" | "rank" => Ok(ChampionshipRule::RankOnly),
            other => Err(format!("unknown championship rule: {}", other)),
        }
    }
}

impl fmt::Display for ChampionshipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChampionshipRule::RequireFinished => write!(f, "finished"),
            ChampionshipRule::RankOnly => write!(f, "rank-only"),
        }
    }
}
