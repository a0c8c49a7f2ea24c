//! Flat records produced from Yahoo responses

use serde::{Deserialize, Serialize};

/// One season's league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueInfo {
    pub league_key: String,
    pub league_id: String,
    pub game_key: String,
    pub name: String,
    pub season: String,
    pub num_teams: u32,
    pub current_week: u32,
    pub start_week: u32,
    pub end_week: u32,
    pub is_finished: bool,
    pub draft_status: Option<String>,
    pub logo_url: Option<String>,
    pub url: Option<String>,
}

impl LeagueInfo {
    pub fn is_predraft(&self) -> bool {
        self.draft_status.as_deref() == Some("predraft")
    }

    /// Last week with results: the final week once the league is finished
    pub fn last_week(&self) -> u32 {
        if self.is_finished {
            self.end_week
        } else {
            self.current_week
        }
    }
}

/// The logged-in user's leagues for one game season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonLeagues {
    pub season: String,
    pub game_key: String,
    pub leagues: Vec<LeagueInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerInfo {
    pub guid: String,
    pub nickname: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub team_key: String,
    pub team_id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub url: Option<String>,
    pub manager: Option<ManagerInfo>,
}

/// A team with its season record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    #[serde(flatten)]
    pub team: TeamInfo,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub rank: Option<u32>,
    pub playoff_seed: Option<u32>,
}

impl TeamStanding {
    pub fn is_playoff_team(&self) -> bool {
        self.playoff_seed.map_or(false, |seed| seed > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupSide {
    pub team_key: String,
    pub name: String,
    pub points: f64,
    pub projected_points: Option<f64>,
}

/// One head-to-head pairing in a week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    pub week: u32,
    pub status: Option<String>,
    pub is_playoff: bool,
    pub is_tie: bool,
    pub winner_team_key: Option<String>,
    pub team1: MatchupSide,
    pub team2: MatchupSide,
}

impl Matchup {
    /// Build a matchup, deciding tie and winner from the two scores.
    ///
    /// Equal positive scores are a tie; an all-zero matchup has not been played
    /// and gets neither a tie nor a winner.
    pub fn scored(
        week: u32,
        status: Option<String>,
        is_playoff: bool,
        team1: MatchupSide,
        team2: MatchupSide,
    ) -> Self {
        let is_tie = team1.points == team2.points && team1.points > 0.0;
        let winner_team_key = if !is_tie && (team1.points > 0.0 || team2.points > 0.0) {
            if team1.points > team2.points {
                Some(team1.team_key.clone())
            } else {
                Some(team2.team_key.clone())
            }
        } else {
            None
        };

        Self { week, status, is_playoff, is_tie, winner_team_key, team1, team2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub player_key: String,
    pub player_id: String,
    pub name: String,
    pub editorial_team_abbr: Option<String>,
    pub display_position: Option<String>,
    pub selected_position: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub points: Option<f64>,
}
