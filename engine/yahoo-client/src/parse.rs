//! Deserialization boundary for Yahoo's response format
//!
//! Yahoo encodes collections as objects keyed by stringified indexes plus a
//! `count`, and entities as arrays of single-key objects (padded with empty
//! arrays). Numbers arrive as strings or numbers. Nothing outside this module
//! touches that shape.

use crate::error::ShapeError;
use crate::models::{
    LeagueInfo, ManagerInfo, Matchup, MatchupSide, RosterPlayer, SeasonLeagues, TeamInfo,
    TeamStanding,
};
use serde_json::{Map, Value};
use std::cmp::Reverse;

type Object = Map<String, Value>;

const DEFAULT_END_WEEK: u32 = 17;

/// `/users;use_login=1/games;game_codes=nfl/leagues`
pub fn parse_user_leagues(root: &Value) -> Result<Vec<SeasonLeagues>, ShapeError> {
    let users = fantasy_content(root)?.get("users").ok_or(ShapeError("users"))?;
    let Some(user) = users.get("0").and_then(|u| u.get("user")) else {
        return Ok(Vec::new());
    };
    let games = user.get(1).and_then(|u| u.get("games")).ok_or(ShapeError("user games"))?;

    let mut seasons = Vec::new();
    for game in collection(games, "game") {
        let info = game.get(0).ok_or(ShapeError("game info"))?;
        let season = info.get("season").and_then(as_string).unwrap_or_default();
        let game_key = info.get("game_key").and_then(as_string).unwrap_or_default();

        let leagues: Vec<LeagueInfo> = game
            .get(1)
            .and_then(|g| g.get("leagues"))
            .map(|l| collection(l, "league"))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|league| league.get(0))
            .filter_map(|obj| league_from_object(obj, Some(&season), Some(&game_key)))
            .filter(|league| !league.is_predraft())
            .collect();

        if !leagues.is_empty() {
            seasons.push(SeasonLeagues { season, game_key, leagues });
        }
    }

    seasons.sort_by_key(|s| Reverse(s.season.parse::<u32>().unwrap_or(0)));
    Ok(seasons)
}

/// `/league/{key}`
pub fn parse_league(root: &Value) -> Result<Option<LeagueInfo>, ShapeError> {
    let league = fantasy_content(root)?.get("league").ok_or(ShapeError("league"))?;
    Ok(league.get(0).and_then(|obj| league_from_object(obj, None, None)))
}

/// `/league/{key}/standings`
pub fn parse_standings(root: &Value) -> Result<Vec<TeamStanding>, ShapeError> {
    let league = fantasy_content(root)?.get("league").ok_or(ShapeError("league"))?;
    let teams = league
        .get(1)
        .and_then(|l| l.get("standings"))
        .and_then(|s| s.get(0))
        .and_then(|s| s.get("teams"))
        .ok_or(ShapeError("league standings"))?;

    Ok(collection(teams, "team").into_iter().filter_map(standing_from_team).collect())
}

/// `/league/{key}/teams`
pub fn parse_teams(root: &Value) -> Result<Vec<TeamInfo>, ShapeError> {
    let league = fantasy_content(root)?.get("league").ok_or(ShapeError("league"))?;
    let teams = league.get(1).and_then(|l| l.get("teams")).ok_or(ShapeError("league teams"))?;

    Ok(collection(teams, "team")
        .into_iter()
        .filter_map(|team| team.get(0))
        .filter_map(team_info_from_parts)
        .collect())
}

/// `/league/{key}/scoreboard;week=N`. Matchups without exactly two teams are dropped.
pub fn parse_scoreboard(root: &Value, week: u32) -> Result<Vec<Matchup>, ShapeError> {
    let league = fantasy_content(root)?.get("league").ok_or(ShapeError("league"))?;
    let matchups = league
        .get(1)
        .and_then(|l| l.get("scoreboard"))
        .and_then(|s| s.get("0"))
        .and_then(|s| s.get("matchups"))
        .ok_or(ShapeError("league scoreboard"))?;

    Ok(collection(matchups, "matchup")
        .into_iter()
        .filter_map(|m| matchup_from(m, week))
        .collect())
}

/// `/team/{key}/roster/players/stats`
pub fn parse_roster(root: &Value) -> Result<Vec<RosterPlayer>, ShapeError> {
    let team = fantasy_content(root)?.get("team").ok_or(ShapeError("team"))?;
    let players = team
        .get(1)
        .and_then(|t| t.get("roster"))
        .and_then(|r| r.get("0"))
        .and_then(|r| r.get("players"))
        .ok_or(ShapeError("team roster"))?;

    Ok(collection(players, "player").into_iter().filter_map(player_from).collect())
}

fn fantasy_content(root: &Value) -> Result<&Value, ShapeError> {
    root.get("fantasy_content").ok_or(ShapeError("fantasy_content"))
}

/// Entries of `{"count": n, "0": {key: ..}, "1": {key: ..}}`
fn collection<'a>(container: &'a Value, key: &str) -> Vec<&'a Value> {
    let count = container.get("count").and_then(as_u32).unwrap_or(0);
    (0..count)
        .filter_map(|i| container.get(i.to_string()).and_then(|entry| entry.get(key)))
        .collect()
}

/// Merge an array of single-key objects into one object
fn flatten(parts: &Value) -> Object {
    let mut merged = Object::new();
    match parts {
        Value::Array(items) => {
            for item in items {
                if let Value::Object(obj) = item {
                    merged.extend(obj.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
        Value::Object(obj) => merged = obj.clone(),
        _ => {}
    }
    merged
}

/// First element after the entity info carrying `key`
fn find_part<'a>(entity: &'a Value, key: &str) -> Option<&'a Value> {
    entity.as_array()?.iter().skip(1).find_map(|part| part.get(key))
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as u32).or_else(|| n.as_f64().map(|f| f as u32)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_flag(value: &Value) -> bool {
    matches!(value, Value::Bool(true)) || as_u32(value) == Some(1)
}

fn league_from_object(
    obj: &Value,
    season: Option<&str>,
    game_key: Option<&str>,
) -> Option<LeagueInfo> {
    let league_key = obj.get("league_key").and_then(as_string)?;
    let game_key = game_key
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| league_key.split(".l.").next().unwrap_or_default().to_string());
    let season = season
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| obj.get("season").and_then(as_string))
        .unwrap_or_default();
    let week = |key: &str, default: u32| {
        obj.get(key).and_then(as_u32).filter(|w| *w > 0).unwrap_or(default)
    };

    Some(LeagueInfo {
        league_id: obj.get("league_id").and_then(as_string).unwrap_or_default(),
        name: obj.get("name").and_then(as_string).unwrap_or_default(),
        num_teams: obj.get("num_teams").and_then(as_u32).unwrap_or(0),
        current_week: week("current_week", 1),
        start_week: week("start_week", 1),
        end_week: week("end_week", DEFAULT_END_WEEK),
        is_finished: obj.get("is_finished").map_or(false, as_flag),
        draft_status: obj.get("draft_status").and_then(as_string),
        logo_url: obj.get("logo_url").and_then(as_string),
        url: obj.get("url").and_then(as_string),
        league_key,
        game_key,
        season,
    })
}

fn manager_from(manager: &Value) -> Option<ManagerInfo> {
    Some(ManagerInfo {
        guid: manager.get("guid").and_then(as_string)?,
        nickname: manager.get("nickname").and_then(as_string).unwrap_or_default(),
        image_url: manager.get("image_url").and_then(as_string),
    })
}

fn team_info_from_parts(parts: &Value) -> Option<TeamInfo> {
    let flat = flatten(parts);
    let team_key = flat.get("team_key").and_then(as_string)?;

    let logo_url = flat
        .get("team_logos")
        .and_then(|logos| logos.get(0))
        .and_then(|logo| logo.get("team_logo"))
        .and_then(|logo| logo.get("url"))
        .and_then(as_string);

    let manager = flat
        .get("managers")
        .and_then(|m| m.get(0).or_else(|| m.get("0")))
        .and_then(|m| m.get("manager"))
        .and_then(manager_from);

    Some(TeamInfo {
        team_id: flat.get("team_id").and_then(as_string).unwrap_or_default(),
        name: flat.get("name").and_then(as_string).unwrap_or_default(),
        url: flat.get("url").and_then(as_string),
        team_key,
        logo_url,
        manager,
    })
}

fn standing_from_team(team: &Value) -> Option<TeamStanding> {
    let info = team_info_from_parts(team.get(0)?)?;
    let standings = find_part(team, "team_standings");
    let outcome = standings.and_then(|s| s.get("outcome_totals"));

    let count = |key: &str| outcome.and_then(|o| o.get(key)).and_then(as_u32).unwrap_or(0);
    let points = |key: &str| standings.and_then(|s| s.get(key)).and_then(as_f64);

    let season_points = find_part(team, "team_points")
        .and_then(|p| p.get("total"))
        .and_then(as_f64);

    Some(TeamStanding {
        wins: count("wins"),
        losses: count("losses"),
        ties: count("ties"),
        win_pct: outcome.and_then(|o| o.get("percentage")).and_then(as_f64).unwrap_or(0.0),
        points_for: points("points_for").or(season_points).unwrap_or(0.0),
        points_against: points("points_against").unwrap_or(0.0),
        rank: standings.and_then(|s| s.get("rank")).and_then(as_u32),
        playoff_seed: standings.and_then(|s| s.get("playoff_seed")).and_then(as_u32),
        team: info,
    })
}

fn side_from(team: &Value) -> Option<MatchupSide> {
    let info = team_info_from_parts(team.get(0)?)?;
    let total = |key: &str| find_part(team, key).and_then(|p| p.get("total")).and_then(as_f64);

    Some(MatchupSide {
        team_key: info.team_key,
        name: info.name,
        points: total("team_points").unwrap_or(0.0),
        projected_points: total("team_projected_points"),
    })
}

fn matchup_from(matchup: &Value, requested_week: u32) -> Option<Matchup> {
    let teams = matchup.get("0").and_then(|t| t.get("teams"))?;
    if teams.get("count").and_then(as_u32) != Some(2) {
        return None;
    }

    let sides = collection(teams, "team");
    let [first, second] = sides.as_slice() else {
        return None;
    };

    Some(Matchup::scored(
        matchup.get("week").and_then(as_u32).unwrap_or(requested_week),
        matchup.get("status").and_then(as_string),
        matchup.get("is_playoffs").map_or(false, as_flag),
        side_from(first)?,
        side_from(second)?,
    ))
}

fn player_from(player: &Value) -> Option<RosterPlayer> {
    let flat = flatten(player.get(0)?);
    let player_key = flat.get("player_key").and_then(as_string)?;

    let selected_position = find_part(player, "selected_position")
        .or_else(|| flat.get("selected_position"))
        .map(flatten)
        .and_then(|sp| sp.get("position").and_then(as_string));

    let image_url = flat.get("image_url").and_then(as_string).or_else(|| {
        flat.get("headshot").and_then(|h| h.get("url")).and_then(as_string)
    });

    Some(RosterPlayer {
        player_id: flat.get("player_id").and_then(as_string).unwrap_or_default(),
        name: flat
            .get("name")
            .and_then(|n| n.get("full"))
            .and_then(as_string)
            .unwrap_or_default(),
        editorial_team_abbr: flat.get("editorial_team_abbr").and_then(as_string),
        display_position: flat.get("display_position").and_then(as_string),
        status: flat.get("status").and_then(as_string),
        points: find_part(player, "player_points")
            .and_then(|p| p.get("total"))
            .and_then(as_f64),
        player_key,
        selected_position,
        image_url,
    })
}
