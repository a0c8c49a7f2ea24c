//! Highlights derived from stored matchup history

use league_store::MatchupDetail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSide {
    pub name: String,
    pub points: f64,
}

/// A single matchup worth calling out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupFact {
    pub week: i32,
    pub year: String,
    pub is_playoff: bool,
    pub winner: FactSide,
    pub loser: FactSide,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinStreak {
    pub team: String,
    pub league: String,
    pub year: String,
    pub streak: u32,
    pub start_week: i32,
    pub end_week: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FunFact {
    BiggestBlowout(MatchupFact),
    ClosestMatchup(MatchupFact),
    LongestWinStreak(WinStreak),
}

/// Every fact that has qualifying data, in display order
pub fn fun_facts(matchups: &[MatchupDetail]) -> Vec<FunFact> {
    let mut facts = Vec::with_capacity(3);
    if let Some(fact) = biggest_blowout(matchups) {
        facts.push(FunFact::BiggestBlowout(fact));
    }
    if let Some(fact) = closest_matchup(matchups) {
        facts.push(FunFact::ClosestMatchup(fact));
    }
    if let Some(streak) = longest_win_streak(matchups) {
        facts.push(FunFact::LongestWinStreak(streak));
    }
    facts
}

/// Largest margin among matchups with both scores recorded
pub fn biggest_blowout(matchups: &[MatchupDetail]) -> Option<MatchupFact> {
    let mut best: Option<(&MatchupDetail, f64, f64)> = None;

    for m in matchups {
        let (Some(p1), Some(p2)) = (m.team1_points, m.team2_points) else {
            continue;
        };
        if best.map_or(true, |(_, b1, b2)| (p1 - p2).abs() > (b1 - b2).abs()) {
            best = Some((m, p1, p2));
        }
    }

    best.map(|(m, p1, p2)| matchup_fact(m, p1, p2))
}

/// Smallest margin among matchups where both teams scored
pub fn closest_matchup(matchups: &[MatchupDetail]) -> Option<MatchupFact> {
    let mut best: Option<(&MatchupDetail, f64, f64)> = None;

    for m in matchups {
        let (Some(p1), Some(p2)) = (m.team1_points, m.team2_points) else {
            continue;
        };
        if p1 <= 0.0 || p2 <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, b1, b2)| (p1 - p2).abs() < (b1 - b2).abs()) {
            best = Some((m, p1, p2));
        }
    }

    best.map(|(m, p1, p2)| matchup_fact(m, p1, p2))
}

fn matchup_fact(m: &MatchupDetail, p1: f64, p2: f64) -> MatchupFact {
    let side1 = FactSide { name: m.team1_name.clone(), points: p1 };
    let side2 = FactSide { name: m.team2_name.clone(), points: p2 };
    let (winner, loser) = if p1 > p2 { (side1, side2) } else { (side2, side1) };

    MatchupFact {
        week: m.week,
        year: m.season.clone(),
        is_playoff: m.is_playoff,
        margin: (winner.points - loser.points).abs(),
        winner,
        loser,
    }
}

struct Run<'a> {
    first: &'a MatchupDetail,
    length: u32,
    start_week: i32,
    end_week: i32,
}

impl Run<'_> {
    fn continues_with(&self, m: &MatchupDetail) -> bool {
        self.first.league_id == m.league_id
            && self.first.winner_id == m.winner_id
            && self.end_week + 1 == m.week
    }
}

/// Longest run of consecutive weeks won by one team within one league.
///
/// Wins are scanned ordered by (league, winner, week); a run ends when the
/// league or team changes or a week is skipped. The first of equally long
/// runs wins.
pub fn longest_win_streak(matchups: &[MatchupDetail]) -> Option<WinStreak> {
    let mut wins: Vec<&MatchupDetail> = matchups.iter().filter(|m| m.winner_id.is_some()).collect();
    wins.sort_by_key(|m| (m.league_id, m.winner_id, m.week));

    let mut best: Option<Run> = None;
    let mut current: Option<Run> = None;

    for m in wins {
        if let Some(run) = current.as_mut().filter(|run| run.continues_with(m)) {
            run.length += 1;
            run.end_week = m.week;
            continue;
        }

        if let Some(done) = current.take() {
            keep_longer(&mut best, done);
        }
        current = Some(Run { first: m, length: 1, start_week: m.week, end_week: m.week });
    }
    if let Some(done) = current {
        keep_longer(&mut best, done);
    }

    best.map(|run| WinStreak {
        team: winner_name(run.first),
        league: run.first.league_name.clone(),
        year: run.first.season.clone(),
        streak: run.length,
        start_week: run.start_week,
        end_week: run.end_week,
    })
}

fn keep_longer<'a>(best: &mut Option<Run<'a>>, run: Run<'a>) {
    if best.as_ref().map_or(true, |b| run.length > b.length) {
        *best = Some(run);
    }
}

fn winner_name(m: &MatchupDetail) -> String {
    if m.winner_id == Some(m.team1_id) {
        m.team1_name.clone()
    } else {
        m.team2_name.clone()
    }
}
