//! Ranking math over stored rows
//!
//! Everything here is pure: the job loads rows, calls these functions and
//! writes the results back.

use league_store::{
    ChampionshipRule, LeagueRow, ManagerTotals, MatchupRow, RankingUpsert, TeamRow,
    WeeklyRankingUpsert,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// wins / games, or 0 when no games were played
pub fn win_pct(wins: i64, losses: i64, ties: i64) -> f64 {
    let games = wins + losses + ties;
    if games > 0 {
        wins as f64 / games as f64
    } else {
        0.0
    }
}

/// A manager's cumulative record in one league as of one week
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyStanding {
    pub manager_id: i64,
    pub team_id: i64,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub points_for: f64,
    pub points_against: f64,
    pub win_pct: f64,
    pub rank: i32,
}

impl WeeklyStanding {
    fn empty(team: &TeamRow) -> Self {
        Self {
            manager_id: team.manager_id,
            team_id: team.id,
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            win_pct: 0.0,
            rank: 0,
        }
    }

    pub fn point_diff(&self) -> f64 {
        self.points_for - self.points_against
    }

    pub fn to_upsert(&self, league_id: i64, week: i32) -> WeeklyRankingUpsert {
        WeeklyRankingUpsert {
            league_id,
            manager_id: self.manager_id,
            week,
            rank: self.rank,
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            win_pct: self.win_pct,
            points_for: self.points_for,
            points_against: self.points_against,
        }
    }
}

/// Standings of every team in a league counting matchups up to and
/// including `week`.
///
/// Only matchups with both scores recorded count. Ranks run 1..N ordered by
/// win percentage, wins and point differential (all descending), then manager
/// id so equal records always rank the same way.
pub fn weekly_standings(
    teams: &[TeamRow],
    matchups: &[MatchupRow],
    week: i32,
) -> Vec<WeeklyStanding> {
    let mut standings: Vec<WeeklyStanding> = teams.iter().map(WeeklyStanding::empty).collect();
    let index: HashMap<i64, usize> =
        standings.iter().enumerate().map(|(i, s)| (s.team_id, i)).collect();

    for matchup in matchups.iter().filter(|m| m.week <= week) {
        let (Some(&i1), Some(&i2)) = (index.get(&matchup.team1_id), index.get(&matchup.team2_id))
        else {
            continue;
        };
        let (Some(p1), Some(p2)) = (matchup.team1_points, matchup.team2_points) else {
            continue;
        };

        standings[i1].points_for += p1;
        standings[i1].points_against += p2;
        standings[i2].points_for += p2;
        standings[i2].points_against += p1;

        if matchup.is_tie {
            standings[i1].ties += 1;
            standings[i2].ties += 1;
        } else if matchup.winner_id == Some(matchup.team1_id) {
            standings[i1].wins += 1;
            standings[i2].losses += 1;
        } else if matchup.winner_id == Some(matchup.team2_id) {
            standings[i2].wins += 1;
            standings[i1].losses += 1;
        }
    }

    for standing in standings.iter_mut() {
        standing.win_pct =
            win_pct(standing.wins.into(), standing.losses.into(), standing.ties.into());
    }

    standings.sort_by(compare_weekly);
    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = i as i32 + 1;
    }

    standings
}

fn compare_weekly(a: &WeeklyStanding, b: &WeeklyStanding) -> Ordering {
    b.win_pct
        .total_cmp(&a.win_pct)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.point_diff().total_cmp(&a.point_diff()))
        .then_with(|| a.manager_id.cmp(&b.manager_id))
}

/// A season made the playoffs when the provider flagged it or seeded it
pub fn is_playoff_appearance(team: &TeamRow) -> bool {
    team.is_playoff_team || team.playoff_seed.map_or(false, |seed| seed > 0)
}

/// Sum every manager's season rows, one entry per manager ordered by id.
///
/// A team whose league is missing from `leagues` is treated as belonging to
/// a season still in progress.
pub fn manager_totals(
    teams: &[TeamRow],
    leagues: &[LeagueRow],
    rule: ChampionshipRule,
) -> Vec<ManagerTotals> {
    let finished: HashMap<i64, bool> = leagues.iter().map(|l| (l.id, l.is_finished)).collect();
    let mut totals: BTreeMap<i64, (ManagerTotals, HashSet<i64>)> = BTreeMap::new();

    for team in teams {
        let (entry, seasons) = totals.entry(team.manager_id).or_insert_with(|| {
            let empty = ManagerTotals { manager_id: team.manager_id, ..Default::default() };
            (empty, HashSet::new())
        });

        entry.total_wins += i64::from(team.wins);
        entry.total_losses += i64::from(team.losses);
        entry.total_ties += i64::from(team.ties);
        entry.total_points_for += team.points_for;
        entry.total_points_against += team.points_against;
        seasons.insert(team.league_id);

        let league_finished = finished.get(&team.league_id).copied().unwrap_or(false);
        if rule.is_championship(team.rank, league_finished) {
            entry.championships += 1;
        }
        if is_playoff_appearance(team) {
            entry.playoff_appearances += 1;
        }
    }

    totals
        .into_values()
        .map(|(mut entry, seasons)| {
            entry.seasons_played = seasons.len() as i64;
            entry
        })
        .collect()
}

/// Turn summed team rows into all-time ranking rows, best record first
pub fn all_time_rankings(totals: &[ManagerTotals]) -> Vec<RankingUpsert> {
    let mut rankings: Vec<RankingUpsert> = totals
        .iter()
        .map(|t| RankingUpsert {
            manager_id: t.manager_id,
            total_wins: clamp_i32(t.total_wins),
            total_losses: clamp_i32(t.total_losses),
            total_ties: clamp_i32(t.total_ties),
            win_pct: win_pct(t.total_wins, t.total_losses, t.total_ties),
            total_points_for: t.total_points_for,
            total_points_against: t.total_points_against,
            point_diff: t.total_points_for - t.total_points_against,
            seasons_played: clamp_i32(t.seasons_played),
            championships: clamp_i32(t.championships),
            playoff_appearances: clamp_i32(t.playoff_appearances),
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.win_pct
            .total_cmp(&a.win_pct)
            .then_with(|| b.total_wins.cmp(&a.total_wins))
            .then_with(|| a.manager_id.cmp(&b.manager_id))
    });

    rankings
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: i64, manager_id: i64) -> TeamRow {
        TeamRow {
            id,
            team_key: format!("461.l.1.t.{}", id),
            team_id: id.to_string(),
            league_id: 1,
            manager_id,
            name: format!("Team {}", id),
            logo_url: None,
            url: None,
            wins: 0,
            losses: 0,
            ties: 0,
            win_pct: 0.0,
            points_for: 0.0,
            points_against: 0.0,
            rank: None,
            playoff_seed: None,
            is_playoff_team: false,
        }
    }

    fn matchup(week: i32, t1: i64, t2: i64, p1: Option<f64>, p2: Option<f64>) -> MatchupRow {
        let is_tie = p1 == p2 && p1.map_or(false, |p| p > 0.0);
        let winner_id = match (p1, p2) {
            (Some(a), Some(b)) if !is_tie && (a > 0.0 || b > 0.0) => {
                Some(if a > b { t1 } else { t2 })
            }
            _ => None,
        };
        MatchupRow {
            id: week as i64 * 100 + t1,
            league_id: 1,
            week,
            team1_id: t1,
            team2_id: t2,
            team1_points: p1,
            team2_points: p2,
            winner_id,
            is_playoff: false,
            is_tie,
        }
    }

    #[test]
    fn test_win_pct() {
        assert_eq!(win_pct(0, 0, 0), 0.0);
        assert_eq!(win_pct(3, 1, 0), 0.75);
        assert!((win_pct(1, 1, 1) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_standings_accumulate_up_to_week() {
        let teams = vec![team(1, 10), team(2, 20)];
        let matchups = vec![
            matchup(1, 1, 2, Some(20.0), Some(10.0)),
            matchup(2, 1, 2, Some(15.0), Some(14.0)),
            matchup(3, 1, 2, Some(30.0), Some(5.0)),
        ];

        let week2 = weekly_standings(&teams, &matchups, 2);
        assert_eq!(week2[0].team_id, 1);
        assert_eq!(week2[0].wins, 2);
        assert_eq!(week2[0].points_for, 35.0);
        assert_eq!(week2[1].losses, 2);
        assert_eq!(week2[1].points_against, 35.0);

        let week3 = weekly_standings(&teams, &matchups, 3);
        assert_eq!((week3[0].team_id, week3[0].wins, week3[0].rank), (1, 3, 1));
        assert_eq!(week3[0].win_pct, 1.0);
        assert_eq!((week3[1].team_id, week3[1].rank), (2, 2));
        assert_eq!(week3[1].win_pct, 0.0);
    }

    #[test]
    fn test_unscored_matchups_are_ignored() {
        let teams = vec![team(1, 10), team(2, 20)];
        let matchups = vec![matchup(1, 1, 2, None, Some(12.0))];

        let standings = weekly_standings(&teams, &matchups, 1);
        assert!(standings.iter().all(|s| s.wins + s.losses + s.ties == 0));
        assert!(standings.iter().all(|s| s.points_for == 0.0));
    }

    #[test]
    fn test_ties_count_for_both_sides() {
        let teams = vec![team(1, 10), team(2, 20)];
        let matchups = vec![matchup(1, 1, 2, Some(88.0), Some(88.0))];

        let standings = weekly_standings(&teams, &matchups, 1);
        assert!(standings.iter().all(|s| s.ties == 1 && s.win_pct == 0.0));
    }

    #[test]
    fn test_point_diff_breaks_equal_records() {
        let teams = vec![team(1, 10), team(2, 20), team(3, 30), team(4, 40)];
        let matchups = vec![
            matchup(1, 1, 2, Some(100.0), Some(99.0)),
            matchup(1, 3, 4, Some(140.0), Some(90.0)),
        ];

        let standings = weekly_standings(&teams, &matchups, 1);
        let order: Vec<i64> = standings.iter().map(|s| s.team_id).collect();
        assert_eq!(order, vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_identical_records_rank_by_manager_id() {
        let teams = vec![team(1, 30), team(2, 10), team(3, 20)];

        let first = weekly_standings(&teams, &[], 1);
        let mut reversed = teams.clone();
        reversed.reverse();
        let second = weekly_standings(&reversed, &[], 1);

        let managers: Vec<i64> = first.iter().map(|s| s.manager_id).collect();
        assert_eq!(managers, vec![10, 20, 30]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let teams = vec![team(1, 10), team(2, 20), team(3, 30), team(4, 40)];
        let matchups = vec![
            matchup(1, 1, 2, Some(90.0), Some(90.0)),
            matchup(1, 3, 4, Some(80.0), Some(80.0)),
            matchup(2, 1, 3, Some(70.0), Some(71.0)),
            matchup(2, 2, 4, Some(60.0), Some(59.0)),
        ];

        let once: Vec<_> = weekly_standings(&teams, &matchups, 2)
            .iter()
            .map(|s| s.to_upsert(1, 2))
            .collect();
        let twice: Vec<_> = weekly_standings(&teams, &matchups, 2)
            .iter()
            .map(|s| s.to_upsert(1, 2))
            .collect();
        assert_eq!(once, twice);
    }

    fn league(id: i64, is_finished: bool) -> LeagueRow {
        LeagueRow {
            id,
            league_key: format!("461.l.{}", id),
            league_id: id.to_string(),
            game_key: "461".to_string(),
            name: format!("League {}", id),
            season: "2025".to_string(),
            num_teams: 2,
            current_week: 14,
            start_week: 1,
            end_week: 17,
            is_finished,
            logo_url: None,
            url: None,
        }
    }

    fn season(id: i64, league_id: i64, manager_id: i64, rank: i32, wins: i32) -> TeamRow {
        TeamRow {
            league_id,
            wins,
            losses: 13 - wins,
            points_for: 1000.0 + wins as f64,
            points_against: 1000.0,
            rank: Some(rank),
            ..team(id, manager_id)
        }
    }

    #[test]
    fn test_unfinished_title_needs_rank_only_rule() {
        let leagues = vec![league(1, true), league(2, false)];
        let teams = vec![
            season(1, 1, 10, 1, 10),
            season(2, 1, 20, 2, 3),
            season(3, 2, 10, 2, 4),
            season(4, 2, 20, 1, 9),
        ];

        let titles = |rule| -> Vec<(i64, i64)> {
            manager_totals(&teams, &leagues, rule)
                .iter()
                .map(|t| (t.manager_id, t.championships))
                .collect()
        };

        assert_eq!(titles(ChampionshipRule::RequireFinished), vec![(10, 1), (20, 0)]);
        assert_eq!(titles(ChampionshipRule::RankOnly), vec![(10, 1), (20, 1)]);
    }

    #[test]
    fn test_unknown_league_counts_as_unfinished() {
        let teams = vec![season(1, 99, 10, 1, 12)];

        let strict = manager_totals(&teams, &[], ChampionshipRule::RequireFinished);
        assert_eq!(strict[0].championships, 0);
        let loose = manager_totals(&teams, &[], ChampionshipRule::RankOnly);
        assert_eq!(loose[0].championships, 1);
    }

    #[test]
    fn test_manager_totals_sum_seasons() {
        let leagues = vec![league(1, true), league(2, true)];
        let mut seeded = season(3, 2, 10, 4, 7);
        seeded.playoff_seed = Some(4);
        let mut flagged = season(1, 1, 10, 3, 8);
        flagged.is_playoff_team = true;
        let teams = vec![flagged, season(2, 1, 20, 6, 2), seeded];

        let totals = manager_totals(&teams, &leagues, ChampionshipRule::RequireFinished);
        assert_eq!(totals.len(), 2);

        let first = &totals[0];
        assert_eq!(first.manager_id, 10);
        assert_eq!((first.total_wins, first.total_losses), (15, 11));
        assert_eq!(first.total_points_for, 2015.0);
        assert_eq!(first.seasons_played, 2);
        assert_eq!(first.playoff_appearances, 2);
        assert_eq!(first.championships, 0);

        let second = &totals[1];
        assert_eq!((second.seasons_played, second.playoff_appearances), (1, 0));
    }

    #[test]
    fn test_playoff_appearance() {
        let mut t = team(1, 10);
        assert!(!is_playoff_appearance(&t));
        t.playoff_seed = Some(0);
        assert!(!is_playoff_appearance(&t));
        t.playoff_seed = Some(6);
        assert!(is_playoff_appearance(&t));
        t.playoff_seed = None;
        t.is_playoff_team = true;
        assert!(is_playoff_appearance(&t));
    }

    #[test]
    fn test_all_time_rankings() {
        let totals = vec![
            ManagerTotals {
                manager_id: 2,
                total_wins: 20,
                total_losses: 10,
                total_ties: 0,
                total_points_for: 3000.0,
                total_points_against: 2800.0,
                seasons_played: 2,
                championships: 1,
                playoff_appearances: 2,
            },
            ManagerTotals {
                manager_id: 1,
                total_wins: 0,
                total_losses: 0,
                total_ties: 0,
                total_points_for: 0.0,
                total_points_against: 0.0,
                seasons_played: 1,
                championships: 0,
                playoff_appearances: 0,
            },
        ];

        let rankings = all_time_rankings(&totals);
        assert_eq!(rankings[0].manager_id, 2);
        assert!((rankings[0].win_pct - 20.0 / 30.0).abs() < 1e-12);
        assert_eq!(rankings[0].point_diff, 200.0);
        assert_eq!(rankings[0].championships, 1);
        assert_eq!(rankings[1].win_pct, 0.0);
    }
}
