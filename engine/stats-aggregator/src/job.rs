//! The aggregation run: provider data in, standings and rankings out

use crate::config::{AggregationScope, AggregatorConfig};
use crate::ranking::{self, weekly_standings};
use crate::repository::LeagueRepository;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use league_store::{
    ChampionshipRule, LeagueRow, MatchupUpsert, NewLeague, NewManager, RankingUpsert, TeamUpsert,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use yahoo_client::{LeagueInfo, Matchup, SeasonLeagues, TeamStanding, YahooClient};

/// Provider calls the job needs
#[async_trait]
pub trait LeagueDataSource: Send + Sync {
    async fn user_leagues(&self) -> yahoo_client::Result<Vec<SeasonLeagues>>;

    async fn standings(&self, league_key: &str) -> yahoo_client::Result<Vec<TeamStanding>>;

    async fn scoreboard(
        &self,
        league_key: &str,
        week: u32,
    ) -> yahoo_client::Result<Vec<Matchup>>;
}

#[async_trait]
impl LeagueDataSource for YahooClient {
    async fn user_leagues(&self) -> yahoo_client::Result<Vec<SeasonLeagues>> {
        YahooClient::user_leagues(self).await
    }

    async fn standings(&self, league_key: &str) -> yahoo_client::Result<Vec<TeamStanding>> {
        YahooClient::standings(self, league_key).await
    }

    async fn scoreboard(
        &self,
        league_key: &str,
        week: u32,
    ) -> yahoo_client::Result<Vec<Matchup>> {
        YahooClient::scoreboard(self, league_key, week).await
    }
}

/// Counts reported by one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSummary {
    pub success: bool,
    pub leagues_processed: usize,
    pub leagues_failed: usize,
    pub teams_updated: usize,
    pub matchups_updated: usize,
    pub weekly_rankings_updated: usize,
    pub rankings_updated: usize,
    pub updated_at: DateTime<Utc>,
}

impl AggregationSummary {
    fn new() -> Self {
        Self {
            success: false,
            leagues_processed: 0,
            leagues_failed: 0,
            teams_updated: 0,
            matchups_updated: 0,
            weekly_rankings_updated: 0,
            rankings_updated: 0,
            updated_at: Utc::now(),
        }
    }

    fn add(&mut self, counts: LeagueCounts) {
        self.leagues_processed += 1;
        self.teams_updated += counts.teams;
        self.matchups_updated += counts.matchups;
        self.weekly_rankings_updated += counts.weekly_rankings;
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct LeagueCounts {
    teams: usize,
    matchups: usize,
    weekly_rankings: usize,
}

/// Brings stored standings, matchups and rankings up to date with the provider.
///
/// Leagues are processed one after another. A failing league is logged and
/// skipped; later leagues and the all-time rankings still run. A league's
/// stored `current_week` only advances once all of its scoreboards are in, so
/// a failed league is picked up from the same week next run.
pub struct AggregationJob {
    config: AggregatorConfig,
    source: Arc<dyn LeagueDataSource>,
    store: Arc<dyn LeagueRepository>,
    run_lock: Mutex<()>,
}

impl AggregationJob {
    pub fn new(
        config: AggregatorConfig,
        source: Arc<dyn LeagueDataSource>,
        store: Arc<dyn LeagueRepository>,
    ) -> Self {
        Self { config, source, store, run_lock: Mutex::new(()) }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub async fn run(&self) -> anyhow::Result<AggregationSummary> {
        let _guard = self.run_lock.lock().await;
        info!(
            "Starting stats aggregation ({:?}, season {})",
            self.config.scope, self.config.season
        );

        let seasons = self.source.user_leagues().await.context("failed to list leagues")?;
        let leagues = select_leagues(&seasons, self.config.scope, &self.config.season);
        info!("Found {} leagues to aggregate", leagues.len());

        let mut summary = AggregationSummary::new();
        for league in leagues {
            info!("Updating {} ({})", league.name, league.league_key);
            match self.process_league(league).await {
                Ok(counts) => summary.add(counts),
                Err(e) => {
                    error!("Failed to aggregate league {}: {:#}", league.league_key, e);
                    summary.leagues_failed += 1;
                }
            }
            sleep(Duration::from_millis(self.config.league_delay_ms)).await;
        }

        let rule = self.config.championship_rule;
        let rankings = recompute_all_time_rankings(self.store.as_ref(), rule).await?;
        summary.rankings_updated = rankings.len();
        summary.success = true;
        summary.updated_at = Utc::now();

        info!(
            "Aggregation finished: {} teams, {} matchups, {} weekly rankings, {} rankings \
             ({} leagues failed)",
            summary.teams_updated,
            summary.matchups_updated,
            summary.weekly_rankings_updated,
            summary.rankings_updated,
            summary.leagues_failed
        );
        Ok(summary)
    }

    async fn process_league(&self, league: &LeagueInfo) -> anyhow::Result<LeagueCounts> {
        let mut counts = LeagueCounts::default();
        let start_week = league.start_week as i32;

        let existing = self.store.find_league_by_key(&league.league_key).await?;
        let (stored_week, stored_finished) = stored_progress(existing.as_ref(), start_week);
        let previous_week = match self.config.scope {
            AggregationScope::CurrentSeason => stored_week,
            AggregationScope::AllSeasons => start_week,
        };
        let row = self
            .store
            .upsert_league(&new_league(league, stored_week, stored_finished))
            .await?;

        let standings = self
            .source
            .standings(&league.league_key)
            .await
            .context("failed to fetch standings")?;

        let mut team_ids: HashMap<String, i64> = HashMap::new();
        for standing in &standings {
            let Some(manager) = &standing.team.manager else {
                warn!("Team {} has no manager, skipping", standing.team.team_key);
                continue;
            };

            let manager_id = self
                .store
                .upsert_manager(&NewManager {
                    guid: manager.guid.clone(),
                    nickname: manager.nickname.clone(),
                    image_url: manager.image_url.clone(),
                })
                .await?;
            let team_id =
                self.store.upsert_team(&team_upsert(row.id, manager_id, standing)).await?;

            team_ids.insert(standing.team.team_key.clone(), team_id);
            counts.teams += 1;
        }

        for team in self.store.teams_for_league(row.id).await? {
            team_ids.entry(team.team_key).or_insert(team.id);
        }

        let weeks = weeks_to_fetch(previous_week, league.last_week() as i32);
        if !weeks.is_empty() {
            debug!("Fetching matchups for weeks {}-{}", weeks.start(), weeks.end());
        }
        for week in weeks {
            let matchups = self
                .source
                .scoreboard(&league.league_key, week as u32)
                .await
                .with_context(|| format!("failed to fetch week {} scoreboard", week))?;

            for matchup in &matchups {
                match resolve_matchup(row.id, matchup, &team_ids) {
                    Some(upsert) => {
                        self.store.upsert_matchup(&upsert).await?;
                        counts.matchups += 1;
                    }
                    None => debug!(
                        "Skipping week {} matchup {} vs {}: unknown team",
                        week, matchup.team1.team_key, matchup.team2.team_key
                    ),
                }
            }

            sleep(Duration::from_millis(self.config.week_delay_ms)).await;
        }

        self.store
            .update_league_progress(row.id, league.current_week as i32, league.is_finished)
            .await?;

        counts.weekly_rankings = recompute_weekly_rankings(self.store.as_ref(), row.id).await?;
        Ok(counts)
    }
}

/// Rebuild every weekly snapshot of a league from its stored matchups
pub async fn recompute_weekly_rankings(
    store: &dyn LeagueRepository,
    league_id: i64,
) -> anyhow::Result<usize> {
    let teams = store.teams_for_league(league_id).await?;
    let matchups = store.matchups_for_league(league_id).await?;
    let mut written = 0;

    for week in store.matchup_weeks(league_id).await? {
        for standing in weekly_standings(&teams, &matchups, week) {
            store.upsert_weekly_ranking(&standing.to_upsert(league_id, week)).await?;
            written += 1;
        }
    }

    Ok(written)
}

/// Rebuild the all-time rankings from every stored team row
pub async fn recompute_all_time_rankings(
    store: &dyn LeagueRepository,
    rule: ChampionshipRule,
) -> anyhow::Result<Vec<RankingUpsert>> {
    let teams = store.teams().await?;
    let leagues = store.leagues().await?;
    let totals = ranking::manager_totals(&teams, &leagues, rule);
    let rankings = ranking::all_time_rankings(&totals);

    for entry in &rankings {
        store.upsert_ranking(entry).await?;
    }

    info!("Recomputed all-time rankings for {} managers", rankings.len());
    Ok(rankings)
}

fn select_leagues<'a>(
    seasons: &'a [SeasonLeagues],
    scope: AggregationScope,
    season: &str,
) -> Vec<&'a LeagueInfo> {
    seasons
        .iter()
        .filter(|s| scope == AggregationScope::AllSeasons || s.season == season)
        .flat_map(|s| s.leagues.iter())
        .collect()
}

/// Weeks from the last stored week through the last week with results
fn weeks_to_fetch(previous_week: i32, last_week: i32) -> RangeInclusive<i32> {
    previous_week.max(1)..=last_week
}

/// The stored week to resume from and the finished flag to keep until the
/// league's scoreboards are all fetched
fn stored_progress(existing: Option<&LeagueRow>, start_week: i32) -> (i32, bool) {
    existing.map_or((start_week, false), |row| (row.current_week.max(start_week), row.is_finished))
}

fn new_league(league: &LeagueInfo, current_week: i32, is_finished: bool) -> NewLeague {
    NewLeague {
        league_key: league.league_key.clone(),
        league_id: league.league_id.clone(),
        game_key: league.game_key.clone(),
        name: league.name.clone(),
        season: league.season.clone(),
        num_teams: league.num_teams as i32,
        current_week,
        start_week: league.start_week as i32,
        end_week: league.end_week as i32,
        is_finished,
        logo_url: league.logo_url.clone(),
        url: league.url.clone(),
    }
}

fn team_upsert(league_id: i64, manager_id: i64, standing: &TeamStanding) -> TeamUpsert {
    TeamUpsert {
        team_key: standing.team.team_key.clone(),
        team_id: standing.team.team_id.clone(),
        league_id,
        manager_id,
        name: standing.team.name.clone(),
        logo_url: standing.team.logo_url.clone(),
        url: standing.team.url.clone(),
        wins: standing.wins as i32,
        losses: standing.losses as i32,
        ties: standing.ties as i32,
        win_pct: ranking::win_pct(
            standing.wins.into(),
            standing.losses.into(),
            standing.ties.into(),
        ),
        points_for: standing.points_for,
        points_against: standing.points_against,
        rank: standing.rank.map(|r| r as i32),
        playoff_seed: standing.playoff_seed.map(|s| s as i32),
        is_playoff_team: standing.is_playoff_team(),
    }
}

/// Map a provider matchup onto stored team ids; `None` when either team is unknown
pub(crate) fn resolve_matchup(
    league_id: i64,
    matchup: &Matchup,
    team_ids: &HashMap<String, i64>,
) -> Option<MatchupUpsert> {
    let team1_id = *team_ids.get(&matchup.team1.team_key)?;
    let team2_id = *team_ids.get(&matchup.team2.team_key)?;
    let winner_id = matchup.winner_team_key.as_ref().and_then(|key| team_ids.get(key).copied());

    Some(MatchupUpsert {
        league_id,
        week: matchup.week as i32,
        team1_id,
        team2_id,
        team1_points: Some(matchup.team1.points),
        team2_points: Some(matchup.team2.points),
        winner_id,
        is_playoff: matchup.is_playoff,
        is_tie: matchup.is_tie,
    })
}
