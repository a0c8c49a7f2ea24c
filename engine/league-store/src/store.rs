//! LeagueStore implementation

use crate::config::DatabaseConfig;
use crate::models::*;
use crate::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use tracing::info;

const LEAGUE_COLUMNS: &str = "id, league_key, league_id, game_key, name, season, num_teams, \
     current_week, start_week, end_week, is_finished, logo_url, url";

/// Nickname and avatar always follow the provider, a removed avatar clears
const UPSERT_MANAGER_SQL: &str = r#"
    INSERT INTO managers (guid, nickname, image_url)
    VALUES ($1, $2, $3)
    ON CONFLICT (guid) DO UPDATE SET
        nickname = EXCLUDED.nickname,
        image_url = EXCLUDED.image_url,
        updated_at = NOW()
    RETURNING id
"#;

const TEAM_COLUMNS: &str = "id, team_key, team_id, league_id, manager_id, name, logo_url, url, \
     wins, losses, ties, win_pct, points_for, points_against, rank, playoff_seed, is_playoff_team";

/// Relational store for leagues, teams, matchups and rankings
///
/// Each method is a single statement; nothing spans a transaction.
#[derive(Debug, Clone)]
pub struct LeagueStore {
    pool: PgPool,
}

impl LeagueStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        info!("Connected to league database");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // Managers

    /// Insert or refresh a manager by GUID, returning its row id
    pub async fn upsert_manager(&self, manager: &NewManager) -> Result<i64> {
        let id = sqlx::query_scalar(UPSERT_MANAGER_SQL)
            .bind(&manager.guid)
            .bind(&manager.nickname)
            .bind(&manager.image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    pub async fn managers_with_teams(&self) -> Result<Vec<ManagerWithTeams>> {
        let managers: Vec<ManagerRow> = sqlx::query_as(
            "SELECT id, guid, nickname, image_url FROM managers ORDER BY nickname, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let teams = self.teams().await?;

        Ok(group_teams(managers, teams))
    }

    // Leagues

    /// Insert or refresh a league season by its key
    pub async fn upsert_league(&self, league: &NewLeague) -> Result<LeagueRow> {
        let row = sqlx::query_as(&format!(
            r#"
            INSERT INTO leagues (league_key, league_id, game_key, name, season, num_teams,
                current_week, start_week, end_week, is_finished, logo_url, url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (league_key) DO UPDATE SET
                name = EXCLUDED.name,
                season = EXCLUDED.season,
                num_teams = EXCLUDED.num_teams,
                current_week = EXCLUDED.current_week,
                start_week = EXCLUDED.start_week,
                end_week = EXCLUDED.end_week,
                is_finished = EXCLUDED.is_finished,
                logo_url = EXCLUDED.logo_url,
                url = EXCLUDED.url,
                updated_at = NOW()
            RETURNING {}
            "#,
            LEAGUE_COLUMNS
        ))
        .bind(&league.league_key)
        .bind(&league.league_id)
        .bind(&league.game_key)
        .bind(&league.name)
        .bind(&league.season)
        .bind(league.num_teams)
        .bind(league.current_week)
        .bind(league.start_week)
        .bind(league.end_week)
        .bind(league.is_finished)
        .bind(&league.logo_url)
        .bind(&league.url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_league_by_key(&self, league_key: &str) -> Result<Option<LeagueRow>> {
        let row = sqlx::query_as(&format!(
            "SELECT {} FROM leagues WHERE league_key = $1",
            LEAGUE_COLUMNS
        ))
        .bind(league_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_league(&self, id: i64) -> Result<Option<LeagueRow>> {
        let row = sqlx::query_as(&format!("SELECT {} FROM leagues WHERE id = $1", LEAGUE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Every stored league, newest season first
    pub async fn leagues(&self) -> Result<Vec<LeagueRow>> {
        let rows = sqlx::query_as(&format!(
            "SELECT {} FROM leagues ORDER BY season DESC, league_key",
            LEAGUE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Record how far a league has been aggregated
    pub async fn update_league_progress(
        &self,
        id: i64,
        current_week: i32,
        is_finished: bool,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE leagues SET current_week = $2, is_finished = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(current_week)
        .bind(is_finished)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Teams

    /// Insert or refresh a team's season record, returning its row id
    pub async fn upsert_team(&self, team: &TeamUpsert) -> Result<i64> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO teams (team_key, team_id, league_id, manager_id, name, logo_url, url,
                wins, losses, ties, win_pct, points_for, points_against, rank, playoff_seed,
                is_playoff_team)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (team_key) DO UPDATE SET
                manager_id = EXCLUDED.manager_id,
                name = EXCLUDED.name,
                logo_url = EXCLUDED.logo_url,
                url = EXCLUDED.url,
                wins = EXCLUDED.wins,
                losses = EXCLUDED.losses,
                ties = EXCLUDED.ties,
                win_pct = EXCLUDED.win_pct,
                points_for = EXCLUDED.points_for,
                points_against = EXCLUDED.points_against,
                rank = EXCLUDED.rank,
                playoff_seed = EXCLUDED.playoff_seed,
                is_playoff_team = EXCLUDED.is_playoff_team,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(&team.team_key)
        .bind(&team.team_id)
        .bind(team.league_id)
        .bind(team.manager_id)
        .bind(&team.name)
        .bind(&team.logo_url)
        .bind(&team.url)
        .bind(team.wins)
        .bind(team.losses)
        .bind(team.ties)
        .bind(team.win_pct)
        .bind(team.points_for)
        .bind(team.points_against)
        .bind(team.rank)
        .bind(team.playoff_seed)
        .bind(team.is_playoff_team)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn teams_for_league(&self, league_id: i64) -> Result<Vec<TeamRow>> {
        let rows = sqlx::query_as(&format!(
            "SELECT {} FROM teams WHERE league_id = $1 ORDER BY rank NULLS LAST, id",
            TEAM_COLUMNS
        ))
        .bind(league_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every stored team across all leagues
    pub async fn teams(&self) -> Result<Vec<TeamRow>> {
        let rows = sqlx::query_as(&format!(
            "SELECT {} FROM teams ORDER BY league_id, id",
            TEAM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // Matchups

    pub async fn upsert_matchup(&self, matchup: &MatchupUpsert) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO matchups (league_id, week, team1_id, team2_id, team1_points,
                team2_points, winner_id, is_playoff, is_tie)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (league_id, week, team1_id, team2_id) DO UPDATE SET
                team1_points = EXCLUDED.team1_points,
                team2_points = EXCLUDED.team2_points,
                winner_id = EXCLUDED.winner_id,
                is_playoff = EXCLUDED.is_playoff,
                is_tie = EXCLUDED.is_tie,
                updated_at = NOW()
            "#,
        )
        .bind(matchup.league_id)
        .bind(matchup.week)
        .bind(matchup.team1_id)
        .bind(matchup.team2_id)
        .bind(matchup.team1_points)
        .bind(matchup.team2_points)
        .bind(matchup.winner_id)
        .bind(matchup.is_playoff)
        .bind(matchup.is_tie)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn matchups_for_league(&self, league_id: i64) -> Result<Vec<MatchupRow>> {
        let rows = sqlx::query_as(
            r#"
            SELECT id, league_id, week, team1_id, team2_id, team1_points, team2_points,
                winner_id, is_playoff, is_tie
            FROM matchups
            WHERE league_id = $1
            ORDER BY week, id
            "#,
        )
        .bind(league_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Weeks that have at least one stored matchup, ascending
    pub async fn matchup_weeks(&self, league_id: i64) -> Result<Vec<i32>> {
        let weeks = sqlx::query_scalar(
            "SELECT DISTINCT week FROM matchups WHERE league_id = $1 ORDER BY week",
        )
        .bind(league_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(weeks)
    }

    /// One week's matchups with both teams and their managers
    pub async fn scoreboard(&self, league_id: i64, week: i32) -> Result<Vec<ScoreboardRow>> {
        let rows = sqlx::query_as(
            r#"
            SELECT mu.id AS matchup_id, mu.week, mu.is_playoff, mu.is_tie, mu.winner_id,
                t1.id AS team1_id, t1.team_key AS team1_key, t1.team_id AS team1_team_id,
                t1.name AS team1_name, t1.logo_url AS team1_logo_url, mu.team1_points,
                m1.guid AS team1_manager_guid, m1.nickname AS team1_manager_nickname,
                m1.image_url AS team1_manager_image_url,
                t2.id AS team2_id, t2.team_key AS team2_key, t2.team_id AS team2_team_id,
                t2.name AS team2_name, t2.logo_url AS team2_logo_url, mu.team2_points,
                m2.guid AS team2_manager_guid, m2.nickname AS team2_manager_nickname,
                m2.image_url AS team2_manager_image_url
            FROM matchups mu
            JOIN teams t1 ON t1.id = mu.team1_id
            JOIN managers m1 ON m1.id = t1.manager_id
            JOIN teams t2 ON t2.id = mu.team2_id
            JOIN managers m2 ON m2.id = t2.manager_id
            WHERE mu.league_id = $1 AND mu.week = $2
            ORDER BY mu.id
            "#,
        )
        .bind(league_id)
        .bind(week)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every stored matchup with league and team names
    pub async fn matchup_details(&self) -> Result<Vec<MatchupDetail>> {
        let rows = sqlx::query_as(
            r#"
            SELECT mu.id AS matchup_id, mu.league_id, l.name AS league_name, l.season,
                mu.week, mu.is_playoff,
                mu.team1_id, t1.name AS team1_name, mu.team1_points,
                mu.team2_id, t2.name AS team2_name, mu.team2_points,
                mu.winner_id
            FROM matchups mu
            JOIN leagues l ON l.id = mu.league_id
            JOIN teams t1 ON t1.id = mu.team1_id
            JOIN teams t2 ON t2.id = mu.team2_id
            ORDER BY mu.league_id, mu.week, mu.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // Weekly rankings

    pub async fn upsert_weekly_ranking(&self, ranking: &WeeklyRankingUpsert) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO weekly_rankings (league_id, manager_id, week, rank, wins, losses, ties,
                win_pct, points_for, points_against)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (league_id, manager_id, week) DO UPDATE SET
                rank = EXCLUDED.rank,
                wins = EXCLUDED.wins,
                losses = EXCLUDED.losses,
                ties = EXCLUDED.ties,
                win_pct = EXCLUDED.win_pct,
                points_for = EXCLUDED.points_for,
                points_against = EXCLUDED.points_against
            "#,
        )
        .bind(ranking.league_id)
        .bind(ranking.manager_id)
        .bind(ranking.week)
        .bind(ranking.rank)
        .bind(ranking.wins)
        .bind(ranking.losses)
        .bind(ranking.ties)
        .bind(ranking.win_pct)
        .bind(ranking.points_for)
        .bind(ranking.points_against)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A league's weekly snapshots ordered by week, then rank
    pub async fn weekly_rankings(&self, league_id: i64) -> Result<Vec<WeeklyRankingEntry>> {
        let rows = sqlx::query_as(
            r#"
            SELECT wr.league_id, wr.manager_id, m.nickname AS manager_name, wr.week, wr.rank,
                wr.wins, wr.losses, wr.ties, wr.win_pct, wr.points_for, wr.points_against
            FROM weekly_rankings wr
            JOIN managers m ON m.id = wr.manager_id
            WHERE wr.league_id = $1
            ORDER BY wr.week, wr.rank
            "#,
        )
        .bind(league_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // All-time rankings

    pub async fn upsert_ranking(&self, ranking: &RankingUpsert) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rankings (manager_id, total_wins, total_losses, total_ties, win_pct,
                total_points_for, total_points_against, point_diff, seasons_played,
                championships, playoff_appearances, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            ON CONFLICT (manager_id) DO UPDATE SET
                total_wins = EXCLUDED.total_wins,
                total_losses = EXCLUDED.total_losses,
                total_ties = EXCLUDED.total_ties,
                win_pct = EXCLUDED.win_pct,
                total_points_for = EXCLUDED.total_points_for,
                total_points_against = EXCLUDED.total_points_against,
                point_diff = EXCLUDED.point_diff,
                seasons_played = EXCLUDED.seasons_played,
                championships = EXCLUDED.championships,
                playoff_appearances = EXCLUDED.playoff_appearances,
                updated_at = NOW()
            "#,
        )
        .bind(ranking.manager_id)
        .bind(ranking.total_wins)
        .bind(ranking.total_losses)
        .bind(ranking.total_ties)
        .bind(ranking.win_pct)
        .bind(ranking.total_points_for)
        .bind(ranking.total_points_against)
        .bind(ranking.point_diff)
        .bind(ranking.seasons_played)
        .bind(ranking.championships)
        .bind(ranking.playoff_appearances)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All-time rankings, best first
    pub async fn all_rankings(&self) -> Result<Vec<RankingEntry>> {
        let rows = sqlx::query_as(
            r#"
            SELECT r.manager_id, m.guid, m.nickname, m.image_url, r.total_wins,
                r.total_losses, r.total_ties, r.win_pct, r.total_points_for,
                r.total_points_against, r.point_diff, r.seasons_played, r.championships,
                r.playoff_appearances, r.updated_at
            FROM rankings r
            JOIN managers m ON m.id = r.manager_id
            ORDER BY r.win_pct DESC, r.total_wins DESC, r.manager_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

fn group_teams(managers: Vec<ManagerRow>, teams: Vec<TeamRow>) -> Vec<ManagerWithTeams> {
    let mut by_manager: HashMap<i64, Vec<TeamRow>> = HashMap::new();
    for team in teams {
        by_manager.entry(team.manager_id).or_default().push(team);
    }

    managers
        .into_iter()
        .map(|manager| {
            let teams = by_manager.remove(&manager.id).unwrap_or_default();
            ManagerWithTeams { manager, teams }
        })
        .collect()
}
