//! Storage calls the aggregation job makes
//!
//! [`LeagueStore`] is the production implementation. The trait keeps the job
//! independent of Postgres so a run can be driven against any backing store.

use async_trait::async_trait;
use league_store::{
    LeagueRow, LeagueStore, MatchupRow, MatchupUpsert, NewLeague, NewManager, RankingUpsert,
    Result, TeamRow, TeamUpsert, WeeklyRankingUpsert,
};

#[async_trait]
pub trait LeagueRepository: Send + Sync {
    async fn find_league_by_key(&self, league_key: &str) -> Result<Option<LeagueRow>>;

    async fn upsert_league(&self, league: &NewLeague) -> Result<LeagueRow>;

    async fn update_league_progress(
        &self,
        id: i64,
        current_week: i32,
        is_finished: bool,
    ) -> Result<()>;

    async fn leagues(&self) -> Result<Vec<LeagueRow>>;

    async fn upsert_manager(&self, manager: &NewManager) -> Result<i64>;

    async fn upsert_team(&self, team: &TeamUpsert) -> Result<i64>;

    async fn teams_for_league(&self, league_id: i64) -> Result<Vec<TeamRow>>;

    async fn teams(&self) -> Result<Vec<TeamRow>>;

    async fn upsert_matchup(&self, matchup: &MatchupUpsert) -> Result<()>;

    async fn matchups_for_league(&self, league_id: i64) -> Result<Vec<MatchupRow>>;

    async fn matchup_weeks(&self, league_id: i64) -> Result<Vec<i32>>;

    async fn upsert_weekly_ranking(&self, ranking: &WeeklyRankingUpsert) -> Result<()>;

    async fn upsert_ranking(&self, ranking: &RankingUpsert) -> Result<()>;
}

#[async_trait]
impl LeagueRepository for LeagueStore {
    async fn find_league_by_key(&self, league_key: &str) -> Result<Option<LeagueRow>> {
        LeagueStore::find_league_by_key(self, league_key).await
    }

    async fn upsert_league(&self, league: &NewLeague) -> Result<LeagueRow> {
        LeagueStore::upsert_league(self, league).await
    }

    async fn update_league_progress(
        &self,
        id: i64,
        current_week: i32,
        is_finished: bool,
    ) -> Result<()> {
        LeagueStore::update_league_progress(self, id, current_week, is_finished).await
    }

    async fn leagues(&self) -> Result<Vec<LeagueRow>> {
        LeagueStore::leagues(self).await
    }

    async fn upsert_manager(&self, manager: &NewManager) -> Result<i64> {
        LeagueStore::upsert_manager(self, manager).await
    }

    async fn upsert_team(&self, team: &TeamUpsert) -> Result<i64> {
        LeagueStore::upsert_team(self, team).await
    }

    async fn teams_for_league(&self, league_id: i64) -> Result<Vec<TeamRow>> {
        LeagueStore::teams_for_league(self, league_id).await
    }

    async fn teams(&self) -> Result<Vec<TeamRow>> {
        LeagueStore::teams(self).await
    }

    async fn upsert_matchup(&self, matchup: &MatchupUpsert) -> Result<()> {
        LeagueStore::upsert_matchup(self, matchup).await
    }

    async fn matchups_for_league(&self, league_id: i64) -> Result<Vec<MatchupRow>> {
        LeagueStore::matchups_for_league(self, league_id).await
    }

    async fn matchup_weeks(&self, league_id: i64) -> Result<Vec<i32>> {
        LeagueStore::matchup_weeks(self, league_id).await
    }

    async fn upsert_weekly_ranking(&self, ranking: &WeeklyRankingUpsert) -> Result<()> {
        LeagueStore::upsert_weekly_ranking(self, ranking).await
    }

    async fn upsert_ranking(&self, ranking: &RankingUpsert) -> Result<()> {
        LeagueStore::upsert_ranking(self, ranking).await
    }
}
