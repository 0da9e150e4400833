//! Data ingestion and storage
//!
//! OpenDota client plus the storage interface and its SQLite and in-memory
//! adapters.

pub mod api;
pub mod database;
pub mod memory;

pub use api::{MatchProvider, OpenDotaClient};
pub use database::Database;
pub use memory::MemoryStore;

use crate::stats::RecordFilter;
use crate::{
    Hero, InferredPlayerRecord, League, LeagueId, MatchId, Player, Result, Team, TeamId,
};

/// Persistence capabilities used by ingestion and statistics
pub trait MatchStore {
    /// Highest match id with at least one stored record
    fn high_water_mark(&self) -> Result<Option<MatchId>>;

    fn league_exists(&self, league: LeagueId) -> Result<bool>;

    /// Register a league; an existing registration is kept as is
    fn insert_league(&mut self, league: &League) -> Result<()>;

    fn league(&self, league: LeagueId) -> Result<Option<League>>;

    fn leagues(&self) -> Result<Vec<League>>;

    /// Insert a team or refresh its name and rating
    fn upsert_team(&mut self, team: &Team) -> Result<()>;

    /// All teams, or those whose current players have records in a league
    fn teams(&self, league: Option<LeagueId>) -> Result<Vec<Team>>;

    /// Insert a player or move them to their current team
    ///
    /// A player has one row; the latest roster refresh wins.
    fn upsert_player(&mut self, player: &Player) -> Result<()>;

    /// Players on a team, or all players
    fn players(&self, team: Option<TeamId>) -> Result<Vec<Player>>;

    fn upsert_heroes(&mut self, heroes: &[Hero]) -> Result<()>;

    fn heroes(&self) -> Result<Vec<Hero>>;

    /// Insert or replace the record for (match_id, account_id)
    fn upsert_inferred_record(&mut self, record: &InferredPlayerRecord) -> Result<()>;

    fn query_records(&self, filter: &RecordFilter) -> Result<Vec<InferredPlayerRecord>>;

    fn stats(&self) -> Result<DatabaseStats>;
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseStats {
    pub hero_count: usize,
    pub league_count: usize,
    pub team_count: usize,
    pub player_count: usize,
    pub match_count: usize,
    pub record_count: usize,
    pub high_water_mark: Option<MatchId>,
}
