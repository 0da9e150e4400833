//! Upstream match data provider

pub mod opendota;
pub mod types;

pub use opendota::OpenDotaClient;
pub use types::{
    HeroStat, LeagueInfo, LeagueMatch, LeagueTeam, MatchDetail, RawPlayerRecord, RosterEntry,
};

use crate::{LeagueId, MatchId, Result, TeamId};

/// Source of tournament, match and roster data
pub trait MatchProvider {
    /// Ids of all matches played in a league, in provider order
    fn league_match_ids(&self, league: LeagueId) -> Result<Vec<MatchId>>;

    /// Full match including per-player telemetry
    fn match_detail(&self, match_id: MatchId) -> Result<MatchDetail>;

    fn hero_catalog(&self) -> Result<Vec<HeroStat>>;

    fn league_info(&self, league: LeagueId) -> Result<LeagueInfo>;

    fn league_teams(&self, league: LeagueId) -> Result<Vec<LeagueTeam>>;

    fn team_roster(&self, team: TeamId) -> Result<Vec<RosterEntry>>;
}
