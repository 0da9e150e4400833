//! Statistics over inferred player records
//!
//! Records are selected with a [`RecordFilter`] and summarized as average and
//! median last hits at five minutes and kills.

pub mod aggregate;

pub use aggregate::{PerformanceSummary, Summary};

use crate::{AccountId, AssumedRole, HeroId, InferredPlayerRecord, LaneHero, LeagueId, TeamId};
use serde::{Deserialize, Serialize};

/// Selection of records; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub account_id: Option<AccountId>,
    /// Case-insensitive prefix of the player's roster name
    pub player_name: Option<String>,
    pub hero_id: Option<HeroId>,
    /// Players on this team's roster at the last refresh
    pub team_id: Option<TeamId>,
    pub league_id: Option<LeagueId>,
    pub patch_id: Option<i64>,
    pub role: Option<AssumedRole>,
    /// Hero name that must be on the player's side of the lane
    pub ally_hero: Option<String>,
    /// Hero name that must be on the opposing side of the lane
    pub enemy_hero: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn player_name(mut self, prefix: &str) -> Self {
        self.player_name = Some(prefix.to_string());
        self
    }

    /// Whether a roster name starts with the requested prefix
    pub fn matches_player_name(&self, name: &str) -> bool {
        self.player_name.as_deref().map_or(true, |prefix| {
            name.to_lowercase().starts_with(&prefix.to_lowercase())
        })
    }

    pub fn hero(mut self, hero_id: HeroId) -> Self {
        self.hero_id = Some(hero_id);
        self
    }

    pub fn team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn league(mut self, league_id: LeagueId) -> Self {
        self.league_id = Some(league_id);
        self
    }

    pub fn patch(mut self, patch_id: i64) -> Self {
        self.patch_id = Some(patch_id);
        self
    }

    pub fn role(mut self, role: AssumedRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn ally_hero(mut self, name: &str) -> Self {
        self.ally_hero = Some(name.to_string());
        self
    }

    pub fn enemy_hero(mut self, name: &str) -> Self {
        self.enemy_hero = Some(name.to_string());
        self
    }

    /// Check every criterion except team and player name, which need roster data
    pub fn matches(&self, record: &InferredPlayerRecord) -> bool {
        self.account_id.map_or(true, |id| record.account_id == id)
            && self.hero_id.map_or(true, |id| record.hero_id == id)
            && self.league_id.map_or(true, |id| record.league_id == id)
            && self.patch_id.map_or(true, |p| record.patch_id == Some(p))
            && self.role.map_or(true, |r| record.assumed_lane_role == r)
            && self.matches_lane(record)
    }

    /// Check only the ally/enemy hero criteria
    pub fn matches_lane(&self, record: &InferredPlayerRecord) -> bool {
        fn on_lane(heroes: &[LaneHero], name: &str) -> bool {
            heroes.iter().any(|h| h.name.eq_ignore_ascii_case(name))
        }

        self.ally_hero
            .as_deref()
            .map_or(true, |name| on_lane(&record.heroes_on_lane, name))
            && self
                .enemy_hero
                .as_deref()
                .map_or(true, |name| on_lane(&record.enemy_heroes_on_lane, name))
    }
}
