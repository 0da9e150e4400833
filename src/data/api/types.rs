//! OpenDota response payloads
//!
//! Only the fields the pipeline reads are modelled. Anything the API may send
//! as `null` is an `Option`.

use crate::{AccountId, Hero, HeroId, LeagueId, MatchId, Side, TeamId};
use serde::{Deserialize, Serialize};

/// Entry of `/leagues/{id}/matches`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueMatch {
    pub match_id: MatchId,
}

/// Full match from `/matches/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetail {
    pub match_id: MatchId,
    #[serde(default)]
    pub patch: Option<i64>,
    #[serde(default)]
    pub leagueid: Option<LeagueId>,
    /// Absent when the match was never parsed
    #[serde(default)]
    pub players: Option<Vec<RawPlayerRecord>>,
}

/// Per-player telemetry inside a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlayerRecord {
    #[serde(default)]
    pub account_id: Option<AccountId>,
    pub hero_id: HeroId,
    #[serde(rename = "isRadiant")]
    pub is_radiant: bool,
    #[serde(default)]
    pub lane: Option<u8>,
    #[serde(default)]
    pub lane_role: Option<u8>,
    #[serde(default)]
    pub is_roaming: Option<bool>,
    #[serde(default)]
    pub hero_kills: u32,
    /// Cumulative last hits, one entry per minute
    #[serde(default)]
    pub lh_t: Option<Vec<u32>>,
    /// Cumulative denies, one entry per minute
    #[serde(default)]
    pub dn_t: Option<Vec<u32>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub personaname: Option<String>,
}

impl RawPlayerRecord {
    /// Pro name when known, otherwise the Steam persona
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.personaname.as_deref())
            .unwrap_or("unknown")
    }

    pub fn side(&self) -> Side {
        Side::from_is_radiant(self.is_radiant)
    }

    pub fn raw_lane_role(&self) -> u8 {
        self.lane_role.unwrap_or(0)
    }

    pub fn roaming_flag(&self) -> bool {
        self.is_roaming.unwrap_or(false)
    }

    /// Roaming or jungling; such players never take a lane position
    pub fn is_roaming_or_jungle(&self) -> bool {
        self.roaming_flag() || self.raw_lane_role() == 4
    }

    pub fn last_hits_at(&self, minute: usize) -> Option<u32> {
        self.lh_t.as_ref().and_then(|lh| lh.get(minute).copied())
    }

    pub fn denies_at(&self, minute: usize) -> Option<u32> {
        self.dn_t.as_ref().and_then(|dn| dn.get(minute).copied())
    }

    /// Number of per-minute last-hit snapshots
    pub fn snapshot_count(&self) -> usize {
        self.lh_t.as_ref().map_or(0, Vec::len)
    }
}

/// Entry of `/heroStats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroStat {
    pub id: HeroId,
    pub localized_name: String,
    pub attack_type: String,
    pub primary_attr: String,
    #[serde(default)]
    pub base_attack_min: i64,
    #[serde(default)]
    pub base_attack_max: i64,
}

impl From<HeroStat> for Hero {
    fn from(stat: HeroStat) -> Self {
        Hero {
            id: stat.id,
            name: stat.localized_name,
            attack_type: stat.attack_type,
            primary_attribute: stat.primary_attr,
            base_attack_min: stat.base_attack_min,
            base_attack_max: stat.base_attack_max,
        }
    }
}

/// `/leagues/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub leagueid: LeagueId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
}

/// Entry of `/leagues/{id}/teams`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueTeam {
    pub team_id: TeamId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Entry of `/teams/{id}/players`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub account_id: AccountId,
    #[serde(default)]
    pub name: Option<String>,
    /// Steam persona, used when no pro name is registered
    #[serde(default)]
    pub personaname: Option<String>,
    #[serde(default)]
    pub is_current_team_member: Option<bool>,
}

impl RosterEntry {
    /// Pro name, falling back to the Steam persona; blank names count as absent
    pub fn display_name(&self) -> Option<&str> {
        [self.name.as_deref(), self.personaname.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
    }
}
