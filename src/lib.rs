//! Lane role inference for professional Dota 2 matches
//!
//! Ingests tournament matches from OpenDota, infers each player's lane role
//! (including support positions the API does not report) and serves
//! last-hit and kill statistics over the stored results.

pub mod data;
pub mod inference;
pub mod ingest;
pub mod stats;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Unique identifier for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub i64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Unique identifier for a league (tournament)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueId(pub i64);

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "League({})", self.0)
    }
}

/// Unique identifier for a hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeroId(pub i64);

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hero({})", self.0)
    }
}

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// Steam account identifier of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.0)
    }
}

/// Team side within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Radiant,
    Dire,
}

impl Side {
    pub fn from_is_radiant(is_radiant: bool) -> Self {
        if is_radiant {
            Side::Radiant
        } else {
            Side::Dire
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Radiant => Side::Dire,
            Side::Dire => Side::Radiant,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Radiant => write!(f, "Radiant"),
            Side::Dire => write!(f, "Dire"),
        }
    }
}

/// Categorical lane role as reported by the match parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneRole {
    Safelane,
    Mid,
    Offlane,
    Jungle,
}

impl LaneRole {
    /// Map the raw API value. 0 means the parser could not place the player.
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            1 => Some(LaneRole::Safelane),
            2 => Some(LaneRole::Mid),
            3 => Some(LaneRole::Offlane),
            4 => Some(LaneRole::Jungle),
            _ => None,
        }
    }
}

/// Lane role after support disambiguation
///
/// Persisted as a number: 1, 2 and 3 are the core lanes, 4 is the offlane
/// support, 4.5 a roaming support and 5 the safelane (hard) support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum AssumedRole {
    Safelane,
    Mid,
    Offlane,
    SoftSupport,
    Roaming,
    HardSupport,
}

impl AssumedRole {
    pub fn value(&self) -> f64 {
        match self {
            AssumedRole::Safelane => 1.0,
            AssumedRole::Mid => 2.0,
            AssumedRole::Offlane => 3.0,
            AssumedRole::SoftSupport => 4.0,
            AssumedRole::Roaming => 4.5,
            AssumedRole::HardSupport => 5.0,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        [
            AssumedRole::Safelane,
            AssumedRole::Mid,
            AssumedRole::Offlane,
            AssumedRole::SoftSupport,
            AssumedRole::Roaming,
            AssumedRole::HardSupport,
        ]
        .into_iter()
        .find(|role| role.value() == value)
    }

    /// The support position played by the secondary player of this lane
    pub fn support_counterpart(self) -> Self {
        match self {
            AssumedRole::Safelane => AssumedRole::HardSupport,
            AssumedRole::Mid => AssumedRole::Roaming,
            AssumedRole::Offlane => AssumedRole::SoftSupport,
            other => other,
        }
    }

    pub fn is_core(&self) -> bool {
        matches!(
            self,
            AssumedRole::Safelane | AssumedRole::Mid | AssumedRole::Offlane
        )
    }
}

impl From<LaneRole> for AssumedRole {
    fn from(role: LaneRole) -> Self {
        match role {
            LaneRole::Safelane => AssumedRole::Safelane,
            LaneRole::Mid => AssumedRole::Mid,
            LaneRole::Offlane => AssumedRole::Offlane,
            LaneRole::Jungle => AssumedRole::Roaming,
        }
    }
}

impl From<AssumedRole> for f64 {
    fn from(role: AssumedRole) -> Self {
        role.value()
    }
}

impl TryFrom<f64> for AssumedRole {
    type Error = String;

    fn try_from(value: f64) -> std::result::Result<Self, Self::Error> {
        AssumedRole::from_value(value).ok_or_else(|| format!("Not a lane role: {}", value))
    }
}

impl fmt::Display for AssumedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssumedRole::Safelane => write!(f, "Safelane (1)"),
            AssumedRole::Mid => write!(f, "Mid (2)"),
            AssumedRole::Offlane => write!(f, "Offlane (3)"),
            AssumedRole::SoftSupport => write!(f, "Soft support (4)"),
            AssumedRole::Roaming => write!(f, "Roaming support (4.5)"),
            AssumedRole::HardSupport => write!(f, "Hard support (5)"),
        }
    }
}

/// A hero from the OpenDota hero catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub attack_type: String,
    pub primary_attribute: String,
    pub base_attack_min: i64,
    pub base_attack_max: i64,
}

/// Read-only hero lookup handed to the inference engine
#[derive(Debug, Clone, Default)]
pub struct HeroCatalog {
    heroes: HashMap<HeroId, Hero>,
}

impl HeroCatalog {
    pub fn new(heroes: impl IntoIterator<Item = Hero>) -> Self {
        HeroCatalog {
            heroes: heroes.into_iter().map(|h| (h.id, h)).collect(),
        }
    }

    pub fn get(&self, id: HeroId) -> Option<&Hero> {
        self.heroes.get(&id)
    }

    /// Resolve a hero name; an unknown id is an integrity error.
    pub fn name(&self, id: HeroId) -> Result<&str> {
        self.get(id)
            .map(|h| h.name.as_str())
            .ok_or(DotaError::UnknownHero(id))
    }
}

/// A tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub tier: String,
    /// Patch of the league's first match, used for the whole league
    pub patch_id: i64,
}

/// A professional team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub rating: f64,
}

/// A player's affiliation with a team at the last roster refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub account_id: AccountId,
    pub name: String,
    pub team_id: TeamId,
    pub is_active: bool,
}

/// A hero sharing a lane with the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneHero {
    pub id: HeroId,
    pub name: String,
}

/// Join lane heroes for display, e.g. "Crystal Maiden, Juggernaut"
pub fn lane_names(heroes: &[LaneHero]) -> String {
    heroes
        .iter()
        .map(|h| h.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One player's inferred lane data for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredPlayerRecord {
    pub match_id: MatchId,
    pub league_id: LeagueId,
    pub account_id: AccountId,
    pub hero_id: HeroId,
    pub kills: u32,
    pub last_hits_at_5: u32,
    pub denies_at_5: u32,
    /// All heroes on the player's side of the lane, the player included
    pub heroes_on_lane: Vec<LaneHero>,
    pub enemy_heroes_on_lane: Vec<LaneHero>,
    pub assumed_lane_role: AssumedRole,
    pub is_roaming: bool,
    pub is_radiant: bool,
    pub patch_id: Option<i64>,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum DotaError {
    #[error("Invalid lane role {lane_role} for player {player} in match {match_id}")]
    InvalidLaneRole {
        match_id: MatchId,
        player: String,
        lane_role: u8,
    },

    #[error("Invalid data for player {player} in match {match_id}: {reason}")]
    Validation {
        match_id: MatchId,
        player: String,
        reason: String,
    },

    #[error("Match {0} has no players")]
    MalformedMatch(MatchId),

    #[error("Unknown hero: {0}")]
    UnknownHero(HeroId),

    #[error("Upstream request to {endpoint} failed: {message}")]
    Upstream { endpoint: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store integrity error: {0}")]
    Integrity(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, DotaError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub leagues: Vec<LeagueEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Pause between match fetches to stay under the rate limit
    pub request_delay_secs: u64,
    pub timeout_secs: u64,
    /// Directory for cached match payloads
    #[serde(default)]
    pub cache_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

/// A tournament to ingest; leagues without a known id are skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueEntry {
    pub name: String,
    #[serde(default)]
    pub id: Option<LeagueId>,
}

impl LeagueEntry {
    fn known(name: &str, id: i64) -> Self {
        LeagueEntry {
            name: name.to_string(),
            id: Some(LeagueId(id)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "https://api.opendota.com/api".to_string(),
                request_delay_secs: 5,
                timeout_secs: 30,
                cache_dir: Some("data/api_cache".to_string()),
            },
            data: DataConfig {
                database_path: "data/dota.db".to_string(),
            },
            leagues: vec![
                LeagueEntry::known("ti_2025", 18324),
                LeagueEntry::known("fissure_universe_6_2025", 18433),
                LeagueEntry::known("clavision_masters_2025", 18359),
                LeagueEntry::known("esports_world_championship_2025", 18375),
                LeagueEntry::known("wallachia_5_2025", 18358),
                LeagueEntry::known("dreamleague_season_26", 18111),
                LeagueEntry::known("blast_slam_3_2025", 17418),
                LeagueEntry::known("wallachia_4_2025", 18058),
                LeagueEntry::known("esl_one_raleigh_2025", 17795),
                LeagueEntry::known("fissure_universe_4_2025", 17907),
                LeagueEntry::known("wallachia_3_2025", 17891),
                LeagueEntry::known("dreamleague_season_25", 17765),
                LeagueEntry::known("blast_slam_2_2024", 17417),
                LeagueEntry::known("fissure_playground_1_2025", 17588),
                LeagueEntry::known("esl_one_bangkok_2024", 17509),
                LeagueEntry::known("blast_slam_1_2024", 17414),
                LeagueEntry::known("dreamleague_season_24", 17272),
                LeagueEntry::known("bb_dacha_belgrade_2024", 17126),
                LeagueEntry::known("wallachia_2_2024", 17119),
                LeagueEntry::known("ti_2024", 16935),
            ],
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DotaError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| DotaError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DotaError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn request_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.api.request_delay_secs)
    }
}
