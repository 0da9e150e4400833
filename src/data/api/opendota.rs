//! OpenDota REST client
//!
//! Blocking client for api.opendota.com. Every response can be cached on
//! disk by endpoint and replayed offline. Parsed match payloads never change,
//! so they are served from the cache even when online.

use super::types::{HeroStat, LeagueInfo, LeagueMatch, LeagueTeam, MatchDetail, RosterEntry};
use super::MatchProvider;
use crate::{ApiConfig, DotaError, LeagueId, MatchId, Result, TeamId};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client for the OpenDota API
pub struct OpenDotaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    /// Optional cache directory for match payloads
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl OpenDotaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("dota-lanes/0.1")
            .timeout(timeout)
            .build()?;

        Ok(OpenDotaClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir: None,
            offline_only: false,
        })
    }

    /// Build a client from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))?;
        Ok(match &config.cache_dir {
            Some(dir) => client.with_cache(dir),
            None => client,
        })
    }

    /// Create client with a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn cache_path(&self, key: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", key)))
    }

    fn load_from_cache(&self, key: &str) -> Option<String> {
        let path = self.cache_path(key)?;
        if path.exists() {
            log::debug!("Loading from cache: {}", path.display());
            std::fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    fn save_to_cache(&self, key: &str, body: &str) -> Result<()> {
        if let Some(path) = self.cache_path(key) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, body)?;
            log::debug!("Saved to cache: {}", path.display());
        }
        Ok(())
    }

    fn offline_miss(&self, path: &str) -> DotaError {
        DotaError::Upstream {
            endpoint: self.url(path),
            message: "not cached and offline mode is enabled".to_string(),
        }
    }

    fn get_text(&self, path: &str) -> Result<String> {
        if self.offline_only {
            return Err(self.offline_miss(path));
        }

        let url = self.url(path);
        log::debug!("GET {}", url);
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DotaError::Upstream {
                endpoint: url,
                message: format!("status {}", status),
            });
        }
        Ok(response.text()?)
    }

    /// Listings change between runs, so the network wins when online and
    /// refreshes the cache; offline mode replays the last response.
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let key = cache_key(path);
        if self.offline_only {
            let body = self
                .load_from_cache(&key)
                .ok_or_else(|| self.offline_miss(path))?;
            return Ok(serde_json::from_str(&body)?);
        }

        let body = self.get_text(path)?;
        let value = serde_json::from_str(&body)?;
        self.save_to_cache(&key, &body)?;
        Ok(value)
    }
}

/// Cache file stem for an endpoint, e.g. `leagues/100/teams` -> `leagues_100_teams`
fn cache_key(path: &str) -> String {
    path.trim_matches('/').replace('/', "_")
}

fn match_key(match_id: MatchId) -> String {
    format!("match_{}", match_id.0)
}

impl MatchProvider for OpenDotaClient {
    fn league_match_ids(&self, league: LeagueId) -> Result<Vec<MatchId>> {
        let matches: Vec<LeagueMatch> = self.get_json(&format!("leagues/{}/matches", league.0))?;
        Ok(matches.into_iter().map(|m| m.match_id).collect())
    }

    /// Parsed matches never change, so the cache is read first
    fn match_detail(&self, match_id: MatchId) -> Result<MatchDetail> {
        let key = match_key(match_id);
        if let Some(body) = self.load_from_cache(&key) {
            return Ok(serde_json::from_str(&body)?);
        }

        let body = self.get_text(&format!("matches/{}", match_id.0))?;
        let detail: MatchDetail = serde_json::from_str(&body)?;

        // Unparsed matches may gain players later, so only complete ones are kept
        if detail.players.is_some() {
            self.save_to_cache(&key, &body)?;
        }
        Ok(detail)
    }

    fn hero_catalog(&self) -> Result<Vec<HeroStat>> {
        self.get_json("heroStats")
    }

    fn league_info(&self, league: LeagueId) -> Result<LeagueInfo> {
        self.get_json(&format!("leagues/{}", league.0))
    }

    fn league_teams(&self, league: LeagueId) -> Result<Vec<LeagueTeam>> {
        self.get_json(&format!("leagues/{}/teams", league.0))
    }

    fn team_roster(&self, team: TeamId) -> Result<Vec<RosterEntry>> {
        self.get_json(&format!("teams/{}/players", team.0))
    }
}
