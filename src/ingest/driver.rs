//! Ingestion driver
//!
//! Walks the configured leagues in order. A single high-water mark (the
//! highest stored match id) decides which matches are new; it is read once
//! per run. Upstream failures abort the current league only, storage
//! failures abort the run.

use crate::data::api::MatchDetail;
use crate::data::{MatchProvider, MatchStore};
use crate::inference;
use crate::{
    DotaError, Hero, HeroCatalog, League, LeagueEntry, LeagueId, MatchId, Player, Result, Team,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Summary of one ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub high_water_mark: Option<MatchId>,
    pub leagues_synced: usize,
    /// Leagues with no match above the high-water mark
    pub leagues_skipped: usize,
    /// Configured leagues without an id
    pub leagues_unresolved: usize,
    /// Leagues aborted by an upstream error
    pub leagues_failed: usize,
    pub matches_processed: usize,
    pub matches_failed: usize,
    pub records_written: usize,
    pub players_rejected: usize,
    pub players_too_short: usize,
}

impl IngestReport {
    fn new(high_water_mark: Option<MatchId>) -> Self {
        IngestReport {
            started_at: Utc::now(),
            finished_at: None,
            high_water_mark,
            leagues_synced: 0,
            leagues_skipped: 0,
            leagues_unresolved: 0,
            leagues_failed: 0,
            matches_processed: 0,
            matches_failed: 0,
            records_written: 0,
            players_rejected: 0,
            players_too_short: 0,
        }
    }
}

/// Why a league stopped early
enum Abort {
    Upstream(DotaError),
    Store(DotaError),
}

fn upstream<T>(result: Result<T>) -> std::result::Result<T, Abort> {
    result.map_err(Abort::Upstream)
}

fn store<T>(result: Result<T>) -> std::result::Result<T, Abort> {
    result.map_err(Abort::Store)
}

/// Fetch, infer and persist loop
pub struct Ingestor<P, S> {
    provider: P,
    store: S,
    /// Pause between match fetches
    delay: Duration,
    /// Set once a match has been requested from the provider
    fetched: bool,
}

impl<P: MatchProvider, S: MatchStore> Ingestor<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Ingestor {
            provider,
            store,
            delay: Duration::from_secs(5),
            fetched: false,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest every configured league
    pub fn run(&mut self, leagues: &[LeagueEntry]) -> Result<IngestReport> {
        let high_water_mark = self.store.high_water_mark()?;
        match high_water_mark {
            Some(id) => log::info!("Latest match in store: {}", id),
            None => log::info!("Store is empty, ingesting all matches"),
        }

        let heroes = self.load_heroes()?;
        let mut report = IngestReport::new(high_water_mark);

        for entry in leagues {
            let Some(league_id) = entry.id else {
                log::info!("Skipping {}: league id unknown", entry.name);
                report.leagues_unresolved += 1;
                continue;
            };

            match self.sync_league(entry, league_id, high_water_mark, &heroes, &mut report) {
                Ok(()) => {}
                Err(Abort::Upstream(e)) => {
                    log::error!("Aborting {} ({}): {}", entry.name, league_id, e);
                    report.leagues_failed += 1;
                }
                Err(Abort::Store(e)) => return Err(e),
            }
        }

        report.finished_at = Some(Utc::now());
        log::info!(
            "Ingested {} matches ({} records), {} failed",
            report.matches_processed,
            report.records_written,
            report.matches_failed
        );
        Ok(report)
    }

    /// Load the hero catalog, fetching it on first use
    fn load_heroes(&mut self) -> Result<HeroCatalog> {
        let mut heroes = self.store.heroes()?;
        if heroes.is_empty() {
            log::info!("Fetching hero catalog");
            heroes = self
                .provider
                .hero_catalog()?
                .into_iter()
                .map(Hero::from)
                .collect();
            self.store.upsert_heroes(&heroes)?;
        }
        log::debug!("Loaded {} heroes", heroes.len());
        Ok(HeroCatalog::new(heroes))
    }

    fn sync_league(
        &mut self,
        entry: &LeagueEntry,
        league_id: LeagueId,
        high_water_mark: Option<MatchId>,
        heroes: &HeroCatalog,
        report: &mut IngestReport,
    ) -> std::result::Result<(), Abort> {
        let match_ids = upstream(self.provider.league_match_ids(league_id))?;
        let mut pending: Vec<MatchId> = match_ids
            .iter()
            .copied()
            .filter(|id| high_water_mark.map_or(true, |mark| *id > mark))
            .collect();

        if pending.is_empty() {
            log::info!("No new matches for {}", entry.name);
            report.leagues_skipped += 1;
            return Ok(());
        }
        // Ascending order keeps the high-water mark valid if the run dies midway
        pending.sort();
        pending.dedup();
        log::info!("{}: {} new matches", entry.name, pending.len());

        let mut prefetched = None;
        let league = if store(self.store.league_exists(league_id))? {
            store(self.store.league(league_id))?.ok_or_else(|| {
                Abort::Store(DotaError::Integrity(format!(
                    "league {} reported as stored but not found",
                    league_id
                )))
            })?
        } else {
            // League list is non-empty because `pending` is
            let first = match_ids.iter().copied().min().unwrap_or(pending[0]);
            let detail = upstream(self.fetch_match(first))?;
            let league = self.register_league(entry, league_id, &detail)?;
            prefetched = Some(detail);
            league
        };

        self.refresh_rosters(league_id)?;

        for match_id in pending {
            let detail = match prefetched.take() {
                Some(detail) if detail.match_id == match_id => detail,
                _ => upstream(self.fetch_match(match_id))?,
            };
            self.ingest_match(detail, &league, heroes, report)?;
        }

        report.leagues_synced += 1;
        Ok(())
    }

    /// Request a match, pausing first if another one was requested before
    fn fetch_match(&mut self, match_id: MatchId) -> Result<MatchDetail> {
        if self.fetched && !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.fetched = true;
        self.provider.match_detail(match_id)
    }

    /// Store a new league; its patch is taken from its first match
    fn register_league(
        &mut self,
        entry: &LeagueEntry,
        league_id: LeagueId,
        first_match: &MatchDetail,
    ) -> std::result::Result<League, Abort> {
        let patch_id = first_match.patch.ok_or_else(|| {
            Abort::Upstream(DotaError::Parse(format!(
                "match {} has no patch",
                first_match.match_id
            )))
        })?;
        let info = upstream(self.provider.league_info(league_id))?;

        let league = League {
            id: league_id,
            name: info.name.unwrap_or_else(|| entry.name.clone()),
            tier: info.tier.unwrap_or_else(|| "unknown".to_string()),
            patch_id,
        };
        store(self.store.insert_league(&league))?;
        log::info!("Inserted league info for {} (patch {})", entry.name, patch_id);
        Ok(league)
    }

    /// Refresh teams and their current rosters
    fn refresh_rosters(&mut self, league_id: LeagueId) -> std::result::Result<(), Abort> {
        let teams = upstream(self.provider.league_teams(league_id))?;
        for entry in teams {
            let team = Team {
                id: entry.team_id,
                name: entry
                    .name
                    .unwrap_or_else(|| format!("Team {}", entry.team_id.0)),
                rating: entry.rating.unwrap_or(0.0),
            };
            store(self.store.upsert_team(&team))?;

            let roster = upstream(self.provider.team_roster(team.id))?;
            for member in roster {
                let Some(name) = member.display_name() else {
                    continue;
                };
                store(self.store.upsert_player(&Player {
                    account_id: member.account_id,
                    name: name.to_string(),
                    team_id: team.id,
                    is_active: member.is_current_team_member.unwrap_or(false),
                }))?;
            }
        }
        Ok(())
    }

    fn ingest_match(
        &mut self,
        mut detail: MatchDetail,
        league: &League,
        heroes: &HeroCatalog,
        report: &mut IngestReport,
    ) -> std::result::Result<(), Abort> {
        if detail.patch.is_none() {
            detail.patch = Some(league.patch_id);
        }

        let inference = match inference::infer(&detail, league.id, heroes) {
            Ok(inference) => inference,
            Err(e) => {
                log::error!("Skipping match {} in {}: {}", detail.match_id, league.id, e);
                report.matches_failed += 1;
                return Ok(());
            }
        };

        for (player, error) in inference.rejections() {
            log::warn!(
                "Error processing player {} in match {}: {}",
                player,
                detail.match_id,
                error
            );
            report.players_rejected += 1;
        }
        report.players_too_short += inference.too_short();

        for record in inference.records() {
            store(self.store.upsert_inferred_record(record))?;
            report.records_written += 1;
        }

        log::debug!(
            "Match {}: {} records",
            detail.match_id,
            inference.records().count()
        );
        report.matches_processed += 1;
        Ok(())
    }
}
