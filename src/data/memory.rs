//! In-memory store
//!
//! Same semantics as the SQLite store, kept in ordered maps. Useful for dry
//! runs and tests.

use super::{DatabaseStats, MatchStore};
use crate::stats::RecordFilter;
use crate::{
    AccountId, Hero, HeroId, InferredPlayerRecord, League, LeagueId, MatchId, Player, Result,
    Team, TeamId,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    heroes: BTreeMap<HeroId, Hero>,
    leagues: BTreeMap<LeagueId, League>,
    teams: BTreeMap<TeamId, Team>,
    players: BTreeMap<AccountId, Player>,
    records: BTreeMap<(MatchId, AccountId), InferredPlayerRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for MemoryStore {
    fn high_water_mark(&self) -> Result<Option<MatchId>> {
        Ok(self.records.keys().next_back().map(|(match_id, _)| *match_id))
    }

    fn league_exists(&self, league: LeagueId) -> Result<bool> {
        Ok(self.leagues.contains_key(&league))
    }

    fn insert_league(&mut self, league: &League) -> Result<()> {
        self.leagues.entry(league.id).or_insert_with(|| league.clone());
        Ok(())
    }

    fn league(&self, league: LeagueId) -> Result<Option<League>> {
        Ok(self.leagues.get(&league).cloned())
    }

    fn leagues(&self) -> Result<Vec<League>> {
        Ok(self.leagues.values().cloned().collect())
    }

    fn upsert_team(&mut self, team: &Team) -> Result<()> {
        self.teams.insert(team.id, team.clone());
        Ok(())
    }

    fn teams(&self, league: Option<LeagueId>) -> Result<Vec<Team>> {
        let playing: Option<BTreeSet<TeamId>> = league.map(|league| {
            self.records
                .values()
                .filter(|r| r.league_id == league)
                .filter_map(|r| self.players.get(&r.account_id))
                .map(|p| p.team_id)
                .collect()
        });
        let mut teams: Vec<Team> = self
            .teams
            .values()
            .filter(|t| playing.as_ref().map_or(true, |ids| ids.contains(&t.id)))
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    fn upsert_player(&mut self, player: &Player) -> Result<()> {
        self.players.insert(player.account_id, player.clone());
        Ok(())
    }

    fn players(&self, team: Option<TeamId>) -> Result<Vec<Player>> {
        let mut players: Vec<Player> = self
            .players
            .values()
            .filter(|p| team.map_or(true, |t| p.team_id == t))
            .cloned()
            .collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(players)
    }

    fn upsert_heroes(&mut self, heroes: &[Hero]) -> Result<()> {
        for hero in heroes {
            self.heroes.insert(hero.id, hero.clone());
        }
        Ok(())
    }

    fn heroes(&self) -> Result<Vec<Hero>> {
        Ok(self.heroes.values().cloned().collect())
    }

    fn upsert_inferred_record(&mut self, record: &InferredPlayerRecord) -> Result<()> {
        self.records
            .insert((record.match_id, record.account_id), record.clone());
        Ok(())
    }

    fn query_records(&self, filter: &RecordFilter) -> Result<Vec<InferredPlayerRecord>> {
        let roster: Option<BTreeSet<AccountId>> =
            if filter.team_id.is_some() || filter.player_name.is_some() {
                Some(
                    self.players
                        .values()
                        .filter(|p| filter.team_id.map_or(true, |team| p.team_id == team))
                        .filter(|p| filter.matches_player_name(&p.name))
                        .map(|p| p.account_id)
                        .collect(),
                )
            } else {
                None
            };

        Ok(self
            .records
            .values()
            .filter(|r| filter.matches(r))
            .filter(|r| roster.as_ref().map_or(true, |ids| ids.contains(&r.account_id)))
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<DatabaseStats> {
        let matches: BTreeSet<MatchId> = self.records.keys().map(|(m, _)| *m).collect();
        Ok(DatabaseStats {
            hero_count: self.heroes.len(),
            league_count: self.leagues.len(),
            team_count: self.teams.len(),
            player_count: self.players.len(),
            match_count: matches.len(),
            record_count: self.records.len(),
            high_water_mark: self.high_water_mark()?,
        })
    }
}
