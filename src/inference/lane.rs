//! Lane cohorts
//!
//! Players are grouped once per match by lane and side. Hero names are
//! resolved per cohort, so every player in a lane sees the same context.

use crate::data::api::RawPlayerRecord;
use crate::{HeroCatalog, LaneHero, Result, Side};
use std::collections::HashMap;

/// A lane on one side of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneKey {
    pub lane: Option<u8>,
    pub side: Side,
}

impl LaneKey {
    pub fn of(player: &RawPlayerRecord) -> Self {
        LaneKey {
            lane: player.lane,
            side: player.side(),
        }
    }

    /// The same lane seen from the other team
    pub fn opposing(self) -> Self {
        LaneKey {
            lane: self.lane,
            side: self.side.opponent(),
        }
    }
}

/// Players of one match grouped by lane and side, in roster order
#[derive(Debug)]
pub struct LaneCohorts<'a> {
    cohorts: HashMap<LaneKey, Vec<&'a RawPlayerRecord>>,
}

impl<'a> LaneCohorts<'a> {
    pub fn group(players: &'a [RawPlayerRecord]) -> Self {
        let mut cohorts: HashMap<LaneKey, Vec<&'a RawPlayerRecord>> = HashMap::new();
        for player in players {
            cohorts.entry(LaneKey::of(player)).or_default().push(player);
        }
        LaneCohorts { cohorts }
    }

    pub fn cohort(&self, key: LaneKey) -> &[&'a RawPlayerRecord] {
        self.cohorts.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Same lane, same side, excluding the player's own hero
    pub fn teammates(&self, player: &RawPlayerRecord) -> Vec<&'a RawPlayerRecord> {
        self.cohort(LaneKey::of(player))
            .iter()
            .copied()
            .filter(|p| p.hero_id != player.hero_id)
            .collect()
    }

    /// Resolve hero names for every cohort
    pub fn resolve(&self, heroes: &HeroCatalog) -> Result<LaneHeroes> {
        let mut names = HashMap::with_capacity(self.cohorts.len());
        for (key, players) in &self.cohorts {
            let lane_heroes = players
                .iter()
                .map(|p| {
                    Ok(LaneHero {
                        id: p.hero_id,
                        name: heroes.name(p.hero_id)?.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            names.insert(*key, lane_heroes);
        }
        Ok(LaneHeroes { names })
    }
}

/// Resolved hero names per lane cohort
#[derive(Debug, Clone)]
pub struct LaneHeroes {
    names: HashMap<LaneKey, Vec<LaneHero>>,
}

impl LaneHeroes {
    fn heroes(&self, key: LaneKey) -> Vec<LaneHero> {
        self.names.get(&key).cloned().unwrap_or_default()
    }

    pub fn context(&self, player: &RawPlayerRecord) -> LaneContext {
        let key = LaneKey::of(player);
        LaneContext {
            friendly: self.heroes(key),
            enemy: self.heroes(key.opposing()),
        }
    }
}

/// Heroes on both sides of a player's lane
#[derive(Debug, Clone, PartialEq)]
pub struct LaneContext {
    /// Includes the player's own hero
    pub friendly: Vec<LaneHero>,
    pub enemy: Vec<LaneHero>,
}
