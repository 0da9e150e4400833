//! Role inference engine
//!
//! Given one match's roster, derive every player's lane role and lane
//! context. Inference is pure: the hero catalog is passed in and nothing is
//! written anywhere.

pub mod lane;
pub mod role;

pub use lane::{LaneCohorts, LaneContext, LaneHeroes, LaneKey};

use crate::data::api::{MatchDetail, RawPlayerRecord};
use crate::{
    AssumedRole, DotaError, HeroCatalog, InferredPlayerRecord, LeagueId, MatchId, Result,
};

/// Minute at which laning performance is measured
pub const LANING_MINUTE: usize = 5;

/// Match-level facts copied onto every record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScope {
    pub match_id: MatchId,
    pub league_id: LeagueId,
    pub patch_id: Option<i64>,
}

impl MatchScope {
    pub fn of(detail: &MatchDetail, league_id: LeagueId) -> Self {
        MatchScope {
            match_id: detail.match_id,
            league_id,
            patch_id: detail.patch,
        }
    }
}

/// Informational events raised while inferring a player
#[derive(Debug, Clone, PartialEq)]
pub enum LaneNote {
    /// Roaming or jungling, assigned the roaming support role
    Roaming,
    /// No other hero on the player's side of a side lane
    NoLaneTeammate { role: AssumedRole },
    /// More than one lane teammate; only the first was compared
    SharedLane { teammates: usize },
}

/// A successfully inferred player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInference {
    pub record: InferredPlayerRecord,
    pub notes: Vec<LaneNote>,
}

/// What happened to one player of a match
#[derive(Debug)]
pub enum PlayerOutcome {
    Inferred(PlayerInference),
    /// The match ended (for this player) before minute five
    TooShort { player: String, snapshots: usize },
    Rejected { player: String, error: DotaError },
}

/// Per-player outcomes of one match, in roster order
#[derive(Debug)]
pub struct MatchInference {
    pub match_id: MatchId,
    pub outcomes: Vec<PlayerOutcome>,
}

impl MatchInference {
    pub fn records(&self) -> impl Iterator<Item = &InferredPlayerRecord> {
        self.outcomes.iter().filter_map(|o| match o {
            PlayerOutcome::Inferred(inference) => Some(&inference.record),
            _ => None,
        })
    }

    pub fn rejections(&self) -> impl Iterator<Item = (&str, &DotaError)> {
        self.outcomes.iter().filter_map(|o| match o {
            PlayerOutcome::Rejected { player, error } => Some((player.as_str(), error)),
            _ => None,
        })
    }

    pub fn too_short(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PlayerOutcome::TooShort { .. }))
            .count()
    }

    pub fn notes(&self) -> impl Iterator<Item = &LaneNote> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                PlayerOutcome::Inferred(inference) => Some(&inference.notes),
                _ => None,
            })
            .flatten()
    }
}

/// Infer lane roles for every player of a match
///
/// Fails as a whole only when the roster is missing or references a hero
/// the catalog does not know; individual player problems are reported in
/// the returned outcomes.
pub fn infer(
    detail: &MatchDetail,
    league_id: LeagueId,
    heroes: &HeroCatalog,
) -> Result<MatchInference> {
    let players = detail
        .players
        .as_deref()
        .ok_or(DotaError::MalformedMatch(detail.match_id))?;

    let scope = MatchScope::of(detail, league_id);
    let cohorts = LaneCohorts::group(players);
    let lanes = cohorts.resolve(heroes)?;

    let outcomes = players
        .iter()
        .map(|player| match infer_player(player, &scope, &cohorts, &lanes) {
            Ok(Some(inference)) => PlayerOutcome::Inferred(inference),
            Ok(None) => PlayerOutcome::TooShort {
                player: player.display_name().to_string(),
                snapshots: player.snapshot_count(),
            },
            Err(error) => PlayerOutcome::Rejected {
                player: player.display_name().to_string(),
                error,
            },
        })
        .collect();

    Ok(MatchInference {
        match_id: detail.match_id,
        outcomes,
    })
}

/// Infer one player's record
///
/// Returns `Ok(None)` when the player has no last-hit snapshot for minute
/// five.
pub fn infer_player(
    player: &RawPlayerRecord,
    scope: &MatchScope,
    cohorts: &LaneCohorts<'_>,
    lanes: &LaneHeroes,
) -> Result<Option<PlayerInference>> {
    let name = player.display_name();
    let Some(last_hits_at_5) = player.last_hits_at(LANING_MINUTE) else {
        log::debug!(
            "Match {} did not last {} minutes for {}",
            scope.match_id,
            LANING_MINUTE,
            name
        );
        return Ok(None);
    };

    let account_id = player.account_id.ok_or_else(|| DotaError::Validation {
        match_id: scope.match_id,
        player: name.to_string(),
        reason: "missing account id".to_string(),
    })?;
    let denies_at_5 = player
        .denies_at(LANING_MINUTE)
        .ok_or_else(|| DotaError::Validation {
            match_id: scope.match_id,
            player: name.to_string(),
            reason: format!("no denies snapshot for minute {}", LANING_MINUTE),
        })?;

    let provisional = role::provisional_role(player, scope.match_id)?;
    let mut notes = Vec::new();

    let assumed_lane_role = if provisional == AssumedRole::Roaming {
        log::info!(
            "Player {} in match {} is roaming/jungling",
            name,
            scope.match_id
        );
        notes.push(LaneNote::Roaming);
        provisional
    } else {
        let teammates = cohorts.teammates(player);
        match teammates.as_slice() {
            [] => {
                if provisional != AssumedRole::Mid {
                    log::info!(
                        "No lane teammate for {} in match {}, keeping role {}",
                        name,
                        scope.match_id,
                        provisional
                    );
                    notes.push(LaneNote::NoLaneTeammate { role: provisional });
                }
                provisional
            }
            [first, rest @ ..] => {
                if !rest.is_empty() {
                    log::warn!(
                        "{} shares a lane with {} teammates in match {}, comparing against the first only",
                        name,
                        teammates.len(),
                        scope.match_id
                    );
                    notes.push(LaneNote::SharedLane {
                        teammates: teammates.len(),
                    });
                }
                role::disambiguate(provisional, last_hits_at_5, Some(*first))
            }
        }
    };

    let context = lanes.context(player);
    Ok(Some(PlayerInference {
        record: InferredPlayerRecord {
            match_id: scope.match_id,
            league_id: scope.league_id,
            account_id,
            hero_id: player.hero_id,
            kills: player.hero_kills,
            last_hits_at_5,
            denies_at_5,
            heroes_on_lane: context.friendly,
            enemy_heroes_on_lane: context.enemy,
            assumed_lane_role,
            is_roaming: player.roaming_flag(),
            is_radiant: player.is_radiant,
            patch_id: scope.patch_id,
        },
        notes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountId, Hero, HeroId, LaneHero};

    const LEAGUE: LeagueId = LeagueId(16935);

    fn catalog() -> HeroCatalog {
        let names = [
            (1, "Anti-Mage"),
            (5, "Crystal Maiden"),
            (8, "Juggernaut"),
            (11, "Shadow Fiend"),
            (14, "Pudge"),
            (26, "Lion"),
            (74, "Invoker"),
            (129, "Mars"),
        ];
        HeroCatalog::new(names.iter().map(|(id, name)| Hero {
            id: HeroId(*id),
            name: name.to_string(),
            attack_type: "Melee".to_string(),
            primary_attribute: "all".to_string(),
            base_attack_min: 0,
            base_attack_max: 0,
        }))
    }

    struct PlayerBuilder(RawPlayerRecord);

    impl PlayerBuilder {
        fn new(account: i64, hero: i64, radiant: bool, lane: u8, lane_role: u8) -> Self {
            PlayerBuilder(RawPlayerRecord {
                account_id: Some(AccountId(account)),
                hero_id: HeroId(hero),
                is_radiant: radiant,
                lane: Some(lane),
                lane_role: Some(lane_role),
                is_roaming: Some(false),
                hero_kills: 2,
                lh_t: Some(vec![0, 4, 8, 12, 16, 20]),
                dn_t: Some(vec![0, 1, 1, 2, 3, 4]),
                name: Some(format!("player{}", account)),
                personaname: None,
            })
        }

        fn last_hits_at_5(mut self, lh: u32) -> Self {
            if let Some(series) = self.0.lh_t.as_mut() {
                series[5] = lh;
            }
            self
        }

        fn roaming(mut self) -> Self {
            self.0.is_roaming = Some(true);
            self
        }

        fn minutes(mut self, count: usize) -> Self {
            self.0.lh_t = Some(vec![0; count]);
            self.0.dn_t = Some(vec![0; count]);
            self
        }

        fn build(self) -> RawPlayerRecord {
            self.0
        }
    }

    fn detail(players: Vec<RawPlayerRecord>) -> MatchDetail {
        MatchDetail {
            match_id: MatchId(7_900_000_000),
            patch: Some(56),
            leagueid: Some(LEAGUE),
            players: Some(players),
        }
    }

    fn role_of(inference: &MatchInference, account: i64) -> AssumedRole {
        inference
            .records()
            .find(|r| r.account_id == AccountId(account))
            .map(|r| r.assumed_lane_role)
            .unwrap()
    }

    #[test]
    fn test_safelane_pair_lower_farm_is_support() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 5, true, 1, 1).last_hits_at_5(20).build(),
            PlayerBuilder::new(2, 8, true, 1, 1).last_hits_at_5(25).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(role_of(&inference, 1), AssumedRole::HardSupport);
        assert_eq!(role_of(&inference, 2), AssumedRole::Safelane);
    }

    #[test]
    fn test_equal_last_hits_both_become_support() {
        // Each player sees the other as not strictly behind
        let detail = detail(vec![
            PlayerBuilder::new(1, 5, true, 1, 1).last_hits_at_5(20).build(),
            PlayerBuilder::new(2, 8, true, 1, 1).last_hits_at_5(20).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(role_of(&inference, 1), AssumedRole::HardSupport);
        assert_eq!(role_of(&inference, 2), AssumedRole::HardSupport);
    }

    #[test]
    fn test_offlane_and_mid_support_mapping() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 129, false, 3, 3).last_hits_at_5(22).build(),
            PlayerBuilder::new(2, 26, false, 3, 3).last_hits_at_5(3).build(),
            PlayerBuilder::new(3, 11, true, 2, 2).last_hits_at_5(30).build(),
            PlayerBuilder::new(4, 14, true, 2, 2).last_hits_at_5(2).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(role_of(&inference, 1), AssumedRole::Offlane);
        assert_eq!(role_of(&inference, 2), AssumedRole::SoftSupport);
        assert_eq!(role_of(&inference, 3), AssumedRole::Mid);
        assert_eq!(role_of(&inference, 4), AssumedRole::Roaming);
    }

    #[test]
    fn test_solo_mid_has_no_note() {
        let detail = detail(vec![PlayerBuilder::new(1, 74, true, 2, 2).build()]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(role_of(&inference, 1), AssumedRole::Mid);
        assert_eq!(inference.notes().count(), 0);
        assert_eq!(inference.rejections().count(), 0);
    }

    #[test]
    fn test_solo_offlaner_is_noted() {
        let detail = detail(vec![PlayerBuilder::new(1, 129, false, 3, 3).build()]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(role_of(&inference, 1), AssumedRole::Offlane);
        let notes: Vec<&LaneNote> = inference.notes().collect();
        assert_eq!(
            notes,
            vec![&LaneNote::NoLaneTeammate {
                role: AssumedRole::Offlane
            }]
        );
    }

    #[test]
    fn test_roaming_short_circuits_offlane() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 14, false, 3, 3)
                .roaming()
                .last_hits_at_5(0)
                .build(),
            PlayerBuilder::new(2, 129, false, 3, 3).last_hits_at_5(25).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(role_of(&inference, 1), AssumedRole::Roaming);
        // The roaming teammate is no baseline for the offlaner
        assert_eq!(role_of(&inference, 2), AssumedRole::Offlane);
        assert!(inference.notes().any(|n| *n == LaneNote::Roaming));
    }

    #[test]
    fn test_jungler_is_roaming_regardless_of_farm() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 8, true, 1, 4).last_hits_at_5(40).build(),
            PlayerBuilder::new(2, 1, true, 1, 1).last_hits_at_5(10).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(role_of(&inference, 1), AssumedRole::Roaming);
        assert_eq!(role_of(&inference, 2), AssumedRole::Safelane);
    }

    #[test]
    fn test_short_game_emits_nothing() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 8, true, 1, 0).minutes(5).build(),
            PlayerBuilder::new(2, 5, true, 1, 1).minutes(0).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        assert_eq!(inference.records().count(), 0);
        assert_eq!(inference.rejections().count(), 0);
        assert_eq!(inference.too_short(), 2);
    }

    #[test]
    fn test_invalid_lane_role_is_scoped_to_player() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 8, true, 1, 0).build(),
            PlayerBuilder::new(2, 74, false, 2, 2).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();

        let rejections: Vec<_> = inference.rejections().collect();
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].0, "player1");
        assert!(matches!(
            rejections[0].1,
            DotaError::InvalidLaneRole { lane_role: 0, .. }
        ));
        assert_eq!(role_of(&inference, 2), AssumedRole::Mid);
    }

    #[test]
    fn test_infer_player_raises_for_lane_role_zero() {
        let players = vec![PlayerBuilder::new(1, 8, true, 1, 0).build()];
        let detail = detail(players.clone());
        let scope = MatchScope::of(&detail, LEAGUE);
        let cohorts = LaneCohorts::group(&players);
        let lanes = cohorts.resolve(&catalog()).unwrap();

        let err = infer_player(&players[0], &scope, &cohorts, &lanes).unwrap_err();
        assert!(matches!(err, DotaError::InvalidLaneRole { .. }));
    }

    #[test]
    fn test_missing_account_is_rejected() {
        let mut anonymous = PlayerBuilder::new(1, 74, true, 2, 2).build();
        anonymous.account_id = None;
        let inference = infer(&detail(vec![anonymous]), LEAGUE, &catalog()).unwrap();
        assert!(matches!(
            inference.rejections().next(),
            Some((_, DotaError::Validation { .. }))
        ));
    }

    #[test]
    fn test_trilane_compares_first_teammate_only() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 8, true, 1, 1).last_hits_at_5(30).build(),
            PlayerBuilder::new(2, 5, true, 1, 1).last_hits_at_5(5).build(),
            PlayerBuilder::new(3, 26, true, 1, 1).last_hits_at_5(2).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        // Player 1's first teammate (player 2) is behind
        assert_eq!(role_of(&inference, 1), AssumedRole::Safelane);
        // Player 3 compares against player 1 only
        assert_eq!(role_of(&inference, 3), AssumedRole::HardSupport);
        assert_eq!(
            inference
                .notes()
                .filter(|n| matches!(n, LaneNote::SharedLane { teammates: 2 }))
                .count(),
            3
        );
    }

    #[test]
    fn test_lane_context_and_copied_fields() {
        let detail = detail(vec![
            PlayerBuilder::new(1, 8, true, 1, 1).last_hits_at_5(30).build(),
            PlayerBuilder::new(2, 5, true, 1, 1).last_hits_at_5(6).build(),
            PlayerBuilder::new(3, 129, false, 1, 3).last_hits_at_5(18).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog()).unwrap();
        let record = inference
            .records()
            .find(|r| r.account_id == AccountId(2))
            .unwrap();

        assert_eq!(record.match_id, MatchId(7_900_000_000));
        assert_eq!(record.league_id, LEAGUE);
        assert_eq!(record.patch_id, Some(56));
        assert_eq!(record.kills, 2);
        assert_eq!(record.last_hits_at_5, 6);
        assert_eq!(record.denies_at_5, 4);
        assert!(record.is_radiant);
        assert!(!record.is_roaming);
        assert_eq!(
            record.heroes_on_lane,
            vec![
                LaneHero {
                    id: HeroId(8),
                    name: "Juggernaut".to_string()
                },
                LaneHero {
                    id: HeroId(5),
                    name: "Crystal Maiden".to_string()
                },
            ]
        );
        assert_eq!(crate::lane_names(&record.enemy_heroes_on_lane), "Mars");
    }

    #[test]
    fn test_lane_heroes_resolve_against_catalog() {
        let catalog = catalog();
        let detail = detail(vec![
            PlayerBuilder::new(1, 8, true, 1, 1).build(),
            PlayerBuilder::new(2, 129, false, 1, 3).build(),
        ]);
        let inference = infer(&detail, LEAGUE, &catalog).unwrap();
        for record in inference.records() {
            for hero in record
                .heroes_on_lane
                .iter()
                .chain(&record.enemy_heroes_on_lane)
            {
                assert_eq!(catalog.name(hero.id).unwrap(), hero.name);
            }
        }
    }

    #[test]
    fn test_missing_players_is_malformed() {
        let mut detail = detail(vec![]);
        detail.players = None;
        let err = infer(&detail, LEAGUE, &catalog()).unwrap_err();
        assert!(matches!(err, DotaError::MalformedMatch(MatchId(7_900_000_000))));
    }

    #[test]
    fn test_unknown_hero_fails_match() {
        let detail = detail(vec![PlayerBuilder::new(1, 999, true, 2, 2).build()]);
        let err = infer(&detail, LEAGUE, &catalog()).unwrap_err();
        assert!(matches!(err, DotaError::UnknownHero(HeroId(999))));
    }
}
