//! Lane role resolution
//!
//! The parser reports a categorical lane role per player. Within a lane the
//! player with fewer last hits at minute five is taken to be the support.

use super::LANING_MINUTE;
use crate::data::api::RawPlayerRecord;
use crate::{AssumedRole, DotaError, LaneRole, MatchId, Result};

/// Role before comparing against lane teammates
///
/// Roaming and jungling players short-circuit to the roaming support role.
pub fn provisional_role(player: &RawPlayerRecord, match_id: MatchId) -> Result<AssumedRole> {
    if player.is_roaming_or_jungle() {
        return Ok(AssumedRole::Roaming);
    }

    match LaneRole::from_raw(player.raw_lane_role()) {
        Some(role) => Ok(role.into()),
        None => Err(DotaError::InvalidLaneRole {
            match_id,
            player: player.display_name().to_string(),
            lane_role: player.raw_lane_role(),
        }),
    }
}

/// Demote a core to its lane's support role when a lane teammate out-farmed
/// (or matched) them by minute five
pub fn disambiguate(
    provisional: AssumedRole,
    last_hits_at_5: u32,
    teammate: Option<&RawPlayerRecord>,
) -> AssumedRole {
    if !provisional.is_core() {
        return provisional;
    }
    let Some(teammate) = teammate else {
        return provisional;
    };
    // A roaming teammate was never in the lane to compare against
    if teammate.is_roaming_or_jungle() {
        return provisional;
    }

    match teammate.last_hits_at(LANING_MINUTE) {
        Some(teammate_lh) if teammate_lh >= last_hits_at_5 => provisional.support_counterpart(),
        _ => provisional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeroId;

    fn player(lane_role: Option<u8>, is_roaming: bool, lh5: u32) -> RawPlayerRecord {
        RawPlayerRecord {
            account_id: None,
            hero_id: HeroId(1),
            is_radiant: true,
            lane: Some(1),
            lane_role,
            is_roaming: Some(is_roaming),
            hero_kills: 0,
            lh_t: Some(vec![0, 2, 5, 9, 14, lh5]),
            dn_t: Some(vec![0; 6]),
            name: Some("Ana".to_string()),
            personaname: None,
        }
    }

    #[test]
    fn test_provisional_roles() {
        let m = MatchId(1);
        assert_eq!(
            provisional_role(&player(Some(1), false, 0), m).unwrap(),
            AssumedRole::Safelane
        );
        assert_eq!(
            provisional_role(&player(Some(2), false, 0), m).unwrap(),
            AssumedRole::Mid
        );
        assert_eq!(
            provisional_role(&player(Some(3), false, 0), m).unwrap(),
            AssumedRole::Offlane
        );
        assert_eq!(
            provisional_role(&player(Some(4), false, 0), m).unwrap(),
            AssumedRole::Roaming
        );
        assert_eq!(
            provisional_role(&player(Some(3), true, 0), m).unwrap(),
            AssumedRole::Roaming
        );
    }

    #[test]
    fn test_unknown_lane_role_is_rejected() {
        for raw in [Some(0), None, Some(9)] {
            let err = provisional_role(&player(raw, false, 0), MatchId(7)).unwrap_err();
            match err {
                DotaError::InvalidLaneRole {
                    match_id, player, ..
                } => {
                    assert_eq!(match_id, MatchId(7));
                    assert_eq!(player, "Ana");
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_roaming_player_ignores_lane_role_zero() {
        let p = player(Some(0), true, 0);
        assert_eq!(provisional_role(&p, MatchId(1)).unwrap(), AssumedRole::Roaming);
    }

    #[test]
    fn test_disambiguate_support_mapping() {
        let mate = player(Some(1), false, 25);
        assert_eq!(
            disambiguate(AssumedRole::Safelane, 20, Some(&mate)),
            AssumedRole::HardSupport
        );
        assert_eq!(
            disambiguate(AssumedRole::Mid, 20, Some(&mate)),
            AssumedRole::Roaming
        );
        assert_eq!(
            disambiguate(AssumedRole::Offlane, 20, Some(&mate)),
            AssumedRole::SoftSupport
        );
    }

    #[test]
    fn test_disambiguate_tie_goes_to_support() {
        let mate = player(Some(1), false, 20);
        assert_eq!(
            disambiguate(AssumedRole::Safelane, 20, Some(&mate)),
            AssumedRole::HardSupport
        );
    }

    #[test]
    fn test_disambiguate_keeps_core() {
        let mate = player(Some(1), false, 19);
        assert_eq!(
            disambiguate(AssumedRole::Safelane, 20, Some(&mate)),
            AssumedRole::Safelane
        );
        assert_eq!(
            disambiguate(AssumedRole::Offlane, 20, None),
            AssumedRole::Offlane
        );
    }

    #[test]
    fn test_disambiguate_roaming_teammate() {
        let mate = player(Some(1), true, 40);
        assert_eq!(
            disambiguate(AssumedRole::Safelane, 20, Some(&mate)),
            AssumedRole::Safelane
        );
        let jungler = player(Some(4), false, 40);
        assert_eq!(
            disambiguate(AssumedRole::Safelane, 20, Some(&jungler)),
            AssumedRole::Safelane
        );
    }

    #[test]
    fn test_disambiguate_teammate_without_minute_five() {
        let mut mate = player(Some(1), false, 40);
        mate.lh_t = Some(vec![0, 1, 2]);
        assert_eq!(
            disambiguate(AssumedRole::Safelane, 20, Some(&mate)),
            AssumedRole::Safelane
        );
    }

    #[test]
    fn test_roaming_is_never_adjusted() {
        let mate = player(Some(1), false, 40);
        assert_eq!(
            disambiguate(AssumedRole::Roaming, 0, Some(&mate)),
            AssumedRole::Roaming
        );
    }
}
