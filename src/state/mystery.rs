//! Mystery effect resolution: spending a mystery card on steal, deduct or double.
//!
//! One policy applies to every entry point (including the legacy steal-power
//! endpoint): a steal never clamps, no targeted effect may aim at the card
//! owner, and a failed effect leaves the card unspent.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{auction::AuctionHouse, error::AuctionError};

/// Tag selecting which effect a mystery card triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Move points from a target team to the owner.
    Steal,
    /// Remove points from a target team, floored at zero.
    Deduct,
    /// Credit the owner with an admin-chosen bonus.
    Double,
}

/// Fully specified effect to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MysteryEffect {
    /// Take `points` from `target` and give them to the owner.
    Steal {
        /// Team losing points.
        target: String,
        /// Points moved.
        points: u32,
    },
    /// Take up to `points` from `target`.
    Deduct {
        /// Team losing points.
        target: String,
        /// Requested deduction.
        points: u32,
    },
    /// Add `points` to the owner. Despite the name this is a bonus credit,
    /// not a doubling of the balance.
    Double {
        /// Bonus credited to the owner.
        points: u32,
    },
}

impl MysteryEffect {
    /// Assemble an effect from its tag and the optional target.
    pub fn from_parts(
        kind: EffectKind,
        target: Option<String>,
        points: u32,
    ) -> Result<Self, AuctionError> {
        let require_target = || {
            target
                .clone()
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| AuctionError::MissingTarget(format!("{kind:?}").to_lowercase()))
        };
        Ok(match kind {
            EffectKind::Steal => Self::Steal {
                target: require_target()?,
                points,
            },
            EffectKind::Deduct => Self::Deduct {
                target: require_target()?,
                points,
            },
            EffectKind::Double => Self::Double { points },
        })
    }

    /// Tag of this effect.
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Steal { .. } => EffectKind::Steal,
            Self::Deduct { .. } => EffectKind::Deduct,
            Self::Double { .. } => EffectKind::Double,
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            Self::Steal { target, .. } | Self::Deduct { target, .. } => Some(target),
            Self::Double { .. } => None,
        }
    }

    fn points(&self) -> u32 {
        match self {
            Self::Steal { points, .. } | Self::Deduct { points, .. } | Self::Double { points } => {
                *points
            }
        }
    }
}

/// Balances after a resolved effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectOutcome {
    /// Team that spent the card.
    pub owner: String,
    /// Effect applied.
    pub kind: EffectKind,
    /// Targeted team, for steal and deduct.
    pub target: Option<String>,
    /// Points actually moved, deducted or credited.
    pub points: u32,
    /// Owner balance afterwards.
    pub owner_points: u32,
    /// Owner cards left afterwards.
    pub owner_cards: u32,
    /// Target balance afterwards.
    pub target_points: Option<u32>,
}

impl AuctionHouse {
    /// Spend one mystery card from `owner` and apply `effect`.
    ///
    /// Every precondition is checked before any field changes, so a failure
    /// leaves balances and card counts untouched.
    pub fn apply_mystery_effect(
        &mut self,
        owner: &str,
        effect: MysteryEffect,
    ) -> Result<EffectOutcome, AuctionError> {
        let owner_team = self.ledger.get(owner)?;
        if owner_team.mystery_cards == 0 {
            return Err(AuctionError::NoCardsAvailable(owner.to_owned()));
        }

        let points = effect.points();
        if points == 0 {
            return Err(AuctionError::InvalidAmount(
                "effect points must be positive".into(),
            ));
        }

        if let Some(target) = effect.target() {
            if target == owner {
                return Err(AuctionError::InvalidTarget(owner.to_owned()));
            }
            let target_team = self.ledger.get(target)?;
            if let MysteryEffect::Steal { .. } = effect {
                if target_team.points < points {
                    return Err(AuctionError::InsufficientBalance {
                        team: target.to_owned(),
                        available: target_team.points,
                        requested: points,
                    });
                }
            }
        }

        if matches!(effect, MysteryEffect::Steal { .. } | MysteryEffect::Double { .. })
            && owner_team.points.checked_add(points).is_none()
        {
            return Err(AuctionError::InvalidAmount(format!(
                "crediting {points} overflows `{owner}` balance"
            )));
        }

        let owner_cards = self.ledger.spend_mystery_card(owner)?;
        let applied = match &effect {
            MysteryEffect::Steal { target, points } => {
                self.ledger.debit(target, *points)?;
                self.ledger.credit(owner, *points)?;
                *points
            }
            MysteryEffect::Deduct { target, points } => {
                self.ledger.debit_clamped(target, *points)?
            }
            MysteryEffect::Double { points } => {
                self.ledger.credit(owner, *points)?;
                *points
            }
        };

        let target = effect.target().map(str::to_owned);
        let target_points = match &target {
            Some(name) => Some(self.ledger.get(name)?.points),
            None => None,
        };

        Ok(EffectOutcome {
            owner: owner.to_owned(),
            kind: effect.kind(),
            target,
            points: applied,
            owner_points: self.ledger.get(owner)?.points,
            owner_cards,
            target_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house(teams: &[(&str, u32, u32)]) -> AuctionHouse {
        let mut house = AuctionHouse::new();
        for (name, points, cards) in teams {
            house.ledger.create_team(name).unwrap();
            house.ledger.credit(name, *points).unwrap();
            for _ in 0..*cards {
                house.ledger.grant_mystery_card(name).unwrap();
            }
        }
        house
    }

    fn steal(target: &str, points: u32) -> MysteryEffect {
        MysteryEffect::Steal {
            target: target.into(),
            points,
        }
    }

    #[test]
    fn steal_moves_points_and_spends_one_card() {
        let mut house = house(&[("Alpha", 50, 0), ("Beta", 0, 1)]);

        let outcome = house.apply_mystery_effect("Beta", steal("Alpha", 30)).unwrap();

        assert_eq!(outcome.owner_points, 30);
        assert_eq!(outcome.target_points, Some(20));
        assert_eq!(outcome.owner_cards, 0);
        assert_eq!(house.ledger.get("Beta").unwrap().points, 30);
        assert_eq!(house.ledger.get("Alpha").unwrap().points, 20);
        assert_eq!(house.ledger.get("Beta").unwrap().mystery_cards, 0);
    }

    #[test]
    fn steal_exact_balance_empties_target() {
        let mut house = house(&[("Alpha", 30, 0), ("Beta", 5, 2)]);
        house.apply_mystery_effect("Beta", steal("Alpha", 30)).unwrap();
        assert_eq!(house.ledger.get("Alpha").unwrap().points, 0);
        assert_eq!(house.ledger.get("Beta").unwrap().points, 35);
        assert_eq!(house.ledger.get("Beta").unwrap().mystery_cards, 1);
    }

    #[test]
    fn steal_over_balance_fails_without_any_change() {
        let mut house = house(&[("Alpha", 20, 0), ("Beta", 0, 1)]);
        let before = house.clone();

        let err = house.apply_mystery_effect("Beta", steal("Alpha", 21)).unwrap_err();

        assert!(matches!(err, AuctionError::InsufficientBalance { .. }));
        assert_eq!(house, before);
    }

    #[test]
    fn steal_from_self_is_rejected() {
        let mut house = house(&[("Beta", 40, 1)]);
        let before = house.clone();
        assert_eq!(
            house.apply_mystery_effect("Beta", steal("Beta", 10)).unwrap_err(),
            AuctionError::InvalidTarget("Beta".into())
        );
        assert_eq!(house, before);
    }

    #[test]
    fn no_cards_fails_before_anything_else() {
        let mut house = house(&[("Alpha", 50, 0), ("Beta", 0, 0)]);
        let before = house.clone();
        assert_eq!(
            house.apply_mystery_effect("Beta", steal("Alpha", 10)).unwrap_err(),
            AuctionError::NoCardsAvailable("Beta".into())
        );
        assert_eq!(house, before);
    }

    #[test]
    fn deduct_clamps_at_zero() {
        for (start, amount) in [(50, 20), (50, 50), (10, 25), (0, 5)] {
            let mut house = house(&[("Alpha", start, 0), ("Beta", 0, 1)]);
            let outcome = house
                .apply_mystery_effect(
                    "Beta",
                    MysteryEffect::Deduct {
                        target: "Alpha".into(),
                        points: amount,
                    },
                )
                .unwrap();
            assert_eq!(house.ledger.get("Alpha").unwrap().points, start.saturating_sub(amount));
            assert_eq!(outcome.points, start.min(amount));
            assert_eq!(house.ledger.get("Beta").unwrap().points, 0);
        }
    }

    #[test]
    fn double_credits_the_supplied_bonus() {
        let mut house = house(&[("Beta", 40, 1)]);
        let outcome = house
            .apply_mystery_effect("Beta", MysteryEffect::Double { points: 15 })
            .unwrap();
        assert_eq!(outcome.owner_points, 55);
        assert_eq!(outcome.target, None);
        assert_eq!(house.ledger.get("Beta").unwrap().mystery_cards, 0);
    }

    #[test]
    fn unknown_target_keeps_card() {
        let mut house = house(&[("Beta", 0, 1)]);
        assert_eq!(
            house.apply_mystery_effect("Beta", steal("Ghost", 5)).unwrap_err(),
            AuctionError::TeamNotFound("Ghost".into())
        );
        assert_eq!(house.ledger.get("Beta").unwrap().mystery_cards, 1);
    }

    #[test]
    fn from_parts_requires_target_for_steal_and_deduct() {
        assert!(MysteryEffect::from_parts(EffectKind::Steal, None, 5).is_err());
        assert!(MysteryEffect::from_parts(EffectKind::Deduct, Some("  ".into()), 5).is_err());
        assert_eq!(
            MysteryEffect::from_parts(EffectKind::Double, Some("ignored".into()), 5).unwrap(),
            MysteryEffect::Double { points: 5 }
        );
    }
}
