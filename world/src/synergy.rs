//! Declarative table of cross-element reactions.
//!
//! Resolution walks [`SYNERGY_RULES`] once, in order. A matching rule clears
//! both contributing channels before the next rule is checked, so a pair can
//! never fire twice for the same application.

use gem_defence_core::{StatusKind, SynergyKind};

use crate::status::StatusEffects;

/// Extra freeze granted by a crush after both channels are consumed.
pub(crate) const CRUSH_FREEZE_TICKS: u32 = 90;

/// Pair of channels that react when both are active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SynergyRule {
    pub(crate) first: StatusKind,
    pub(crate) second: StatusKind,
    pub(crate) synergy: SynergyKind,
}

const fn rule(first: StatusKind, second: StatusKind, synergy: SynergyKind) -> SynergyRule {
    SynergyRule {
        first,
        second,
        synergy,
    }
}

pub(crate) const SYNERGY_RULES: [SynergyRule; 13] = [
    rule(StatusKind::Burn, StatusKind::Soaked, SynergyKind::Steam),
    rule(StatusKind::Burn, StatusKind::Poison, SynergyKind::ToxicDetonation),
    rule(StatusKind::Shock, StatusKind::Soaked, SynergyKind::Electrocute),
    rule(StatusKind::Burn, StatusKind::Freeze, SynergyKind::Meltdown),
    rule(StatusKind::Burn, StatusKind::Shock, SynergyKind::Overload),
    rule(StatusKind::Freeze, StatusKind::Shock, SynergyKind::Superconduct),
    rule(StatusKind::Poison, StatusKind::Soaked, SynergyKind::Corrosion),
    rule(StatusKind::Poison, StatusKind::Shock, SynergyKind::PoisonSpread),
    rule(StatusKind::Freeze, StatusKind::Soaked, SynergyKind::Crush),
    rule(StatusKind::Confusion, StatusKind::Burn, SynergyKind::Inferno),
    rule(StatusKind::Confusion, StatusKind::Poison, SynergyKind::Miasma),
    rule(StatusKind::Confusion, StatusKind::Shock, SynergyKind::Storm),
    rule(StatusKind::Confusion, StatusKind::Freeze, SynergyKind::Permafrost),
];

/// Reaction that fired, with the damage baseline it carries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Fired {
    pub(crate) synergy: SynergyKind,
    pub(crate) magnitude: f32,
}

/// Shape of the effect a reaction produces around the reacting enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Reaction {
    /// Multiplier of the magnitude dealt to the reacting enemy itself.
    pub(crate) target_factor: f32,
    /// Radius of the burst around the reacting enemy; zero for none.
    pub(crate) radius: f32,
    /// Multiplier of the magnitude dealt to every enemy in the burst.
    pub(crate) burst_factor: f32,
    /// Caps the enemies reached, nearest first; spreads skip the reacting enemy.
    pub(crate) max_targets: Option<usize>,
    /// Channel spread to the enemies reached.
    pub(crate) spread: Option<StatusKind>,
    /// Distance enemies in the burst are pushed back.
    pub(crate) knockback: f32,
    /// Lingering field left behind.
    pub(crate) zone: Option<StatusKind>,
    /// Releases ice shards around the reacting enemy.
    pub(crate) shatter: bool,
}

const NONE: Reaction = Reaction {
    target_factor: 0.0,
    radius: 0.0,
    burst_factor: 0.0,
    max_targets: None,
    spread: None,
    knockback: 0.0,
    zone: None,
    shatter: false,
};

/// Published reaction shapes.
pub(crate) const fn reaction(synergy: SynergyKind) -> Reaction {
    match synergy {
        SynergyKind::Steam => Reaction {
            radius: 60.0,
            burst_factor: 1.5,
            ..NONE
        },
        SynergyKind::ToxicDetonation => Reaction {
            radius: 70.0,
            burst_factor: 1.0,
            ..NONE
        },
        SynergyKind::Electrocute => Reaction {
            radius: 120.0,
            burst_factor: 0.8,
            max_targets: Some(3),
            spread: Some(StatusKind::Shock),
            ..NONE
        },
        SynergyKind::Meltdown => Reaction {
            target_factor: 2.5,
            ..NONE
        },
        SynergyKind::Overload => Reaction {
            radius: 80.0,
            burst_factor: 1.0,
            knockback: 30.0,
            ..NONE
        },
        SynergyKind::Superconduct => Reaction {
            target_factor: 1.5,
            shatter: true,
            ..NONE
        },
        SynergyKind::Corrosion => Reaction {
            zone: Some(StatusKind::Poison),
            ..NONE
        },
        SynergyKind::PoisonSpread => Reaction {
            radius: 100.0,
            max_targets: Some(4),
            spread: Some(StatusKind::Poison),
            ..NONE
        },
        SynergyKind::Crush => Reaction {
            target_factor: 2.0,
            ..NONE
        },
        SynergyKind::Inferno => Reaction {
            zone: Some(StatusKind::Burn),
            ..NONE
        },
        SynergyKind::Miasma => Reaction {
            zone: Some(StatusKind::Poison),
            ..NONE
        },
        SynergyKind::Storm => Reaction {
            zone: Some(StatusKind::Shock),
            ..NONE
        },
        SynergyKind::Permafrost => Reaction {
            zone: Some(StatusKind::Freeze),
            ..NONE
        },
    }
}

fn is_confusion_based(synergy: SynergyKind) -> bool {
    matches!(
        synergy,
        SynergyKind::Inferno | SynergyKind::Miasma | SynergyKind::Storm | SynergyKind::Permafrost
    )
}

/// Runs every rule against `effects`, consuming the channels of each match.
///
/// `power` is the damage baseline of the application that triggered the
/// check. After a confusion-based reaction the per-enemy cooldown starts and
/// no further rule is checked until it elapses.
pub(crate) fn resolve(effects: &mut StatusEffects, power: f32, fired: &mut Vec<Fired>) {
    for rule in SYNERGY_RULES {
        if !effects.synergy_ready() {
            return;
        }
        if !effects.is_active(rule.first) || !effects.is_active(rule.second) {
            continue;
        }

        let magnitude = match rule.synergy {
            SynergyKind::ToxicDetonation => {
                power + effects.poison_base() * effects.poison_stacks() as f32
            }
            SynergyKind::Steam | SynergyKind::Meltdown | SynergyKind::Overload => {
                power + effects.burn_damage()
            }
            _ => power,
        };

        effects.clear(rule.first);
        effects.clear(rule.second);

        if rule.synergy == SynergyKind::Crush {
            effects.extend_freeze(CRUSH_FREEZE_TICKS);
        }
        if is_confusion_based(rule.synergy) {
            effects.start_synergy_cooldown();
        }

        fired.push(Fired {
            synergy: rule.synergy,
            magnitude,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusApplication;
    use gem_defence_core::EnemyTier;

    fn apply(effects: &mut StatusEffects, kind: StatusKind) -> Vec<Fired> {
        effects.apply(StatusApplication::new(kind, 10.0, 1), 100.0, EnemyTier::Common);
        let mut fired = Vec::new();
        resolve(effects, 10.0, &mut fired);
        fired
    }

    #[test]
    fn burn_then_poison_detonates_once_and_consumes_both() {
        let mut effects = StatusEffects::default();
        assert!(apply(&mut effects, StatusKind::Burn).is_empty());

        let fired = apply(&mut effects, StatusKind::Poison);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].synergy, SynergyKind::ToxicDetonation);
        assert_eq!(effects.remaining(StatusKind::Burn), 0);
        assert_eq!(effects.poison_stacks(), 0);
    }

    #[test]
    fn pair_order_does_not_matter() {
        let mut forward = StatusEffects::default();
        let _ = apply(&mut forward, StatusKind::Burn);
        let forward_fired = apply(&mut forward, StatusKind::Soaked);

        let mut backward = StatusEffects::default();
        let _ = apply(&mut backward, StatusKind::Soaked);
        let backward_fired = apply(&mut backward, StatusKind::Burn);

        assert_eq!(forward_fired.len(), 1);
        assert_eq!(forward_fired[0].synergy, SynergyKind::Steam);
        assert_eq!(backward_fired[0].synergy, SynergyKind::Steam);
    }

    #[test]
    fn consumed_channels_cannot_feed_a_later_rule() {
        let mut effects = StatusEffects::default();
        let _ = apply(&mut effects, StatusKind::Soaked);
        let _ = apply(&mut effects, StatusKind::Poison);
        // poison + soaked already reacted, so shock finds nothing left.
        assert!(effects.active().is_empty());

        let mut effects = StatusEffects::default();
        let _ = apply(&mut effects, StatusKind::Soaked);
        let fired = apply(&mut effects, StatusKind::Shock);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].synergy, SynergyKind::Electrocute);
        assert!(!effects.is_active(StatusKind::Soaked));
        assert!(!effects.is_active(StatusKind::Shock));
    }

    #[test]
    fn crush_leaves_the_enemy_frozen() {
        let mut effects = StatusEffects::default();
        let _ = apply(&mut effects, StatusKind::Soaked);
        let fired = apply(&mut effects, StatusKind::Freeze);
        assert_eq!(fired[0].synergy, SynergyKind::Crush);
        assert_eq!(effects.remaining(StatusKind::Freeze), CRUSH_FREEZE_TICKS);
        assert!(!effects.is_active(StatusKind::Soaked));
    }

    #[test]
    fn confusion_reactions_start_a_cooldown() {
        let mut effects = StatusEffects::default();
        let _ = apply(&mut effects, StatusKind::Confusion);
        let fired = apply(&mut effects, StatusKind::Burn);
        assert_eq!(fired[0].synergy, SynergyKind::Inferno);
        assert!(!effects.synergy_ready());

        let _ = apply(&mut effects, StatusKind::Burn);
        let gated = apply(&mut effects, StatusKind::Soaked);
        assert!(gated.is_empty());
        assert!(effects.is_active(StatusKind::Burn));
    }

    #[test]
    fn every_rule_pairs_distinct_channels() {
        for rule in SYNERGY_RULES {
            assert_ne!(rule.first, rule.second);
        }
    }
}
