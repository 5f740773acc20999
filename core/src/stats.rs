//! Named combat stat channels and the aggregated modifier set.

use serde::{Deserialize, Serialize};

/// Maximum base integrity before any `max_health` bonus is applied.
pub const BASE_MAX_HEALTH: f32 = 100.0;

/// Critical strike multiplier before any `crit_damage` bonus is applied.
pub const BASE_CRIT_MULTIPLIER: f32 = 1.5;

/// Upper bound applied to the damage reduction channel.
pub const MAX_DAMAGE_REDUCTION: f32 = 0.9;

macro_rules! stat_table {
    ($( $(#[$meta:meta])* $key:ident => $field:ident, $name:literal, $baseline:literal; )*) => {
        /// Identifies a single named stat channel.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum StatKey {
            $( $(#[$meta])* $key, )*
        }

        impl StatKey {
            /// Every stat key in declaration order.
            pub const ALL: &'static [StatKey] = &[$(StatKey::$key,)*];

            /// Stable snake_case name used by configuration files and persistence.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(StatKey::$key => $name,)*
                }
            }

            /// Resolves a stat key from its stable name.
            ///
            /// Unknown names yield `None` so newer data files keep loading.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(StatKey::$key),)*
                    _ => None,
                }
            }

            /// Value the channel holds before any source contributes.
            #[must_use]
            pub const fn baseline(self) -> f32 {
                match self {
                    $(StatKey::$key => $baseline,)*
                }
            }
        }

        /// Aggregated combat modifiers consumed read-only by the simulation.
        ///
        /// Values are always derived from the source collections; the only
        /// hand-maintained contributions come from the bonus stat bucket.
        #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
        pub struct CombatStats {
            $( $(#[$meta])* pub $field: f32, )*
        }

        impl CombatStats {
            /// Stats with every channel reset to its baseline.
            #[must_use]
            pub const fn baseline() -> Self {
                Self {
                    $($field: $baseline,)*
                }
            }

            /// Reads the value currently stored for `key`.
            #[must_use]
            pub const fn get(&self, key: StatKey) -> f32 {
                match key {
                    $(StatKey::$key => self.$field,)*
                }
            }

            fn slot_mut(&mut self, key: StatKey) -> &mut f32 {
                match key {
                    $(StatKey::$key => &mut self.$field,)*
                }
            }
        }
    };
}

stat_table! {
    /// Additive percentage applied to weapon damage.
    DamagePct => damage_pct, "damage_pct", 0.0;
    /// Multiplicative damage factor; contributions compound.
    DamageMore => damage_more, "damage_more", 1.0;
    /// Additive percentage applied to fire rate.
    RatePct => rate_pct, "rate_pct", 0.0;
    /// Chance in `[0, 1]` for a shot to strike critically.
    CritChance => crit_chance, "crit_chance", 0.0;
    /// Bonus added on top of the base critical multiplier.
    CritDamage => crit_damage, "crit_damage", 0.0;
    /// Additive percentage applied to area radii.
    AoePct => aoe_pct, "aoe_pct", 0.0;
    /// Additive percentage applied to chain search range.
    ChainRangePct => chain_range_pct, "chain_range_pct", 0.0;
    /// Flat pierce count added to every shot.
    PierceBonus => pierce_bonus, "pierce_bonus", 0.0;
    /// Flat chain count added to every shot.
    ChainBonus => chain_bonus, "chain_bonus", 0.0;
    /// Flat projectile count added to every volley.
    ProjectileBonus => projectile_bonus, "projectile_bonus", 0.0;
    /// Fraction of current base integrity paid per shot.
    SelfDamagePct => self_damage_pct, "self_damage_pct", 0.0;
    /// Flat base integrity paid per shot.
    SelfDamageFlat => self_damage_flat, "self_damage_flat", 0.0;
    /// Multiplier applied to direct hits only.
    HitMultiplier => hit_multiplier, "hit_multiplier", 1.0;
    /// Multiplier applied to damage-over-time ticks only.
    DotMultiplier => dot_multiplier, "dot_multiplier", 1.0;
    /// Additive percentage applied to status effect power.
    StatusPowerPct => status_power_pct, "status_power_pct", 0.0;
    /// Base integrity restored per direct hit.
    LifeOnHit => life_on_hit, "life_on_hit", 0.0;
    /// Additive percentage applied to gold payouts.
    GoldGainPct => gold_gain_pct, "gold_gain_pct", 0.0;
    /// Additive percentage applied to experience payouts.
    XpGainPct => xp_gain_pct, "xp_gain_pct", 0.0;
    /// Fraction of incoming base damage that is ignored.
    DamageReduction => damage_reduction, "damage_reduction", 0.0;
    /// Flat bonus to maximum base integrity.
    MaxHealth => max_health_bonus, "max_health", 0.0;
    /// Additive percentage applied to energy regeneration.
    EnergyRegenPct => energy_regen_pct, "energy_regen_pct", 0.0;
    /// Bonus against tank and boss tier enemies.
    AntiTankPct => anti_tank_pct, "anti_tank_pct", 0.0;
    /// Bonus scaled by how far the target is from the base.
    DistanceBonusPct => distance_bonus_pct, "distance_bonus_pct", 0.0;
    /// Bonus against enemies carrying an elemental status.
    ElementalVulnPct => elemental_vuln_pct, "elemental_vuln_pct", 0.0;
    /// Extra bonus against enemies carrying two or more statuses.
    MultiStatusPct => multi_status_pct, "multi_status_pct", 0.0;
    /// Chance to execute a frozen non-boss enemy outright.
    FreezeExecuteChance => freeze_execute_chance, "freeze_execute_chance", 0.0;
    /// Positive when shots steer toward their target.
    Homing => homing, "homing", 0.0;
    /// Positive when shots rebound off the arena bounds.
    Bounce => bounce, "bounce", 0.0;
    /// Additive percentage applied to support unit damage.
    SupportDamagePct => support_damage_pct, "support_damage_pct", 0.0;
}

impl StatKey {
    /// Reports whether contributions to the channel compound multiplicatively.
    #[must_use]
    pub const fn is_multiplicative(self) -> bool {
        matches!(
            self,
            StatKey::DamageMore | StatKey::HitMultiplier | StatKey::DotMultiplier
        )
    }

    /// Reports whether the channel is a boolean switch that never scales with level.
    #[must_use]
    pub const fn is_flag(self) -> bool {
        matches!(self, StatKey::Homing | StatKey::Bounce)
    }
}

/// Single contribution of `value` toward `key`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    /// Channel receiving the contribution.
    pub key: StatKey,
    /// Magnitude of the contribution.
    pub value: f32,
}

impl StatDelta {
    /// Creates a new contribution.
    #[must_use]
    pub const fn new(key: StatKey, value: f32) -> Self {
        Self { key, value }
    }

    /// Returns the delta with its magnitude multiplied by `factor`.
    ///
    /// Flag channels keep their magnitude.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        if self.key.is_flag() {
            return self;
        }
        Self::new(self.key, self.value * factor)
    }
}

impl Default for CombatStats {
    fn default() -> Self {
        Self::baseline()
    }
}

impl CombatStats {
    /// Folds a contribution into the channel.
    ///
    /// Additive channels sum; multiplicative channels multiply by `1 + value`.
    pub fn apply(&mut self, delta: StatDelta) {
        let slot = self.slot_mut(delta.key);
        if delta.key.is_multiplicative() {
            *slot *= 1.0 + delta.value;
        } else {
            *slot += delta.value;
        }
    }

    /// Replaces the channel value outright.
    pub fn set(&mut self, delta: StatDelta) {
        *self.slot_mut(delta.key) = delta.value;
    }

    /// Folds a contribution addressed by stable name.
    ///
    /// Returns `false` and leaves the stats untouched when the name is unknown.
    pub fn apply_named(&mut self, name: &str, value: f32) -> bool {
        match StatKey::from_name(name) {
            Some(key) => {
                self.apply(StatDelta::new(key, value));
                true
            }
            None => false,
        }
    }

    /// Maximum base integrity including bonuses.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        (BASE_MAX_HEALTH + self.max_health_bonus).max(1.0)
    }

    /// Multiplier applied to critical strikes.
    #[must_use]
    pub fn crit_multiplier(&self) -> f32 {
        BASE_CRIT_MULTIPLIER + self.crit_damage
    }

    /// Multiplier applied to incoming base damage after reduction.
    #[must_use]
    pub fn incoming_damage_factor(&self) -> f32 {
        1.0 - self.damage_reduction.clamp(0.0, MAX_DAMAGE_REDUCTION)
    }

    /// Reports whether shots steer toward their targets.
    #[must_use]
    pub fn homing_enabled(&self) -> bool {
        self.homing > 0.0
    }

    /// Reports whether shots rebound off the arena bounds.
    #[must_use]
    pub fn bounce_enabled(&self) -> bool {
        self.bounce > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_back_to_keys() {
        for key in StatKey::ALL {
            assert_eq!(StatKey::from_name(key.name()), Some(*key));
        }
        assert_eq!(StatKey::from_name("mana_regen"), None);
    }

    #[test]
    fn multiplicative_channels_start_neutral_and_compound() {
        let mut stats = CombatStats::baseline();
        assert_eq!(stats.damage_more, 1.0);
        stats.apply(StatDelta::new(StatKey::DamageMore, 0.5));
        stats.apply(StatDelta::new(StatKey::DamageMore, 1.0));
        assert!((stats.damage_more - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut stats = CombatStats::baseline();
        assert!(!stats.apply_named("shiny_hats", 4.0));
        assert_eq!(stats, CombatStats::baseline());
        assert!(stats.apply_named("crit_chance", 0.25));
        assert_eq!(stats.crit_chance, 0.25);
    }

    #[test]
    fn flags_do_not_scale() {
        let delta = StatDelta::new(StatKey::Homing, 1.0).scaled(3.0);
        assert_eq!(delta.value, 1.0);
        let delta = StatDelta::new(StatKey::CritChance, 0.1).scaled(2.0);
        assert!((delta.value - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn combat_stats_round_trip_through_bincode() {
        let mut stats = CombatStats::baseline();
        stats.apply(StatDelta::new(StatKey::GoldGainPct, 0.3));
        let bytes = bincode::serialize(&stats).expect("serialize");
        let restored: CombatStats = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, stats);
    }

    #[test]
    fn damage_reduction_is_capped() {
        let mut stats = CombatStats::baseline();
        stats.apply(StatDelta::new(StatKey::DamageReduction, 2.0));
        assert!((stats.incoming_damage_factor() - 0.1).abs() < 1e-6);
    }
}
