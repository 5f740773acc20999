#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns loadout cadence into fully resolved volleys.
//!
//! Each loadout keeps its own tick counter. The counter advances on every
//! [`Event::TimeAdvanced`]; once it reaches the effective interval the loadout
//! is ready and stays ready until a target exists, at which point a
//! [`Command::FireWeapon`] carrying a resolved [`ShotPlan`] is emitted.

use gem_defence_core::{
    catalog::SupportModifiers, ActiveGemKind, CombatStats, Command, EnemyId, Event, GemPattern,
    Leveled, Loadout, LoadoutSnapshot, ShotPattern, ShotPlan, SupportGemKind,
};

/// Chain search radius before the global chain-range bonus.
pub const BASE_CHAIN_RANGE: f32 = 150.0;
/// Angle between neighbouring projectiles of a spread volley.
pub const SPREAD_STEP_RADIANS: f32 = 0.15;
/// Ticks between firing a meteor and its impact.
pub const METEOR_DELAY_TICKS: u32 = 45;
/// Lowest rate factor; keeps heavy rate penalties from stalling a loadout.
pub const MIN_RATE_FACTOR: f32 = 0.1;

/// Weapon fire system tracking per-loadout cadence.
#[derive(Debug, Default)]
pub struct WeaponFire {
    loadouts: [Cadence; 2],
    scratch: Vec<Command>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Cadence {
    gem: Option<Leveled<ActiveGemKind>>,
    elapsed: u32,
}

impl WeaponFire {
    /// Creates a new weapon fire system with idle loadouts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed since the loadout last fired, capped at its interval.
    #[must_use]
    pub fn elapsed(&self, loadout: Loadout) -> u32 {
        self.loadouts[slot(loadout)].elapsed
    }

    /// Emits `Command::FireWeapon` for every loadout whose cadence rolled over.
    pub fn handle(
        &mut self,
        events: &[Event],
        loadouts: &[LoadoutSnapshot],
        stats: &CombatStats,
        target: Option<EnemyId>,
        out: &mut Vec<Command>,
    ) {
        let ticks = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        if ticks == 0 {
            return;
        }

        self.scratch.clear();

        for snapshot in loadouts {
            let cadence = &mut self.loadouts[slot(snapshot.loadout)];
            let Some(gem) = snapshot.active else {
                *cadence = Cadence::default();
                continue;
            };
            if cadence.gem != Some(gem) {
                *cadence = Cadence {
                    gem: Some(gem),
                    elapsed: 0,
                };
            }

            let interval = fire_interval(gem.kind, snapshot.loadout, &snapshot.supports, stats);
            for _ in 0..ticks {
                cadence.elapsed = (cadence.elapsed + 1).min(interval);
                if cadence.elapsed < interval {
                    continue;
                }
                let Some(target) = target else {
                    break;
                };
                cadence.elapsed = 0;
                self.scratch.push(Command::FireWeapon {
                    loadout: snapshot.loadout,
                    target,
                    plan: resolve_plan(gem, &snapshot.supports, snapshot.loadout, stats),
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn slot(loadout: Loadout) -> usize {
    match loadout {
        Loadout::Main => 0,
        Loadout::Alternate => 1,
    }
}

fn support_totals(supports: &[Leveled<SupportGemKind>]) -> (SupportModifiers, f32) {
    let mut total = SupportModifiers::default();
    let mut more = 1.0;
    for support in supports {
        let modifiers = support.kind.modifiers(support.level);
        total.damage_pct += modifiers.damage_pct;
        total.rate_pct += modifiers.rate_pct;
        total.extra_projectiles += modifiers.extra_projectiles;
        total.pierce += modifiers.pierce;
        total.chain += modifiers.chain;
        total.aoe_pct += modifiers.aoe_pct;
        total.self_damage_flat += modifiers.self_damage_flat;
        more *= 1.0 + modifiers.damage_more;
    }
    (total, more)
}

fn whole(bonus: f32) -> u32 {
    bonus.max(0.0).round() as u32
}

/// Effective ticks between shots of `gem` in `loadout`.
#[must_use]
pub fn fire_interval(
    gem: ActiveGemKind,
    loadout: Loadout,
    supports: &[Leveled<SupportGemKind>],
    stats: &CombatStats,
) -> u32 {
    let (modifiers, _) = support_totals(supports);
    let rate = (1.0 + stats.rate_pct + modifiers.rate_pct).max(MIN_RATE_FACTOR);
    let base = gem.profile().interval_ticks as f32 * loadout.interval_factor();
    (base / rate).ceil().max(1.0) as u32
}

/// Resolves every modifier into the volley a loadout fires.
#[must_use]
pub fn resolve_plan(
    gem: Leveled<ActiveGemKind>,
    supports: &[Leveled<SupportGemKind>],
    loadout: Loadout,
    stats: &CombatStats,
) -> ShotPlan {
    let profile = gem.kind.profile();
    let (modifiers, support_more) = support_totals(supports);

    let raw_damage = profile.base_damage
        * ActiveGemKind::level_factor(gem.level)
        * (1.0 + stats.damage_pct + modifiers.damage_pct).max(0.0)
        * stats.damage_more
        * support_more
        * loadout.damage_factor();
    let count = 1 + modifiers.extra_projectiles + whole(stats.projectile_bonus);

    let pattern = match profile.pattern {
        GemPattern::Projectile => ShotPattern::Spread {
            count,
            step_radians: SPREAD_STEP_RADIANS,
        },
        GemPattern::Meteor => ShotPattern::Meteor {
            count,
            delay_ticks: METEOR_DELAY_TICKS,
        },
        GemPattern::Trap => ShotPattern::Trap { count },
    };

    ShotPlan {
        gem: gem.kind,
        element: profile.element,
        pattern,
        damage: raw_damage * stats.hit_multiplier,
        raw_damage,
        crit_chance: stats.crit_chance.clamp(0.0, 1.0),
        crit_multiplier: stats.crit_multiplier(),
        pierce: profile.base_pierce + modifiers.pierce + whole(stats.pierce_bonus),
        chain: profile.base_chain + modifiers.chain + whole(stats.chain_bonus),
        chain_range: BASE_CHAIN_RANGE * (1.0 + stats.chain_range_pct).max(0.0),
        area_radius: profile
            .area_radius
            .map(|radius| radius * (1.0 + stats.aoe_pct + modifiers.aoe_pct).max(0.1)),
        speed: profile.speed,
        homing: stats.homing_enabled(),
        bounce: stats.bounce_enabled(),
        status_level: gem.level.max(1),
        self_damage_flat: stats.self_damage_flat + modifiers.self_damage_flat,
        self_damage_pct: stats.self_damage_pct.max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_defence_core::{StatDelta, StatKey};

    fn leveled<K>(kind: K, level: u32) -> Leveled<K> {
        Leveled { kind, level }
    }

    fn snapshot(loadout: Loadout, gem: ActiveGemKind) -> LoadoutSnapshot {
        LoadoutSnapshot {
            loadout,
            active: Some(leveled(gem, 1)),
            supports: Vec::new(),
        }
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced { tick: 1 }]
    }

    #[test]
    fn alternate_loadout_fires_at_half_cadence_and_damage() {
        let stats = CombatStats::baseline();
        let main = fire_interval(ActiveGemKind::Spark, Loadout::Main, &[], &stats);
        let alternate = fire_interval(ActiveGemKind::Spark, Loadout::Alternate, &[], &stats);
        assert_eq!(main, 30);
        assert_eq!(alternate, 60);

        let gem = leveled(ActiveGemKind::Spark, 1);
        let full = resolve_plan(gem, &[], Loadout::Main, &stats);
        let half = resolve_plan(gem, &[], Loadout::Alternate, &stats);
        assert!((full.damage - 10.0).abs() < 1e-5);
        assert!((half.damage - 5.0).abs() < 1e-5);
    }

    #[test]
    fn supports_and_globals_stack_into_the_plan() {
        let mut stats = CombatStats::baseline();
        stats.apply(StatDelta::new(StatKey::DamagePct, 0.5));
        stats.apply(StatDelta::new(StatKey::PierceBonus, 1.0));
        let supports = [
            leveled(SupportGemKind::Multishot, 1),
            leveled(SupportGemKind::Pierce, 1),
        ];
        let plan = resolve_plan(
            leveled(ActiveGemKind::Spark, 1),
            &supports,
            Loadout::Main,
            &stats,
        );

        assert_eq!(
            plan.pattern,
            ShotPattern::Spread {
                count: 3,
                step_radians: SPREAD_STEP_RADIANS
            }
        );
        assert_eq!(plan.pierce, 2);
        assert!((plan.damage - 10.0 * 1.5 * 0.75).abs() < 1e-4);
    }

    #[test]
    fn keystones_split_hit_damage_from_status_baseline() {
        let mut stats = CombatStats::baseline();
        stats.apply(StatDelta::new(StatKey::HitMultiplier, 0.4));
        let plan = resolve_plan(
            leveled(ActiveGemKind::Ember, 1),
            &[],
            Loadout::Main,
            &stats,
        );
        assert!((plan.raw_damage - 8.0).abs() < 1e-5);
        assert!((plan.damage - 8.0 * 1.4).abs() < 1e-4);
        assert_eq!(plan.area_radius, Some(40.0));
    }

    #[test]
    fn readiness_is_held_until_a_target_appears() {
        let mut system = WeaponFire::new();
        let stats = CombatStats::baseline();
        let loadouts = [snapshot(Loadout::Main, ActiveGemKind::Spark)];
        let mut out = Vec::new();

        for _ in 0..45 {
            system.handle(&tick(), &loadouts, &stats, None, &mut out);
        }
        assert!(out.is_empty());
        assert_eq!(system.elapsed(Loadout::Main), 30);

        system.handle(&tick(), &loadouts, &stats, Some(EnemyId::new(3)), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(system.elapsed(Loadout::Main), 0);
    }

    #[test]
    fn empty_loadouts_reset_their_cadence() {
        let mut system = WeaponFire::new();
        let stats = CombatStats::baseline();
        let mut out = Vec::new();
        for _ in 0..10 {
            system.handle(
                &tick(),
                &[snapshot(Loadout::Main, ActiveGemKind::Spark)],
                &stats,
                None,
                &mut out,
            );
        }
        let empty = LoadoutSnapshot {
            loadout: Loadout::Main,
            active: None,
            supports: Vec::new(),
        };
        system.handle(&tick(), &[empty], &stats, None, &mut out);
        assert_eq!(system.elapsed(Loadout::Main), 0);
    }

    #[test]
    fn meteor_and_snare_keep_their_patterns() {
        let stats = CombatStats::baseline();
        let meteor = resolve_plan(leveled(ActiveGemKind::Meteor, 1), &[], Loadout::Main, &stats);
        assert_eq!(
            meteor.pattern,
            ShotPattern::Meteor {
                count: 1,
                delay_ticks: METEOR_DELAY_TICKS
            }
        );
        let snare = resolve_plan(leveled(ActiveGemKind::Snare, 2), &[], Loadout::Main, &stats);
        assert_eq!(snare.pattern, ShotPattern::Trap { count: 1 });
        assert_eq!(snare.status_level, 2);
    }
}
