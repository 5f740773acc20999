//! Enemy state and the damage/status entry points.

use gem_defence_core::{
    BossPhase, CombatStats, DamageSource, EnemyId, EnemySnapshot, EnemyTier, Event, StatusKind,
    ARENA_HEIGHT, BASE_POSITION, DEFENSE_LINE_Y,
};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    status::{
        StatusApplication, StatusEffects, StatusTick, CONFUSION_CHANCE_PER_LEVEL,
        STUN_DISPLACEMENT,
    },
    synergy::{self, Fired},
};

/// Row a boss stops on to start attacking the base.
pub(crate) const BOSS_FIGHT_LINE: f32 = DEFENSE_LINE_Y - 160.0;
/// Ticks between boss attacks on the base.
pub(crate) const BOSS_ATTACK_INTERVAL: u32 = 120;
/// Ticks between blows struck by a confused enemy.
pub(crate) const CONFUSION_ATTACK_INTERVAL: u32 = 30;
/// Multiplier base when two or more statuses are active.
pub(crate) const MULTI_STATUS_BASE: f32 = 1.1;
/// Distance a non-boss enemy is pushed back by a direct hit.
pub(crate) const HIT_KNOCKBACK: f32 = 2.0;
/// Ticks the hit flash stays visible.
pub(crate) const HIT_FLASH_TICKS: u32 = 6;

/// One instance of incoming damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hit {
    pub(crate) amount: f32,
    pub(crate) critical: bool,
    pub(crate) source: DamageSource,
}

impl Hit {
    pub(crate) const fn new(amount: f32, critical: bool, source: DamageSource) -> Self {
        Self {
            amount,
            critical,
            source,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DamageOutcome {
    pub(crate) dealt: f32,
    /// True only for the hit that took the enemy from alive to dead.
    pub(crate) killed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) tier: EnemyTier,
    pub(crate) position: Vec2,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) contact_damage: f32,
    pub(crate) radius: f32,
    pub(crate) statuses: StatusEffects,
    pub(crate) boss_phase: Option<BossPhase>,
    pub(crate) attack_timer: u32,
    pub(crate) flash_ticks: u32,
    pub(crate) dead: bool,
    pub(crate) paid: bool,
    pub(crate) frozen_at_death: bool,
    pub(crate) breached: bool,
}

impl Enemy {
    pub(crate) fn new(
        id: EnemyId,
        tier: EnemyTier,
        position: Vec2,
        health_multiplier: f32,
        damage_multiplier: f32,
    ) -> Self {
        let profile = tier.profile();
        let max_health = (profile.health * health_multiplier.max(0.01)).max(1.0);
        Self {
            id,
            tier,
            position,
            health: max_health,
            max_health,
            speed: profile.speed,
            contact_damage: profile.contact_damage * damage_multiplier.max(0.0),
            radius: profile.radius,
            statuses: StatusEffects::default(),
            boss_phase: (tier == EnemyTier::Boss).then_some(BossPhase::Enter),
            attack_timer: BOSS_ATTACK_INTERVAL,
            flash_ticks: 0,
            dead: false,
            paid: false,
            frozen_at_death: false,
            breached: false,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.dead && !self.breached
    }

    pub(crate) fn is_confused(&self) -> bool {
        self.statuses.is_active(StatusKind::Confusion)
    }

    /// Frozen enemies hold their position against every push.
    pub(crate) fn is_frozen(&self) -> bool {
        self.statuses.is_active(StatusKind::Freeze)
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            tier: self.tier,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            statuses: self.statuses.active(),
            boss_phase: self.boss_phase,
        }
    }

    /// Applies incoming damage after every conditional multiplier.
    ///
    /// Returns `None` when the enemy is already dead. The kill flag is raised
    /// exactly once so payouts cannot be processed twice.
    pub(crate) fn take_damage(
        &mut self,
        hit: Hit,
        stats: &CombatStats,
        rng: &mut ChaCha8Rng,
        out_events: &mut Vec<Event>,
    ) -> Option<DamageOutcome> {
        if self.dead {
            return None;
        }

        let mut amount = hit.amount.max(0.0);

        if self.tier.is_heavy() {
            amount *= 1.0 + stats.anti_tank_pct;
        }
        let distance = (self.position.distance(BASE_POSITION) / ARENA_HEIGHT).min(1.0);
        amount *= 1.0 + stats.distance_bonus_pct * distance;
        if self.statuses.has_elemental() {
            amount *= 1.0 + stats.elemental_vuln_pct;
        }

        if self.statuses.active().len() >= 2 {
            amount *= MULTI_STATUS_BASE + stats.multi_status_pct;
        }

        let frozen = self.is_frozen();
        if frozen
            && self.tier != EnemyTier::Boss
            && stats.freeze_execute_chance > 0.0
            && rng.gen::<f32>() < stats.freeze_execute_chance
        {
            debug!(enemy = self.id.get(), "frozen enemy executed");
            amount = amount.max(self.health);
        }

        amount *= self.statuses.shock_multiplier();

        self.health -= amount;

        if !hit.source.is_dot() && self.tier != EnemyTier::Boss && !frozen {
            self.flash_ticks = HIT_FLASH_TICKS;
            self.position.y -= HIT_KNOCKBACK;
        }

        out_events.push(Event::DamageDealt {
            enemy: self.id,
            amount,
            critical: hit.critical,
            source: hit.source,
        });

        let killed = self.health <= 0.0;
        if killed {
            self.dead = true;
            self.frozen_at_death = frozen;
        }

        Some(DamageOutcome {
            dealt: amount,
            killed,
        })
    }

    /// Applies a status channel and resolves any reaction it completes.
    ///
    /// Confusion only lands on common enemies and only with a level-scaled
    /// chance. Fired reactions are appended to `fired`.
    pub(crate) fn apply_status(
        &mut self,
        application: StatusApplication,
        rng: &mut ChaCha8Rng,
        out_events: &mut Vec<Event>,
        fired: &mut Vec<Fired>,
    ) {
        if self.dead {
            return;
        }

        if application.kind == StatusKind::Confusion {
            if self.tier != EnemyTier::Common {
                return;
            }
            let chance = CONFUSION_CHANCE_PER_LEVEL * application.level as f32;
            if rng.gen::<f32>() >= chance {
                return;
            }
        }

        self.statuses
            .apply(application, self.max_health, self.tier);
        out_events.push(Event::StatusApplied {
            enemy: self.id,
            status: application.kind,
        });

        if application.kind == StatusKind::Stun && !self.is_frozen() {
            self.position.y -= STUN_DISPLACEMENT;
        }

        let before = fired.len();
        synergy::resolve(&mut self.statuses, application.power, fired);
        for reaction in &fired[before..] {
            debug!(enemy = self.id.get(), synergy = ?reaction.synergy, "synergy triggered");
            out_events.push(Event::SynergyTriggered {
                enemy: self.id,
                synergy: reaction.synergy,
            });
        }
    }

    /// Counts status timers down and returns the periodic damage due.
    pub(crate) fn tick_statuses(&mut self) -> StatusTick {
        self.flash_ticks = self.flash_ticks.saturating_sub(1);
        self.statuses.advance()
    }

    /// Walks toward the defended line; bosses stop at the fight line.
    ///
    /// Returns `true` when a boss strikes the base this tick.
    pub(crate) fn advance(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        let step = self.speed * self.statuses.speed_factor();

        match self.boss_phase {
            Some(BossPhase::Enter) => {
                self.position.y += step;
                if self.position.y >= BOSS_FIGHT_LINE {
                    self.position.y = BOSS_FIGHT_LINE;
                    self.boss_phase = Some(BossPhase::Fight);
                    self.attack_timer = BOSS_ATTACK_INTERVAL;
                }
                false
            }
            Some(BossPhase::Fight) => {
                if self.statuses.is_immobile() {
                    return false;
                }
                self.attack_timer = self.attack_timer.saturating_sub(1);
                if self.attack_timer == 0 {
                    self.attack_timer = BOSS_ATTACK_INTERVAL;
                    return true;
                }
                false
            }
            None => {
                self.position.y += step;
                if self.position.y >= DEFENSE_LINE_Y {
                    self.breached = true;
                }
                false
            }
        }
    }

    /// Steps a confused enemy toward `prey`; returns `true` when it strikes.
    pub(crate) fn hunt(&mut self, prey: Vec2, prey_radius: f32) -> bool {
        if !self.is_active() || self.statuses.is_immobile() {
            return false;
        }

        let offset = prey - self.position;
        let reach = self.radius + prey_radius;
        if offset.length() > reach {
            let step = self.speed * self.statuses.speed_factor();
            self.position += offset.normalize_or_zero() * step.min(offset.length() - reach);
            return false;
        }

        self.attack_timer = self.attack_timer.saturating_sub(1);
        if self.attack_timer == 0 {
            self.attack_timer = CONFUSION_ATTACK_INTERVAL;
            return true;
        }
        false
    }
}
