//! Independent per-enemy status channels.
//!
//! Every channel owns its own timer and payload so an enemy can be burning,
//! shocked and confused at the same time. Timers count down in whole ticks.

use gem_defence_core::{EnemyTier, StatusKind, StatusSet};

pub(crate) const BURN_DURATION: u32 = 180;
pub(crate) const BURN_RATIO: f32 = 0.1;
pub(crate) const BURN_INTERVAL: u32 = 20;

pub(crate) const FREEZE_BASE_DURATION: u32 = 60;
pub(crate) const FREEZE_DURATION_PER_LEVEL: u32 = 15;

pub(crate) const POISON_DURATION: u32 = 240;
pub(crate) const POISON_INTERVAL: u32 = 30;
pub(crate) const POISON_STACK_RATIO: f32 = 0.2;

pub(crate) const SHOCK_DURATION: u32 = 150;
pub(crate) const SHOCK_SCALE: f32 = 2.0;
pub(crate) const SHOCK_CAP: f32 = 1.5;
pub(crate) const BOSS_SHOCK_CAP: f32 = 1.25;

pub(crate) const SOAKED_DURATION: u32 = 180;
pub(crate) const SOAKED_SPEED_FACTOR: f32 = 0.5;

pub(crate) const CONFUSION_DURATION: u32 = 180;
pub(crate) const CONFUSION_CHANCE_PER_LEVEL: f32 = 0.1;

pub(crate) const LEECH_DURATION: u32 = 180;
pub(crate) const LEECH_INTERVAL: u32 = 30;
pub(crate) const LEECH_RATIO: f32 = 0.15;

pub(crate) const STUN_DURATION: u32 = 30;
pub(crate) const STUN_DISPLACEMENT: f32 = 6.0;

pub(crate) const SYNERGY_COOLDOWN: u32 = 60;

/// Request to apply one status channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StatusApplication {
    pub(crate) kind: StatusKind,
    /// Damage baseline the payload is derived from.
    pub(crate) power: f32,
    /// Caster level gating chance-based channels.
    pub(crate) level: u32,
}

impl StatusApplication {
    pub(crate) const fn new(kind: StatusKind, power: f32, level: u32) -> Self {
        Self { kind, power, level }
    }
}

/// Damage released by the periodic channels during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct StatusTick {
    pub(crate) burn: f32,
    pub(crate) poison: f32,
    pub(crate) leech: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StatusEffects {
    burn: u32,
    burn_damage: f32,
    freeze: u32,
    poison: u32,
    poison_stacks: u32,
    poison_base: f32,
    shock: u32,
    shock_multiplier: f32,
    soaked: u32,
    confusion: u32,
    stun: u32,
    leech: u32,
    leech_damage: f32,
    synergy_cooldown: u32,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            burn: 0,
            burn_damage: 0.0,
            freeze: 0,
            poison: 0,
            poison_stacks: 0,
            poison_base: 0.0,
            shock: 0,
            shock_multiplier: 1.0,
            soaked: 0,
            confusion: 0,
            stun: 0,
            leech: 0,
            leech_damage: 0.0,
            synergy_cooldown: 0,
        }
    }
}

impl StatusEffects {
    /// Ticks remaining on the channel.
    pub(crate) fn remaining(&self, kind: StatusKind) -> u32 {
        match kind {
            StatusKind::Burn => self.burn,
            StatusKind::Freeze => self.freeze,
            StatusKind::Poison => self.poison,
            StatusKind::Shock => self.shock,
            StatusKind::Soaked => self.soaked,
            StatusKind::Confusion => self.confusion,
            StatusKind::Stun => self.stun,
            StatusKind::Leech => self.leech,
        }
    }

    pub(crate) fn is_active(&self, kind: StatusKind) -> bool {
        self.remaining(kind) > 0
    }

    pub(crate) fn active(&self) -> StatusSet {
        StatusKind::ALL
            .into_iter()
            .filter(|kind| self.is_active(*kind))
            .collect()
    }

    pub(crate) fn has_elemental(&self) -> bool {
        self.active().iter().any(StatusKind::is_elemental)
    }

    pub(crate) fn poison_stacks(&self) -> u32 {
        self.poison_stacks
    }

    pub(crate) fn poison_base(&self) -> f32 {
        self.poison_base
    }

    pub(crate) fn burn_damage(&self) -> f32 {
        self.burn_damage
    }

    /// Multiplier applied to incoming damage; neutral while unshocked.
    pub(crate) fn shock_multiplier(&self) -> f32 {
        if self.shock > 0 {
            self.shock_multiplier
        } else {
            1.0
        }
    }

    /// Fraction of normal movement speed currently allowed.
    pub(crate) fn speed_factor(&self) -> f32 {
        if self.freeze > 0 || self.stun > 0 {
            0.0
        } else if self.soaked > 0 {
            SOAKED_SPEED_FACTOR
        } else {
            1.0
        }
    }

    /// Frozen and stunned enemies neither move nor attack.
    pub(crate) fn is_immobile(&self) -> bool {
        self.freeze > 0 || self.stun > 0
    }

    /// Sets, refreshes or stacks the channel described by `application`.
    ///
    /// Tier and chance gating happen before this call; the channel always lands.
    pub(crate) fn apply(&mut self, application: StatusApplication, max_health: f32, tier: EnemyTier) {
        let power = application.power.max(0.0);
        match application.kind {
            StatusKind::Burn => {
                self.burn = BURN_DURATION;
                self.burn_damage = self.burn_damage.max(power * BURN_RATIO);
            }
            StatusKind::Freeze => {
                let duration = FREEZE_BASE_DURATION
                    + FREEZE_DURATION_PER_LEVEL * application.level.saturating_sub(1);
                self.freeze = self.freeze.max(duration);
            }
            StatusKind::Poison => {
                self.poison = POISON_DURATION;
                self.poison_stacks = self.poison_stacks.saturating_add(1);
                self.poison_base = power;
            }
            StatusKind::Shock => {
                let cap = if tier == EnemyTier::Boss {
                    BOSS_SHOCK_CAP
                } else {
                    SHOCK_CAP
                };
                let ratio = if max_health > 0.0 {
                    power / max_health
                } else {
                    0.0
                };
                let multiplier = (1.0 + ratio * SHOCK_SCALE).min(cap);
                if self.shock == 0 {
                    self.shock_multiplier = 1.0;
                }
                self.shock_multiplier = self.shock_multiplier.max(multiplier);
                self.shock = SHOCK_DURATION;
            }
            StatusKind::Soaked => self.soaked = SOAKED_DURATION,
            StatusKind::Confusion => self.confusion = CONFUSION_DURATION,
            StatusKind::Stun => self.stun = self.stun.max(STUN_DURATION),
            StatusKind::Leech => {
                self.leech = LEECH_DURATION;
                self.leech_damage = self.leech_damage.max(power * LEECH_RATIO);
            }
        }
    }

    /// Clears the channel's timer and payload.
    pub(crate) fn clear(&mut self, kind: StatusKind) {
        match kind {
            StatusKind::Burn => {
                self.burn = 0;
                self.burn_damage = 0.0;
            }
            StatusKind::Freeze => self.freeze = 0,
            StatusKind::Poison => {
                self.poison = 0;
                self.poison_stacks = 0;
                self.poison_base = 0.0;
            }
            StatusKind::Shock => {
                self.shock = 0;
                self.shock_multiplier = 1.0;
            }
            StatusKind::Soaked => self.soaked = 0,
            StatusKind::Confusion => self.confusion = 0,
            StatusKind::Stun => self.stun = 0,
            StatusKind::Leech => {
                self.leech = 0;
                self.leech_damage = 0.0;
            }
        }
    }

    pub(crate) fn extend_freeze(&mut self, ticks: u32) {
        self.freeze = self.freeze.saturating_add(ticks);
    }

    pub(crate) fn synergy_ready(&self) -> bool {
        self.synergy_cooldown == 0
    }

    pub(crate) fn start_synergy_cooldown(&mut self) {
        self.synergy_cooldown = SYNERGY_COOLDOWN;
    }

    /// Counts every timer down by one tick and returns the periodic damage due.
    pub(crate) fn advance(&mut self) -> StatusTick {
        let mut due = StatusTick::default();

        if self.burn > 0 {
            self.burn -= 1;
            if self.burn % BURN_INTERVAL == 0 {
                due.burn = self.burn_damage;
            }
            if self.burn == 0 {
                self.clear(StatusKind::Burn);
            }
        }

        if self.poison > 0 {
            self.poison -= 1;
            if self.poison % POISON_INTERVAL == 0 {
                due.poison = self.poison_base * POISON_STACK_RATIO * self.poison_stacks as f32;
            }
            if self.poison == 0 {
                self.clear(StatusKind::Poison);
            }
        }

        if self.leech > 0 {
            self.leech -= 1;
            if self.leech % LEECH_INTERVAL == 0 {
                due.leech = self.leech_damage;
            }
            if self.leech == 0 {
                self.clear(StatusKind::Leech);
            }
        }

        if self.shock > 0 {
            self.shock -= 1;
            if self.shock == 0 {
                self.clear(StatusKind::Shock);
            }
        }

        self.freeze = self.freeze.saturating_sub(1);
        self.soaked = self.soaked.saturating_sub(1);
        self.confusion = self.confusion.saturating_sub(1);
        self.stun = self.stun.saturating_sub(1);
        self.synergy_cooldown = self.synergy_cooldown.saturating_sub(1);

        due
    }
}
