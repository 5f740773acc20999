//! Lingering fields, one-shot traps and delayed meteor impacts.

use gem_defence_core::{Element, StatusKind, ZoneId};
use glam::Vec2;

/// Ticks between periodic pulses of a lingering field.
pub(crate) const ZONE_INTERVAL: u32 = 30;
/// Lifetime of a field left behind by a reaction.
pub(crate) const FIELD_LIFETIME: u32 = 240;
/// Radius of a field left behind by a reaction.
pub(crate) const FIELD_RADIUS: f32 = 55.0;
/// Share of the reaction magnitude dealt by every pulse.
pub(crate) const FIELD_PULSE_FACTOR: f32 = 0.25;
/// Ticks an untriggered trap stays armed.
pub(crate) const TRAP_LIFETIME: u32 = 600;

/// How a zone delivers its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ZoneTrigger {
    /// Pulses every [`ZONE_INTERVAL`] ticks until it expires.
    Periodic,
    /// Fires once when an enemy touches it, then disappears.
    OnContact,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Zone {
    pub(crate) id: ZoneId,
    pub(crate) position: Vec2,
    pub(crate) radius: f32,
    pub(crate) remaining: u32,
    pub(crate) damage: f32,
    pub(crate) status: Option<StatusKind>,
    pub(crate) level: u32,
    pub(crate) trigger: ZoneTrigger,
    pub(crate) alive: bool,
}

/// Outcome of advancing a zone by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ZonePulse {
    Idle,
    Pulse,
}

impl Zone {
    pub(crate) fn field(id: ZoneId, position: Vec2, damage: f32, status: StatusKind) -> Self {
        Self {
            id,
            position,
            radius: FIELD_RADIUS,
            remaining: FIELD_LIFETIME,
            damage,
            status: Some(status),
            level: 1,
            trigger: ZoneTrigger::Periodic,
            alive: true,
        }
    }

    pub(crate) fn trap(id: ZoneId, position: Vec2, radius: f32, damage: f32, level: u32) -> Self {
        Self {
            id,
            position,
            radius,
            remaining: TRAP_LIFETIME,
            damage,
            status: Some(StatusKind::Stun),
            level,
            trigger: ZoneTrigger::OnContact,
            alive: true,
        }
    }

    pub(crate) fn contains(&self, point: Vec2, margin: f32) -> bool {
        self.position.distance(point) <= self.radius + margin
    }

    /// Counts the lifetime down; periodic fields report when a pulse is due.
    pub(crate) fn advance(&mut self) -> ZonePulse {
        if !self.alive {
            return ZonePulse::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.alive = false;
        }
        match self.trigger {
            ZoneTrigger::Periodic if self.remaining % ZONE_INTERVAL == 0 => ZonePulse::Pulse,
            _ => ZonePulse::Idle,
        }
    }
}

/// Telegraphed landing point of a meteor.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Impact {
    pub(crate) position: Vec2,
    pub(crate) radius: f32,
    pub(crate) remaining: u32,
    pub(crate) damage: f32,
    pub(crate) raw_damage: f32,
    pub(crate) critical: bool,
    pub(crate) element: Element,
    pub(crate) level: u32,
    pub(crate) landed: bool,
}

impl Impact {
    /// Counts the delay down and reports whether the impact lands this tick.
    pub(crate) fn advance(&mut self) -> bool {
        if self.landed {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.landed = true;
        }
        self.landed
    }
}
