//! Support drones orbiting the turret.

use gem_defence_core::BASE_POSITION;
use glam::Vec2;

pub(crate) const DRONE_INTERVAL: u32 = 45;
pub(crate) const DRONE_DAMAGE: f32 = 6.0;
pub(crate) const DRONE_SPEED: f32 = 8.0;
const DRONE_SPACING: f32 = 60.0;
const DRONE_HOVER: f32 = 40.0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Drone {
    pub(crate) position: Vec2,
    cooldown: u32,
    /// Ticks left for a temporary drone; `None` for a permanent one.
    remaining: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SupportWing {
    drones: Vec<Drone>,
}

impl SupportWing {
    pub(crate) fn len(&self) -> usize {
        self.drones.len()
    }

    /// Keeps exactly `count` permanent drones, leaving temporary ones alone.
    pub(crate) fn sync_permanent(&mut self, count: usize) {
        let permanent = self
            .drones
            .iter()
            .filter(|drone| drone.remaining.is_none())
            .count();
        if permanent > count {
            let mut excess = permanent - count;
            self.drones.retain(|drone| {
                if excess > 0 && drone.remaining.is_none() {
                    excess -= 1;
                    false
                } else {
                    true
                }
            });
        } else {
            for _ in permanent..count {
                self.push(None);
            }
        }
        self.reposition();
    }

    pub(crate) fn deploy(&mut self, duration: u32) {
        self.push(Some(duration));
        self.reposition();
    }

    fn push(&mut self, remaining: Option<u32>) {
        self.drones.push(Drone {
            position: BASE_POSITION,
            cooldown: DRONE_INTERVAL,
            remaining,
        });
    }

    fn reposition(&mut self) {
        for (index, drone) in self.drones.iter_mut().enumerate() {
            let rank = (index / 2 + 1) as f32;
            let side = if index % 2 == 0 { -1.0 } else { 1.0 };
            drone.position = BASE_POSITION + Vec2::new(side * DRONE_SPACING * rank, -DRONE_HOVER);
        }
    }

    /// Advances cooldowns and lifetimes; returns the positions of drones ready to fire.
    pub(crate) fn tick(&mut self) -> Vec<Vec2> {
        let mut ready = Vec::new();
        for drone in &mut self.drones {
            if let Some(remaining) = drone.remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }
            drone.cooldown = drone.cooldown.saturating_sub(1);
            if drone.cooldown == 0 {
                drone.cooldown = DRONE_INTERVAL;
                ready.push(drone.position);
            }
        }

        let before = self.drones.len();
        self.drones.retain(|drone| drone.remaining != Some(0));
        if self.drones.len() != before {
            self.reposition();
        }
        ready
    }
}
