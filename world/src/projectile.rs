//! Travelling projectiles and their hit-exclusion bookkeeping.

use gem_defence_core::{DamageSource, EnemyId, Element, ProjectileId, ARENA_HEIGHT, ARENA_WIDTH};
use glam::Vec2;

/// Collision radius of every projectile.
pub(crate) const PROJECTILE_RADIUS: f32 = 4.0;
/// Ticks a projectile may travel before it fizzles.
pub(crate) const PROJECTILE_LIFETIME: u32 = 240;
/// Share of the current damage carried by a chained projectile.
pub(crate) const CHAIN_DAMAGE_FACTOR: f32 = 0.8;
/// Most rebounds a bouncing projectile may perform.
pub(crate) const MAX_BOUNCES: u32 = 3;
/// Radians a homing projectile may turn per tick.
const HOMING_TURN_RATE: f32 = 0.12;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) target: Option<EnemyId>,
    pub(crate) damage: f32,
    /// Damage before hit-only multipliers; feeds status power.
    pub(crate) raw_damage: f32,
    pub(crate) critical: bool,
    pub(crate) element: Element,
    pub(crate) source: DamageSource,
    pub(crate) pierce: u32,
    pub(crate) chain: u32,
    pub(crate) chain_range: f32,
    pub(crate) area_radius: Option<f32>,
    pub(crate) status_level: u32,
    pub(crate) homing: bool,
    pub(crate) bounces_left: u32,
    pub(crate) hit: Vec<EnemyId>,
    pub(crate) lifetime: u32,
    pub(crate) alive: bool,
}

impl Projectile {
    /// Creates a basic projectile with no pierce, chain or area behaviour.
    pub(crate) fn basic(
        id: ProjectileId,
        position: Vec2,
        velocity: Vec2,
        damage: f32,
        element: Element,
        source: DamageSource,
    ) -> Self {
        Self {
            id,
            position,
            velocity,
            target: None,
            damage,
            raw_damage: damage,
            critical: false,
            element,
            source,
            pierce: 0,
            chain: 0,
            chain_range: 0.0,
            area_radius: None,
            status_level: 1,
            homing: false,
            bounces_left: 0,
            hit: Vec::new(),
            lifetime: PROJECTILE_LIFETIME,
            alive: true,
        }
    }

    pub(crate) fn has_hit(&self, enemy: EnemyId) -> bool {
        self.hit.contains(&enemy)
    }

    pub(crate) fn record_hit(&mut self, enemy: EnemyId) {
        if !self.has_hit(enemy) {
            self.hit.push(enemy);
        }
    }

    /// Builds the retargeted projectile spawned once pierce is exhausted.
    ///
    /// The child keeps the parent's hit set so no enemy is struck twice.
    pub(crate) fn chained(&self, id: ProjectileId, from: Vec2, target: EnemyId, aim: Vec2) -> Self {
        let speed = self.velocity.length().max(1.0);
        let direction = (aim - from).normalize_or_zero();
        Self {
            id,
            position: from,
            velocity: direction * speed,
            target: Some(target),
            damage: self.damage * CHAIN_DAMAGE_FACTOR,
            raw_damage: self.raw_damage * CHAIN_DAMAGE_FACTOR,
            chain: self.chain.saturating_sub(1),
            pierce: 0,
            hit: self.hit.clone(),
            lifetime: PROJECTILE_LIFETIME,
            alive: true,
            homing: true,
            ..self.clone()
        }
    }

    /// Moves the projectile one tick, steering toward `aim` when homing.
    pub(crate) fn advance(&mut self, aim: Option<Vec2>) {
        if !self.alive {
            return;
        }

        if self.homing {
            if let Some(aim) = aim {
                let desired = (aim - self.position).normalize_or_zero();
                let current = self.velocity.normalize_or_zero();
                if desired != Vec2::ZERO && current != Vec2::ZERO {
                    let angle = current.angle_between(desired);
                    let turn = angle.clamp(-HOMING_TURN_RATE, HOMING_TURN_RATE);
                    let steered = Vec2::from_angle(turn).rotate(current);
                    self.velocity = steered * self.velocity.length();
                }
            }
        }

        self.position += self.velocity;
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            self.alive = false;
            return;
        }

        let outside_x = self.position.x < 0.0 || self.position.x > ARENA_WIDTH;
        let outside_y = self.position.y < 0.0 || self.position.y > ARENA_HEIGHT;
        if !outside_x && !outside_y {
            return;
        }

        if self.bounces_left == 0 {
            self.alive = false;
            return;
        }

        self.bounces_left -= 1;
        if outside_x {
            self.velocity.x = -self.velocity.x;
            self.position.x = self.position.x.clamp(0.0, ARENA_WIDTH);
        }
        if outside_y {
            self.velocity.y = -self.velocity.y;
            self.position.y = self.position.y.clamp(0.0, ARENA_HEIGHT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt() -> Projectile {
        Projectile::basic(
            ProjectileId::new(1),
            Vec2::new(400.0, 300.0),
            Vec2::new(0.0, -10.0),
            20.0,
            Element::Physical,
            DamageSource::Hit(Element::Physical),
        )
    }

    #[test]
    fn chained_child_keeps_hit_set_and_loses_damage() {
        let mut parent = bolt();
        parent.chain = 2;
        parent.record_hit(EnemyId::new(3));

        let child = parent.chained(
            ProjectileId::new(2),
            Vec2::new(400.0, 200.0),
            EnemyId::new(4),
            Vec2::new(500.0, 200.0),
        );

        assert!(child.has_hit(EnemyId::new(3)));
        assert_eq!(child.chain, 1);
        assert!((child.damage - 16.0).abs() < 1e-6);
        assert!((child.velocity - Vec2::new(10.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn leaves_the_arena_without_bounce() {
        let mut projectile = bolt();
        projectile.position = Vec2::new(400.0, 5.0);
        projectile.advance(None);
        assert!(!projectile.alive);
    }

    #[test]
    fn bounces_off_the_arena_edge() {
        let mut projectile = bolt();
        projectile.position = Vec2::new(400.0, 5.0);
        projectile.bounces_left = MAX_BOUNCES;
        projectile.advance(None);
        assert!(projectile.alive);
        assert!(projectile.velocity.y > 0.0);
        assert_eq!(projectile.bounces_left, MAX_BOUNCES - 1);
    }

    #[test]
    fn records_each_enemy_once() {
        let mut projectile = bolt();
        projectile.record_hit(EnemyId::new(9));
        projectile.record_hit(EnemyId::new(9));
        assert_eq!(projectile.hit.len(), 1);
    }
}
