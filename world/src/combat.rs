//! Per-tick simulation: movement, collisions, reactions and payouts.
//!
//! Reactions never recurse directly. Anything a hit or a status application
//! produces is pushed onto the world's effect queue as an [`Effect`] and
//! drained after the entity traversals, with a hard per-drain budget.

use gem_defence_core::{
    ActiveGemKind, ArtifactKind, BossArtifactKind, DamageSource, Element, EnemyId, EnemyTier,
    Event, ItemTemplate, Loadout, ProjectileId, ShotPattern, ShotPlan, StatusKind,
    SupportGemKind, ZoneId, BASE_POSITION,
};
use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use crate::{
    economy::scaled_payout,
    enemy::{DamageOutcome, Hit},
    projectile::{Projectile, MAX_BOUNCES, PROJECTILE_RADIUS},
    status::StatusApplication,
    support::{DRONE_DAMAGE, DRONE_SPEED},
    synergy::{self, Fired},
    zone::{Impact, Zone, ZonePulse, ZoneTrigger, FIELD_PULSE_FACTOR},
    World,
};

/// Effects resolved per drain before the rest of the cascade is dropped.
pub(crate) const MAX_EFFECTS_PER_TICK: usize = 512;
/// Share of projectile damage dealt by the terminal burst of area gems.
pub(crate) const SPLASH_FACTOR: f32 = 0.5;
/// Shards released by a shattering enemy.
pub(crate) const SHARD_COUNT: u32 = 8;
pub(crate) const SHARD_SPEED: f32 = 7.0;
/// Share of a frozen enemy's maximum health carried by each of its shards.
pub(crate) const SHATTER_RATIO: f32 = 0.2;
/// Share of a superconduct magnitude carried by each shard.
pub(crate) const SUPERCONDUCT_SHARD_FACTOR: f32 = 0.5;
/// Trap radius used when the firing gem carries none.
pub(crate) const DEFAULT_TRAP_RADIUS: f32 = 25.0;
/// Distance between neighbouring meteor impacts and traps of one volley.
const VOLLEY_OFFSET: f32 = 30.0;

/// Deferred consequence of a hit or reaction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    /// Damage and/or a status applied to every enemy in a circle.
    Burst {
        origin: Vec2,
        radius: f32,
        damage: f32,
        source: DamageSource,
        critical: bool,
        status: Option<StatusApplication>,
        /// Enemy excluded entirely.
        skip: Option<EnemyId>,
        /// Enemies that receive the status but no damage.
        spare: Vec<EnemyId>,
        /// Caps the enemies reached, nearest first.
        max_targets: Option<usize>,
        knockback: f32,
    },
    /// Damage dealt to one enemy.
    Single {
        enemy: EnemyId,
        damage: f32,
        source: DamageSource,
    },
    /// Radial ring of ice shards.
    Shatter {
        origin: Vec2,
        damage: f32,
        exclude: EnemyId,
    },
    /// Lingering field pulsing damage and a status.
    Field {
        origin: Vec2,
        damage: f32,
        status: StatusKind,
    },
}

/// Every template a regular enemy may drop.
const LOOT_TABLE: [ItemTemplate; 27] = [
    ItemTemplate::ActiveGem(ActiveGemKind::Spark),
    ItemTemplate::ActiveGem(ActiveGemKind::Ember),
    ItemTemplate::ActiveGem(ActiveGemKind::Frost),
    ItemTemplate::ActiveGem(ActiveGemKind::Venom),
    ItemTemplate::ActiveGem(ActiveGemKind::Thorn),
    ItemTemplate::ActiveGem(ActiveGemKind::Tide),
    ItemTemplate::ActiveGem(ActiveGemKind::Volt),
    ItemTemplate::ActiveGem(ActiveGemKind::Mind),
    ItemTemplate::ActiveGem(ActiveGemKind::Meteor),
    ItemTemplate::ActiveGem(ActiveGemKind::Snare),
    ItemTemplate::SupportGem(SupportGemKind::Multishot),
    ItemTemplate::SupportGem(SupportGemKind::Pierce),
    ItemTemplate::SupportGem(SupportGemKind::Chain),
    ItemTemplate::SupportGem(SupportGemKind::Haste),
    ItemTemplate::SupportGem(SupportGemKind::Brutality),
    ItemTemplate::SupportGem(SupportGemKind::Concentrate),
    ItemTemplate::SupportGem(SupportGemKind::Overcharge),
    ItemTemplate::Artifact(ArtifactKind::SharpLens),
    ItemTemplate::Artifact(ArtifactKind::HunterMark),
    ItemTemplate::Artifact(ArtifactKind::Longbow),
    ItemTemplate::Artifact(ArtifactKind::Prism),
    ItemTemplate::Artifact(ArtifactKind::SeekerCore),
    ItemTemplate::Artifact(ArtifactKind::RubberCoil),
    ItemTemplate::Artifact(ArtifactKind::VampireFang),
    ItemTemplate::Artifact(ArtifactKind::Capacitor),
    ItemTemplate::Artifact(ArtifactKind::BastionPlate),
    ItemTemplate::Artifact(ArtifactKind::ChainLink),
];

/// Offset of the `index`-th entity of a volley: centre first, then alternating sides.
fn volley_offset(index: u32) -> f32 {
    if index == 0 {
        return 0.0;
    }
    let ring = ((index + 1) / 2) as f32;
    if index % 2 == 1 {
        -ring
    } else {
        ring
    }
}

impl World {
    /// Runs one fixed tick of the simulation.
    pub(crate) fn advance_tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index += 1;
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        if self.economy.tick(&self.stats) {
            debug!("shield depleted");
            out_events.push(Event::ShieldDepleted);
            out_events.push(Event::ShieldChanged { active: false });
        }
        self.tick_crew(out_events);
        self.tick_statuses(out_events);
        self.move_enemies(out_events);
        self.move_projectiles(out_events);
        self.land_impacts();
        self.pulse_zones();
        self.fire_drones();
        self.drain_effects(out_events);
        self.collect_payouts(out_events);
        self.drain_effects(out_events);
        // Cascades from the second drain pay out next tick.
        self.collect_payouts(out_events);

        self.enemies.retain(|enemy| enemy.is_active());
        self.projectiles.retain(|projectile| projectile.alive);
        self.impacts.retain(|impact| !impact.landed);
        self.zones.retain(|zone| zone.alive);

        if self.stats_dirty {
            self.recompute_stats(out_events);
        }
        self.check_defeat(out_events);
    }

    fn tick_crew(&mut self, out_events: &mut Vec<Event>) {
        for cooldown in self.cooldowns.values_mut() {
            *cooldown = cooldown.saturating_sub(1);
        }

        let mut expired = Vec::new();
        for buff in &mut self.active_buffs {
            buff.remaining_ticks = buff.remaining_ticks.saturating_sub(1);
            if buff.remaining_ticks == 0 {
                expired.push(buff.crew);
            }
        }
        self.active_buffs.retain(|buff| buff.remaining_ticks > 0);
        for crew in expired {
            debug!(?crew, "crew ability expired");
            out_events.push(Event::CrewAbilityExpired { crew });
            self.stats_dirty = true;
        }
    }

    fn tick_statuses(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.enemies.len() {
            if !self.enemies[index].is_active() {
                continue;
            }
            let due = self.enemies[index].tick_statuses();
            let factor = self.stats.dot_multiplier;
            for (amount, kind) in [
                (due.burn, StatusKind::Burn),
                (due.poison, StatusKind::Poison),
                (due.leech, StatusKind::Leech),
            ] {
                if amount <= 0.0 {
                    continue;
                }
                let amount = amount * factor;
                let hit = Hit::new(amount, false, DamageSource::Dot(kind));
                let landed = self.strike(index, Some(hit), None, out_events);
                if kind == StatusKind::Leech && landed.is_some() {
                    self.heal_base(amount);
                }
            }
        }
    }

    fn move_enemies(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.enemies.len() {
            let enemy = &self.enemies[index];
            if !enemy.is_active() {
                continue;
            }

            if enemy.is_confused() && enemy.tier == EnemyTier::Common {
                let position = enemy.position;
                let prey = self
                    .enemies
                    .iter()
                    .enumerate()
                    .filter(|(other, candidate)| {
                        *other != index && candidate.is_active() && !candidate.is_confused()
                    })
                    .min_by(|(_, a), (_, b)| {
                        a.position
                            .distance_squared(position)
                            .total_cmp(&b.position.distance_squared(position))
                    })
                    .map(|(other, candidate)| (other, candidate.position, candidate.radius));

                if let Some((prey_index, prey_position, prey_radius)) = prey {
                    if self.enemies[index].hunt(prey_position, prey_radius) {
                        let blow = self.enemies[index].contact_damage;
                        let hit = Hit::new(blow, false, DamageSource::Confusion);
                        let _ = self.strike(prey_index, Some(hit), None, out_events);
                    }
                    continue;
                }
            }

            let attacks = self.enemies[index].advance();
            let enemy = &self.enemies[index];
            let contact = enemy.contact_damage;
            if attacks {
                debug!(enemy = enemy.id.get(), "boss attacks the base");
                self.damage_base(contact, out_events);
            } else if enemy.breached {
                out_events.push(Event::EnemyBreached {
                    enemy: enemy.id,
                    tier: enemy.tier,
                });
                self.damage_base(contact, out_events);
            }
        }
    }

    fn move_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let count = self.projectiles.len();
        for index in 0..count {
            let projectile = &self.projectiles[index];
            let aim = projectile
                .target
                .filter(|_| projectile.homing)
                .and_then(|target| self.enemy_index(target))
                .map(|enemy| self.enemies[enemy].position);
            self.projectiles[index].advance(aim);

            let projectile = &self.projectiles[index];
            if !projectile.alive {
                continue;
            }
            let victim = self.enemies.iter().position(|enemy| {
                enemy.is_active()
                    && !projectile.has_hit(enemy.id)
                    && enemy.position.distance(projectile.position)
                        <= enemy.radius + PROJECTILE_RADIUS
            });
            if let Some(victim) = victim {
                self.resolve_hit(index, victim, out_events);
            }
        }
    }

    /// Applies a projectile to the enemy it touched, then pierces, chains or bursts.
    fn resolve_hit(&mut self, projectile: usize, victim: usize, out_events: &mut Vec<Event>) {
        let enemy = self.enemies[victim].id;
        self.projectiles[projectile].record_hit(enemy);

        let shot = &self.projectiles[projectile];
        let hit = Hit::new(shot.damage, shot.critical, shot.source);
        let power = shot.raw_damage * (1.0 + self.stats.status_power_pct);
        let level = shot.status_level;
        let on_hit = match shot.source {
            DamageSource::Hit(element) => element
                .status()
                .filter(|kind| *kind != StatusKind::Freeze)
                .map(|kind| StatusApplication::new(kind, power, level)),
            _ => None,
        };

        if self.strike(victim, Some(hit), on_hit, out_events).is_some() {
            self.heal_base(self.stats.life_on_hit);
        }

        let shot = &mut self.projectiles[projectile];
        if shot.pierce > 0 {
            shot.pierce -= 1;
            return;
        }
        shot.alive = false;

        let shot = &self.projectiles[projectile];
        let origin = shot.position;
        if shot.chain > 0 {
            let next = self
                .enemies
                .iter()
                .filter(|candidate| candidate.is_active() && !shot.has_hit(candidate.id))
                .map(|candidate| (candidate, candidate.position.distance(origin)))
                .filter(|(_, distance)| *distance <= shot.chain_range)
                .min_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(candidate, _)| (candidate.id, candidate.position));
            if let Some((target, aim)) = next {
                self.next_projectile += 1;
                let id = ProjectileId::new(self.next_projectile);
                let child = shot.chained(id, origin, target, aim);
                debug!(target = target.get(), chain = child.chain, "projectile chained");
                self.projectiles.push(child);
                return;
            }
        }

        if let Some(radius) = shot.area_radius {
            let status = match shot.source {
                DamageSource::Hit(element) => element
                    .status()
                    .map(|kind| StatusApplication::new(kind, power, level)),
                _ => None,
            };
            self.effects.push_back(Effect::Burst {
                origin,
                radius,
                damage: shot.damage * SPLASH_FACTOR,
                source: shot.source,
                critical: shot.critical,
                status,
                skip: None,
                spare: shot.hit.clone(),
                max_targets: None,
                knockback: 0.0,
            });
        }
    }

    fn land_impacts(&mut self) {
        for index in 0..self.impacts.len() {
            if !self.impacts[index].advance() {
                continue;
            }
            let impact = &self.impacts[index];
            let power = impact.raw_damage * (1.0 + self.stats.status_power_pct);
            let status = impact
                .element
                .status()
                .map(|kind| StatusApplication::new(kind, power, impact.level));
            self.effects.push_back(Effect::Burst {
                origin: impact.position,
                radius: impact.radius,
                damage: impact.damage,
                source: DamageSource::Hit(impact.element),
                critical: impact.critical,
                status,
                skip: None,
                spare: Vec::new(),
                max_targets: None,
                knockback: 0.0,
            });
        }
    }

    fn pulse_zones(&mut self) {
        for index in 0..self.zones.len() {
            let pulse = self.zones[index].advance();
            let zone = &self.zones[index];
            match zone.trigger {
                ZoneTrigger::Periodic => {
                    if pulse == ZonePulse::Idle {
                        continue;
                    }
                    self.effects.push_back(Effect::Burst {
                        origin: zone.position,
                        radius: zone.radius,
                        damage: zone.damage * self.stats.dot_multiplier,
                        source: DamageSource::Zone,
                        critical: false,
                        status: zone
                            .status
                            .map(|kind| StatusApplication::new(kind, zone.damage, zone.level)),
                        skip: None,
                        spare: Vec::new(),
                        max_targets: None,
                        knockback: 0.0,
                    });
                }
                ZoneTrigger::OnContact => {
                    if !zone.alive {
                        continue;
                    }
                    let touched = self
                        .enemies
                        .iter()
                        .any(|enemy| enemy.is_active() && zone.contains(enemy.position, enemy.radius));
                    if !touched {
                        continue;
                    }
                    debug!(zone = zone.id.get(), "trap triggered");
                    self.effects.push_back(Effect::Burst {
                        origin: zone.position,
                        radius: zone.radius,
                        damage: zone.damage,
                        source: DamageSource::Hit(Element::Physical),
                        critical: false,
                        status: zone
                            .status
                            .map(|kind| StatusApplication::new(kind, zone.damage, zone.level)),
                        skip: None,
                        spare: Vec::new(),
                        max_targets: None,
                        knockback: 0.0,
                    });
                    self.zones[index].alive = false;
                }
            }
        }
    }

    fn fire_drones(&mut self) {
        let ready = self.drones.tick();
        if ready.is_empty() {
            return;
        }

        let damage = DRONE_DAMAGE * (1.0 + self.stats.support_damage_pct);
        for origin in ready {
            let target = self
                .enemies
                .iter()
                .filter(|enemy| enemy.is_active())
                .min_by(|a, b| {
                    a.position
                        .distance_squared(origin)
                        .total_cmp(&b.position.distance_squared(origin))
                })
                .map(|enemy| (enemy.id, enemy.position));
            let Some((target, aim)) = target else {
                continue;
            };
            self.next_projectile += 1;
            let mut shot = Projectile::basic(
                ProjectileId::new(self.next_projectile),
                origin,
                (aim - origin).normalize_or_zero() * DRONE_SPEED,
                damage,
                Element::Physical,
                DamageSource::SupportUnit,
            );
            shot.target = Some(target);
            shot.homing = true;
            self.projectiles.push(shot);
        }
    }

    /// Damages and/or afflicts one enemy, queueing the reactions it sets off.
    fn strike(
        &mut self,
        index: usize,
        hit: Option<Hit>,
        status: Option<StatusApplication>,
        out_events: &mut Vec<Event>,
    ) -> Option<DamageOutcome> {
        let mut fired = Vec::new();
        let enemy = self.enemies.get_mut(index)?;
        let outcome =
            hit.and_then(|hit| enemy.take_damage(hit, &self.stats, &mut self.rng, out_events));
        if let Some(blow) = outcome.filter(|blow| blow.killed) {
            debug!(enemy = enemy.id.get(), dealt = blow.dealt, "killing blow");
        }
        if let Some(status) = status {
            enemy.apply_status(status, &mut self.rng, out_events, &mut fired);
        }
        let (id, origin) = (enemy.id, enemy.position);
        self.queue_reactions(id, origin, &fired);
        outcome
    }

    fn queue_reactions(&mut self, enemy: EnemyId, origin: Vec2, fired: &[Fired]) {
        for reaction in fired {
            let shape = synergy::reaction(reaction.synergy);
            let source = DamageSource::Synergy(reaction.synergy);
            let magnitude = reaction.magnitude;

            if shape.target_factor > 0.0 {
                self.effects.push_back(Effect::Single {
                    enemy,
                    damage: magnitude * shape.target_factor,
                    source,
                });
            }
            if shape.radius > 0.0 {
                self.effects.push_back(Effect::Burst {
                    origin,
                    radius: shape.radius,
                    damage: magnitude * shape.burst_factor,
                    source,
                    critical: false,
                    status: shape
                        .spread
                        .map(|kind| StatusApplication::new(kind, magnitude, 1)),
                    skip: shape.spread.map(|_| enemy),
                    spare: Vec::new(),
                    max_targets: shape.max_targets,
                    knockback: shape.knockback,
                });
            }
            if let Some(status) = shape.zone {
                self.effects.push_back(Effect::Field {
                    origin,
                    damage: magnitude * FIELD_PULSE_FACTOR,
                    status,
                });
            }
            if shape.shatter {
                self.effects.push_back(Effect::Shatter {
                    origin,
                    damage: magnitude * SUPERCONDUCT_SHARD_FACTOR,
                    exclude: enemy,
                });
            }
        }
    }

    fn drain_effects(&mut self, out_events: &mut Vec<Event>) {
        let mut processed = 0;
        while let Some(effect) = self.effects.pop_front() {
            if processed == MAX_EFFECTS_PER_TICK {
                warn!(
                    dropped = self.effects.len() + 1,
                    tick = self.tick_index,
                    "effect budget exhausted"
                );
                self.effects.clear();
                return;
            }
            processed += 1;

            match effect {
                Effect::Burst {
                    origin,
                    radius,
                    damage,
                    source,
                    critical,
                    status,
                    skip,
                    spare,
                    max_targets,
                    knockback,
                } => {
                    let mut reached: Vec<(usize, f32)> = self
                        .enemies
                        .iter()
                        .enumerate()
                        .filter(|(_, enemy)| enemy.is_active() && Some(enemy.id) != skip)
                        .map(|(index, enemy)| (index, enemy.position.distance(origin) - enemy.radius))
                        .filter(|(_, gap)| *gap <= radius)
                        .collect();
                    reached.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
                    if let Some(limit) = max_targets {
                        reached.truncate(limit);
                    }

                    for (index, _) in reached {
                        let spared = spare.contains(&self.enemies[index].id);
                        let hit = (!spared && damage > 0.0)
                            .then(|| Hit::new(damage, critical, source));
                        let _ = self.strike(index, hit, status, out_events);

                        let enemy = &mut self.enemies[index];
                        if knockback > 0.0
                            && enemy.is_active()
                            && enemy.tier != EnemyTier::Boss
                            && !enemy.is_frozen()
                        {
                            enemy.position.y -= knockback;
                        }
                    }
                }
                Effect::Single {
                    enemy,
                    damage,
                    source,
                } => {
                    if let Some(index) = self.enemy_index(enemy) {
                        let hit = Hit::new(damage, false, source);
                        let _ = self.strike(index, Some(hit), None, out_events);
                    }
                }
                Effect::Shatter {
                    origin,
                    damage,
                    exclude,
                } => {
                    for shard in 0..SHARD_COUNT {
                        let angle = std::f32::consts::TAU * shard as f32 / SHARD_COUNT as f32;
                        self.next_projectile += 1;
                        let mut projectile = Projectile::basic(
                            ProjectileId::new(self.next_projectile),
                            origin,
                            Vec2::from_angle(angle) * SHARD_SPEED,
                            damage,
                            Element::Ice,
                            DamageSource::Shard,
                        );
                        projectile.record_hit(exclude);
                        self.projectiles.push(projectile);
                    }
                }
                Effect::Field {
                    origin,
                    damage,
                    status,
                } => {
                    self.next_zone += 1;
                    let zone = ZoneId::new(self.next_zone);
                    self.zones.push(Zone::field(zone, origin, damage, status));
                    out_events.push(Event::ZoneSpawned { zone });
                }
            }
        }
    }

    fn collect_payouts(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.enemies.len() {
            let enemy = &mut self.enemies[index];
            if !enemy.dead || enemy.paid {
                continue;
            }
            enemy.paid = true;
            let (id, tier, origin) = (enemy.id, enemy.tier, enemy.position);
            let shatter = enemy.frozen_at_death.then_some(enemy.max_health * SHATTER_RATIO);

            let profile = tier.profile();
            let xp = scaled_payout(profile.xp, self.stats.xp_gain_pct);
            let gold = scaled_payout(profile.gold, self.stats.gold_gain_pct);
            self.economy.gold = self.economy.gold.saturating_add(gold);
            out_events.push(Event::EnemyKilled {
                enemy: id,
                tier,
                xp,
                gold,
            });

            let levels = self.economy.gain_xp(xp);
            self.grant_levels(levels, out_events);

            if self.rng.gen::<f32>() < profile.loot_chance {
                let template = if tier == EnemyTier::Boss {
                    let relics = BossArtifactKind::ALL;
                    ItemTemplate::BossArtifact(relics[self.rng.gen_range(0..relics.len())])
                } else {
                    LOOT_TABLE[self.rng.gen_range(0..LOOT_TABLE.len())]
                };
                debug!(?template, "loot dropped");
                let _ = self.grant_item(template, out_events);
            }

            if let Some(damage) = shatter {
                self.effects.push_back(Effect::Shatter {
                    origin,
                    damage,
                    exclude: id,
                });
            }

            self.kills_this_wave += 1;
            self.total_kills += 1;
            self.stats_dirty = true;
        }
    }

    /// Spawns the entities of a resolved volley aimed at `target`.
    ///
    /// The self-damage cost is charged first, so a lethal cost still fires.
    pub(crate) fn fire_weapon(
        &mut self,
        loadout: Loadout,
        target: EnemyId,
        plan: &ShotPlan,
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self.enemy_index(target) else {
            return;
        };
        let aim = self.enemies[index].position;

        let cost = plan.self_damage_flat + plan.self_damage_pct * self.health.max(0.0);
        self.pay_health(cost, out_events);

        let origin = BASE_POSITION;
        let mut spawned = 0;
        match plan.pattern {
            ShotPattern::Spread {
                count,
                step_radians,
            } => {
                let direction = (aim - origin).normalize_or_zero();
                for shot in 0..count.max(1) {
                    let rotation = Vec2::from_angle(volley_offset(shot) * step_radians);
                    let critical =
                        plan.crit_chance > 0.0 && self.rng.gen::<f32>() < plan.crit_chance;
                    let damage = if critical {
                        plan.damage * plan.crit_multiplier
                    } else {
                        plan.damage
                    };

                    self.next_projectile += 1;
                    let mut projectile = Projectile::basic(
                        ProjectileId::new(self.next_projectile),
                        origin,
                        rotation.rotate(direction) * plan.speed,
                        damage,
                        plan.element,
                        DamageSource::Hit(plan.element),
                    );
                    projectile.target = Some(target);
                    projectile.raw_damage = plan.raw_damage;
                    projectile.critical = critical;
                    projectile.pierce = plan.pierce;
                    projectile.chain = plan.chain;
                    projectile.chain_range = plan.chain_range;
                    projectile.area_radius = plan.area_radius;
                    projectile.status_level = plan.status_level;
                    projectile.homing = plan.homing;
                    projectile.bounces_left = if plan.bounce { MAX_BOUNCES } else { 0 };
                    self.projectiles.push(projectile);
                    spawned += 1;
                }
            }
            ShotPattern::Meteor { count, delay_ticks } => {
                for shot in 0..count.max(1) {
                    let critical =
                        plan.crit_chance > 0.0 && self.rng.gen::<f32>() < plan.crit_chance;
                    let damage = if critical {
                        plan.damage * plan.crit_multiplier
                    } else {
                        plan.damage
                    };
                    self.impacts.push(Impact {
                        position: aim + Vec2::new(volley_offset(shot) * VOLLEY_OFFSET, 0.0),
                        radius: plan.area_radius.unwrap_or(DEFAULT_TRAP_RADIUS),
                        remaining: delay_ticks.max(1),
                        damage,
                        raw_damage: plan.raw_damage,
                        critical,
                        element: plan.element,
                        level: plan.status_level,
                        landed: false,
                    });
                    spawned += 1;
                }
            }
            ShotPattern::Trap { count } => {
                for shot in 0..count.max(1) {
                    self.next_zone += 1;
                    let zone = ZoneId::new(self.next_zone);
                    self.zones.push(Zone::trap(
                        zone,
                        aim + Vec2::new(volley_offset(shot) * VOLLEY_OFFSET, 0.0),
                        plan.area_radius.unwrap_or(DEFAULT_TRAP_RADIUS),
                        plan.damage,
                        plan.status_level,
                    ));
                    out_events.push(Event::ZoneSpawned { zone });
                    spawned += 1;
                }
            }
        }

        debug!(?loadout, gem = ?plan.gem, spawned, "weapon fired");
        out_events.push(Event::ShotFired { loadout, spawned });
        self.check_defeat(out_events);
    }
}
