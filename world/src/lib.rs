#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gem Defence.
//!
//! The world owns every piece of mutable simulation state: enemies,
//! projectiles, zones, drones, the inventory, skill allocations, crew and the
//! shared health, energy and gold pools. All mutation flows through
//! [`apply`]; read access goes through the [`query`] module.

mod combat;
mod economy;
mod enemy;
mod equipment;
mod projectile;
mod skill_tree;
mod status;
mod support;
mod synergy;
mod zone;

use std::collections::{BTreeMap, VecDeque};

use gem_defence_core::{
    catalog::{AbilityEffect, MAX_CREW},
    CombatStats, Command, CommandError, CrewKind, EnemyId, Event, ItemTemplate, RewardChoice,
    RewardOffer, RunOutcome, StatDelta, WavePhase, ARENA_WIDTH, SPAWN_Y,
};
use gem_defence_system_stat_aggregation::{StatAggregator, StatSources};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{
    combat::Effect,
    economy::Economy,
    enemy::Enemy,
    equipment::{Acquired, Equipment},
    projectile::Projectile,
    skill_tree::SkillAllocations,
    support::SupportWing,
    zone::{Impact, Zone},
};

/// Seed used by [`World::new`].
pub const DEFAULT_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// Settings a world is created from and returns to on reset.
#[derive(Clone, Debug, PartialEq)]
pub struct Bootstrap {
    /// Seed the world's random rolls derive from.
    pub seed: u64,
    /// Gold available before the first wave.
    pub starting_gold: u32,
    /// Bonus stats present from the first tick.
    pub bonus_stats: Vec<StatDelta>,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            starting_gold: economy::STARTING_GOLD,
            bonus_stats: Vec::new(),
        }
    }
}

/// Crew ability whose timed effect is still running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveBuff {
    /// Crew member whose ability is active.
    pub crew: CrewKind,
    /// Ticks until the effect expires.
    pub remaining_ticks: u32,
}

/// Represents the authoritative Gem Defence world state.
#[derive(Debug)]
pub struct World {
    bootstrap: Bootstrap,
    rng: ChaCha8Rng,
    tick_index: u64,
    health: f32,
    stats: CombatStats,
    aggregator: StatAggregator,
    stats_dirty: bool,
    bonus_stats: Vec<StatDelta>,
    equipment: Equipment,
    skills: SkillAllocations,
    economy: Economy,
    crew: Vec<CrewKind>,
    cooldowns: BTreeMap<CrewKind, u32>,
    active_buffs: Vec<ActiveBuff>,
    drones: SupportWing,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    impacts: Vec<Impact>,
    zones: Vec<Zone>,
    effects: VecDeque<Effect>,
    next_enemy: u32,
    next_projectile: u32,
    next_zone: u32,
    manual_target: Option<EnemyId>,
    wave: u32,
    wave_phase: WavePhase,
    kills_this_wave: u32,
    total_kills: u32,
    offers: VecDeque<RewardOffer>,
    outcome: Option<RunOutcome>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new Gem Defence world using [`DEFAULT_SEED`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Creates a new world whose random rolls derive from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_bootstrap(Bootstrap {
            seed,
            ..Bootstrap::default()
        })
    }

    /// Creates a new world from explicit bootstrap settings.
    #[must_use]
    pub fn from_bootstrap(bootstrap: Bootstrap) -> Self {
        let aggregator = StatAggregator::new();
        let skills = SkillAllocations::default();
        let ranks = skills.ranks();
        let stats = aggregator.recompute(&StatSources {
            bonus_stats: &bootstrap.bonus_stats,
            skill_ranks: &ranks,
            gold: bootstrap.starting_gold,
            ..StatSources::default()
        });
        Self {
            rng: ChaCha8Rng::seed_from_u64(bootstrap.seed),
            tick_index: 0,
            health: stats.max_health(),
            stats,
            aggregator,
            stats_dirty: false,
            bonus_stats: bootstrap.bonus_stats.clone(),
            equipment: Equipment::default(),
            skills,
            economy: Economy {
                gold: bootstrap.starting_gold,
                ..Economy::default()
            },
            crew: Vec::new(),
            cooldowns: BTreeMap::new(),
            active_buffs: Vec::new(),
            drones: SupportWing::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            impacts: Vec::new(),
            zones: Vec::new(),
            effects: VecDeque::new(),
            next_enemy: 0,
            next_projectile: 0,
            next_zone: 0,
            manual_target: None,
            wave: 0,
            wave_phase: WavePhase::Normal,
            kills_this_wave: 0,
            total_kills: 0,
            offers: VecDeque::new(),
            outcome: None,
            bootstrap,
        }
    }

    /// Folds every stat source into fresh combat stats.
    ///
    /// Health is clamped when the maximum shrank.
    fn recompute_stats(&mut self, out_events: &mut Vec<Event>) {
        let ranks = self.skills.ranks();
        let artifacts = self.equipment.artifacts();
        let relics = self.equipment.boss_artifacts();
        let buffs: Vec<CrewKind> = self.active_buffs.iter().map(|buff| buff.crew).collect();
        let stats = self.aggregator.recompute(&StatSources {
            bonus_stats: &self.bonus_stats,
            crew: &self.crew,
            active_buffs: &buffs,
            skill_ranks: &ranks,
            artifacts: &artifacts,
            boss_artifacts: &relics,
            gold: self.economy.gold,
        });
        self.stats_dirty = false;
        self.health = self.health.min(stats.max_health());
        if stats != self.stats {
            self.stats = stats;
            out_events.push(Event::StatsRecomputed);
        }
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies
            .iter()
            .position(|candidate| candidate.id == enemy && candidate.is_active())
    }

    fn damage_base(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        let mut amount = amount.max(0.0) * self.stats.incoming_damage_factor();
        if self.economy.shield_active {
            amount *= 1.0 - economy::SHIELD_ABSORB;
        }
        self.pay_health(amount, out_events);
    }

    /// Subtracts integrity without reductions; used for self-inflicted costs.
    fn pay_health(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        if amount <= 0.0 {
            return;
        }
        self.health -= amount;
        out_events.push(Event::BaseDamaged {
            amount,
            health: self.health,
        });
    }

    fn heal_base(&mut self, amount: f32) {
        if amount > 0.0 && self.health > 0.0 {
            self.health = (self.health + amount).min(self.stats.max_health());
        }
    }

    fn check_defeat(&mut self, out_events: &mut Vec<Event>) {
        if self.health <= 0.0 && self.outcome.is_none() {
            self.outcome = Some(RunOutcome::Defeat);
            info!(wave = self.wave, tick = self.tick_index, "base destroyed");
            out_events.push(Event::RunEnded {
                outcome: RunOutcome::Defeat,
            });
        }
    }

    /// Adds an item to the inventory, reporting the outcome.
    fn grant_item(&mut self, template: ItemTemplate, out_events: &mut Vec<Event>) -> bool {
        match self.equipment.acquire(template, 1) {
            Ok(Acquired::New(item)) => {
                out_events.push(Event::ItemAcquired { item, template });
                true
            }
            Ok(Acquired::Fused { item, level }) => {
                out_events.push(Event::ItemFused { item, level });
                true
            }
            Err(_) => {
                out_events.push(Event::LootDiscarded { template });
                false
            }
        }
    }

    fn push_offer(&mut self, offer: RewardOffer, out_events: &mut Vec<Event>) {
        self.offers.push_back(offer);
        if self.offers.len() == 1 {
            if let Some(front) = self.offers.front() {
                out_events.push(Event::RewardOffered {
                    offer: front.clone(),
                });
            }
        }
    }

    fn sync_drones(&mut self) {
        let permanent: u32 = self.crew.iter().map(|crew| crew.passive_drones()).sum();
        self.drones.sync_permanent(permanent as usize);
    }

    fn execute(&mut self, command: Command, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
        if self.outcome.is_some() && command != Command::Reset {
            return Err(CommandError::RunEnded);
        }

        match command {
            Command::Tick => self.advance_tick(out_events),
            Command::Reset => {
                *self = World::from_bootstrap(self.bootstrap.clone());
                info!("world reset");
            }
            Command::Equip { item, slot } => {
                self.equipment.equip(item, slot)?;
                self.recompute_stats(out_events);
            }
            Command::Unequip { item } => {
                self.equipment.unequip(item)?;
                self.recompute_stats(out_events);
            }
            Command::AllocateSkillNode { node } => {
                let rank = self.skills.allocate(node)?;
                debug!(node = node.get(), rank, "skill node allocated");
                self.recompute_stats(out_events);
            }
            Command::Purchase { template } => {
                let price = template.price();
                if self.economy.gold < price {
                    return Err(CommandError::InsufficientGold {
                        price,
                        gold: self.economy.gold,
                    });
                }
                if !self.equipment.can_accept(template, 1) {
                    return Err(CommandError::InventoryFull);
                }
                self.economy.spend_gold(price)?;
                let _ = self.grant_item(template, out_events);
                self.recompute_stats(out_events);
            }
            Command::SelectCrew { crew } => {
                let mut unique = crew.clone();
                unique.sort();
                unique.dedup();
                if crew.len() > MAX_CREW || unique.len() != crew.len() {
                    return Err(CommandError::InvalidCrew);
                }
                self.active_buffs.retain(|buff| crew.contains(&buff.crew));
                self.crew = crew;
                self.sync_drones();
                self.recompute_stats(out_events);
            }
            Command::ActivateCrewAbility { crew } => self.activate_ability(crew, out_events)?,
            Command::SetShieldState { active } => {
                if active && self.economy.energy <= 0.0 {
                    return Err(CommandError::InsufficientEnergy);
                }
                if self.economy.shield_active != active {
                    self.economy.shield_active = active;
                    out_events.push(Event::ShieldChanged { active });
                }
            }
            Command::DesignateTarget { enemy } => {
                if let Some(enemy) = enemy {
                    if self.enemy_index(enemy).is_none() {
                        return Err(CommandError::UnknownEnemy(enemy));
                    }
                }
                self.manual_target = enemy;
            }
            Command::ChooseReward { index } => self.choose_reward(index, out_events)?,
            Command::SpawnEnemy {
                tier,
                lane_x,
                health_multiplier,
                damage_multiplier,
            } => {
                self.next_enemy += 1;
                let id = EnemyId::new(self.next_enemy);
                let radius = tier.profile().radius;
                let x = lane_x.clamp(radius, ARENA_WIDTH - radius);
                self.enemies.push(Enemy::new(
                    id,
                    tier,
                    Vec2::new(x, SPAWN_Y),
                    health_multiplier,
                    damage_multiplier,
                ));
                out_events.push(Event::EnemySpawned { enemy: id, tier });
            }
            Command::FireWeapon {
                loadout,
                target,
                plan,
            } => self.fire_weapon(loadout, target, &plan, out_events),
            Command::StartWave { wave } => {
                self.wave = wave;
                self.wave_phase = WavePhase::Normal;
                self.kills_this_wave = 0;
                info!(wave, "wave started");
                out_events.push(Event::WaveStarted { wave });
            }
            Command::BeginBossWave { wave } => {
                self.wave_phase = WavePhase::Boss;
                info!(wave, "boss wave started");
                out_events.push(Event::BossWaveStarted { wave });
            }
            Command::CompleteWave { wave } => {
                self.wave_phase = WavePhase::Intermission;
                info!(wave, "wave completed");
                out_events.push(Event::WaveCompleted { wave });
            }
            Command::OfferReward { wave } => {
                let offer = economy::boss_offer(wave, &mut self.rng);
                self.push_offer(offer, out_events);
            }
            Command::DeclareVictory => {
                self.outcome = Some(RunOutcome::Victory);
                info!(wave = self.wave, "run won");
                out_events.push(Event::RunEnded {
                    outcome: RunOutcome::Victory,
                });
            }
        }
        Ok(())
    }

    fn activate_ability(
        &mut self,
        crew: CrewKind,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        if !self.crew.contains(&crew) {
            return Err(CommandError::CrewNotSelected(crew));
        }
        let remaining_ticks = self.cooldowns.get(&crew).copied().unwrap_or(0);
        if remaining_ticks > 0 {
            return Err(CommandError::AbilityOnCooldown { remaining_ticks });
        }

        let ability = crew.ability();
        self.economy.spend_energy(ability.energy_cost)?;
        let _ = self.cooldowns.insert(crew, ability.cooldown_ticks);

        match ability.effect {
            AbilityEffect::Buff(_) => {
                self.active_buffs.retain(|buff| buff.crew != crew);
                self.active_buffs.push(ActiveBuff {
                    crew,
                    remaining_ticks: ability.duration_ticks,
                });
                self.recompute_stats(out_events);
            }
            AbilityEffect::DeployDrone => self.drones.deploy(ability.duration_ticks),
            AbilityEffect::Heal(fraction) => {
                let amount = self.stats.max_health() * fraction;
                self.heal_base(amount);
            }
        }

        debug!(?crew, ability = ability.name, "crew ability activated");
        out_events.push(Event::CrewAbilityActivated { crew });
        Ok(())
    }

    fn choose_reward(&mut self, index: usize, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
        let offer = self.offers.front().ok_or(CommandError::NoPendingOffer)?;
        let choice = *offer
            .choices
            .get(index)
            .ok_or(CommandError::InvalidChoice(index))?;
        let _ = self.offers.pop_front();

        match choice {
            RewardChoice::BonusStat(delta) => self.bonus_stats.push(delta),
            RewardChoice::BossArtifact(kind) => {
                let _ = self.grant_item(ItemTemplate::BossArtifact(kind), out_events);
            }
            RewardChoice::Gold(amount) => {
                self.economy.gold = self.economy.gold.saturating_add(amount);
            }
        }
        out_events.push(Event::RewardChosen { choice });
        self.recompute_stats(out_events);

        if let Some(next) = self.offers.front() {
            out_events.push(Event::RewardOffered {
                offer: next.clone(),
            });
        }
        Ok(())
    }

    fn grant_levels(&mut self, levels: Vec<u32>, out_events: &mut Vec<Event>) {
        for level in levels {
            self.skills.grant(1);
            info!(level, "level up");
            out_events.push(Event::LevelUp { level });
            let offer = economy::level_up_offer(&mut self.rng);
            self.push_offer(offer, out_events);
        }
    }
}

fn is_player_command(command: &Command) -> bool {
    matches!(
        command,
        Command::Reset
            | Command::Equip { .. }
            | Command::Unequip { .. }
            | Command::AllocateSkillNode { .. }
            | Command::Purchase { .. }
            | Command::SelectCrew { .. }
            | Command::ActivateCrewAbility { .. }
            | Command::SetShieldState { .. }
            | Command::DesignateTarget { .. }
            | Command::ChooseReward { .. }
    )
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and push
/// [`Event::CommandRejected`]; accepted player commands push
/// [`Event::StateRefreshed`].
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    let player = is_player_command(&command);
    let result = world.execute(command, out_events);
    match result {
        Ok(()) if player => out_events.push(Event::StateRefreshed),
        Ok(()) => {}
        Err(error) => {
            debug!(%error, "command rejected");
            out_events.push(Event::CommandRejected { error });
        }
    }
    result
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gem_defence_core::{
        CombatStats, CrewKind, EnemyId, EnemySnapshot, EnemyTier, EnemyView, ItemInstance,
        Loadout, LoadoutSnapshot, RewardOffer, RunOutcome, SkillNodeId, Slot, WavePhase,
    };

    use super::{ActiveBuff, World};

    /// Seed the world's random rolls derive from.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.bootstrap.seed
    }

    /// Number of ticks simulated since the last reset.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick_index
    }

    /// Current base integrity.
    #[must_use]
    pub fn health(world: &World) -> f32 {
        world.health
    }

    /// Maximum base integrity.
    #[must_use]
    pub fn max_health(world: &World) -> f32 {
        world.stats.max_health()
    }

    /// Aggregated combat stats.
    #[must_use]
    pub fn stats(world: &World) -> &CombatStats {
        &world.stats
    }

    /// Current energy.
    #[must_use]
    pub fn energy(world: &World) -> f32 {
        world.economy.energy
    }

    /// Whether the shield is raised.
    #[must_use]
    pub fn shield_active(world: &World) -> bool {
        world.economy.shield_active
    }

    /// Gold held.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.economy.gold
    }

    /// Current level.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.economy.level
    }

    /// Experience toward the next level.
    #[must_use]
    pub fn xp(world: &World) -> u32 {
        world.economy.xp
    }

    /// Unspent skill points.
    #[must_use]
    pub fn skill_points(world: &World) -> u32 {
        world.skills.points()
    }

    /// Rank allocated on a node.
    #[must_use]
    pub fn skill_rank(world: &World, node: SkillNodeId) -> u8 {
        world.skills.rank(node)
    }

    /// Allocated ranks in node order.
    #[must_use]
    pub fn skill_ranks(world: &World) -> Vec<(SkillNodeId, u8)> {
        world.skills.ranks()
    }

    /// Captures a read-only view of the living enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.is_active())
                .map(|enemy| enemy.snapshot())
                .collect::<Vec<EnemySnapshot>>(),
        )
    }

    /// Number of living boss tier enemies.
    #[must_use]
    pub fn active_boss_count(world: &World) -> usize {
        world
            .enemies
            .iter()
            .filter(|enemy| enemy.is_active() && enemy.tier == EnemyTier::Boss)
            .count()
    }

    /// Gems equipped in a loadout.
    #[must_use]
    pub fn loadout(world: &World, loadout: Loadout) -> LoadoutSnapshot {
        world.equipment.loadout(loadout)
    }

    /// Both loadouts in firing order.
    #[must_use]
    pub fn loadouts(world: &World) -> Vec<LoadoutSnapshot> {
        Loadout::ALL
            .iter()
            .map(|loadout| world.equipment.loadout(*loadout))
            .collect()
    }

    /// Unequipped items in identity order.
    #[must_use]
    pub fn inventory(world: &World) -> Vec<ItemInstance> {
        world.equipment.inventory()
    }

    /// Equipped items in slot order.
    #[must_use]
    pub fn equipped(world: &World) -> Vec<(Slot, ItemInstance)> {
        world.equipment.equipped()
    }

    /// Selected crew members.
    #[must_use]
    pub fn crew(world: &World) -> &[CrewKind] {
        &world.crew
    }

    /// Ticks until a crew member's ability is ready.
    #[must_use]
    pub fn ability_cooldown(world: &World, crew: CrewKind) -> u32 {
        world.cooldowns.get(&crew).copied().unwrap_or(0)
    }

    /// Timed crew effects still running.
    #[must_use]
    pub fn active_buffs(world: &World) -> &[ActiveBuff] {
        &world.active_buffs
    }

    /// Number of support drones in play.
    #[must_use]
    pub fn drone_count(world: &World) -> usize {
        world.drones.len()
    }

    /// Manually designated target, which may have died since.
    #[must_use]
    pub fn manual_target(world: &World) -> Option<EnemyId> {
        world.manual_target
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectile_count(world: &World) -> usize {
        world.projectiles.len()
    }

    /// Lingering fields and armed traps.
    #[must_use]
    pub fn zone_count(world: &World) -> usize {
        world.zones.len()
    }

    /// Meteor impacts that have not landed yet.
    #[must_use]
    pub fn pending_impacts(world: &World) -> usize {
        world.impacts.len()
    }

    /// Current wave number; zero before the first wave starts.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Phase of the current wave.
    #[must_use]
    pub fn wave_phase(world: &World) -> WavePhase {
        world.wave_phase
    }

    /// Enemies killed since the current wave started.
    #[must_use]
    pub fn kills_this_wave(world: &World) -> u32 {
        world.kills_this_wave
    }

    /// Enemies killed since the last reset.
    #[must_use]
    pub fn total_kills(world: &World) -> u32 {
        world.total_kills
    }

    /// Offer awaiting a choice, if any.
    #[must_use]
    pub fn pending_offer(world: &World) -> Option<&RewardOffer> {
        world.offers.front()
    }

    /// Terminal state, once the run has ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<RunOutcome> {
        world.outcome
    }
}
