#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame driver wiring the world and the pure systems together.
//!
//! Each fixed tick runs in a fixed order: the world tick, target selection on
//! the resulting field, then weapon fire, spawning and progression reacting
//! to the tick's events. Commands those systems emit are applied immediately;
//! the events they produce are delivered to the systems on the following tick.

use std::time::Duration;

use gem_defence_core::{
    Command, CommandError, CrewKind, EnemyId, EnemyView, Event, FixedStep, ItemId, ItemTemplate,
    SkillNodeId, Slot,
};
use gem_defence_system_progression::{self as progression, Progression, ProgressionView};
use gem_defence_system_spawning::{self as spawning, Spawning};
use gem_defence_system_targeting::{ScriptError, StrategyLibrary, TargetSelector};
use gem_defence_system_weapon_fire::WeaponFire;
use gem_defence_world::{self as world, query, Bootstrap, World};
use tracing::{debug, info, warn};

const SPAWN_STREAM_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Configuration parameters required to construct the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    bootstrap: Bootstrap,
    final_wave: u32,
    time_scale: f32,
}

impl Config {
    /// Creates a configuration for a run seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64, final_wave: u32, time_scale: f32) -> Self {
        Self {
            bootstrap: Bootstrap {
                seed,
                ..Bootstrap::default()
            },
            final_wave,
            time_scale,
        }
    }

    /// Replaces the world bootstrap settings, seed included.
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: Bootstrap) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Seed shared by the world and the spawn stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.bootstrap.seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(world::DEFAULT_SEED, progression::FINAL_WAVE, 1.0)
    }
}

/// Owns the world, the systems and the frame clock of one run.
#[derive(Debug)]
pub struct Engine {
    config: Config,
    world: World,
    clock: FixedStep,
    time_scale: f32,
    paused: bool,
    targeting: TargetSelector,
    weapon_fire: WeaponFire,
    spawning: Spawning,
    progression: Progression,
    reported_script_error: Option<ScriptError>,
    pending: Vec<Event>,
    log: Vec<Event>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    /// Creates an engine in the bootstrap state described by `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            world: World::from_bootstrap(config.bootstrap.clone()),
            clock: FixedStep::default(),
            time_scale: config.time_scale,
            paused: false,
            targeting: TargetSelector::new(),
            weapon_fire: WeaponFire::new(),
            spawning: Spawning::new(spawn_config(config.seed())),
            progression: Progression::new(progression::Config::new(config.final_wave)),
            reported_script_error: None,
            pending: Vec::new(),
            log: Vec::new(),
            config,
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether tick advancement is halted.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Flips the pause state and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.clock.reset();
        debug!(paused = self.paused, "pause toggled");
        self.paused
    }

    /// Multiplier applied to frame time before it becomes ticks.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    /// Converts a frame's wall-clock time into ticks and runs them.
    ///
    /// Returns the number of ticks simulated; zero while paused.
    pub fn frame(&mut self, dt: Duration) -> u32 {
        if self.paused {
            return 0;
        }
        let ticks = self.clock.advance(dt, self.time_scale);
        for _ in 0..ticks {
            self.step();
        }
        ticks
    }

    /// Runs exactly one fixed tick. Does nothing once the run has ended.
    pub fn step(&mut self) {
        if query::outcome(&self.world).is_some() {
            return;
        }

        // Carried events were logged when their commands were applied.
        let mut events = std::mem::take(&mut self.pending);
        let carried = events.len();
        let ticked = world::apply(&mut self.world, Command::Tick, &mut events);
        self.log.extend_from_slice(&events[carried..]);
        if ticked.is_err() || query::outcome(&self.world).is_some() {
            return;
        }

        let selection = self.targeting.select(
            &query::enemy_view(&self.world),
            query::manual_target(&self.world),
        );
        self.report_script_error();
        if selection.clear_manual {
            self.dispatch(Command::DesignateTarget { enemy: None });
        }

        let mut commands = Vec::new();
        self.weapon_fire.handle(
            &events,
            &query::loadouts(&self.world),
            query::stats(&self.world),
            selection.target,
            &mut commands,
        );
        self.spawning.handle(
            &events,
            query::wave(&self.world),
            query::wave_phase(&self.world),
            &mut commands,
        );
        self.progression.handle(
            &events,
            ProgressionView {
                wave: query::wave(&self.world),
                phase: query::wave_phase(&self.world),
                active_bosses: query::active_boss_count(&self.world),
            },
            &mut commands,
        );

        for command in commands {
            self.dispatch(command);
        }
    }

    /// Discards the run and recreates the bootstrap state.
    ///
    /// An installed targeting script survives the reset.
    pub fn reset(&mut self) {
        let mut events = Vec::new();
        let _ = world::apply(&mut self.world, Command::Reset, &mut events);
        self.log.append(&mut events);
        self.pending.clear();
        self.clock.reset();
        self.weapon_fire = WeaponFire::new();
        self.spawning = Spawning::new(spawn_config(self.config.seed()));
        self.progression = Progression::new(progression::Config::new(self.config.final_wave));
        self.reported_script_error = None;
        info!(seed = self.config.seed(), "engine reset");
    }

    /// Takes every event produced since the last call, for presentation.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }

    /// Installs a custom targeting script.
    pub fn set_target_script<F>(&mut self, script: F)
    where
        F: FnMut(&EnemyView, &StrategyLibrary) -> Result<Option<EnemyId>, ScriptError>
            + Send
            + 'static,
    {
        self.targeting.set_script(script);
        self.reported_script_error = None;
    }

    /// Removes the custom targeting script.
    pub fn clear_target_script(&mut self) {
        self.targeting.clear_script();
        self.reported_script_error = None;
    }

    /// Moves an owned item into a slot.
    pub fn equip(&mut self, item: ItemId, slot: Slot) -> Result<(), CommandError> {
        self.submit(Command::Equip { item, slot })
    }

    /// Returns an equipped item to the inventory.
    pub fn unequip(&mut self, item: ItemId) -> Result<(), CommandError> {
        self.submit(Command::Unequip { item })
    }

    /// Spends a skill point on `node`.
    pub fn allocate_skill_node(&mut self, node: SkillNodeId) -> Result<(), CommandError> {
        self.submit(Command::AllocateSkillNode { node })
    }

    /// Buys a new instance of `template`.
    pub fn purchase(&mut self, template: ItemTemplate) -> Result<(), CommandError> {
        self.submit(Command::Purchase { template })
    }

    /// Replaces the selected crew.
    pub fn select_crew(&mut self, crew: Vec<CrewKind>) -> Result<(), CommandError> {
        self.submit(Command::SelectCrew { crew })
    }

    /// Triggers a crew member's active ability.
    pub fn activate_crew_ability(&mut self, crew: CrewKind) -> Result<(), CommandError> {
        self.submit(Command::ActivateCrewAbility { crew })
    }

    /// Raises or lowers the shield.
    pub fn set_shield_state(&mut self, active: bool) -> Result<(), CommandError> {
        self.submit(Command::SetShieldState { active })
    }

    /// Sets or clears the manual attack target.
    pub fn designate_target(&mut self, enemy: Option<EnemyId>) -> Result<(), CommandError> {
        self.submit(Command::DesignateTarget { enemy })
    }

    /// Resolves the pending reward offer.
    pub fn choose_reward(&mut self, index: usize) -> Result<(), CommandError> {
        self.submit(Command::ChooseReward { index })
    }

    fn submit(&mut self, command: Command) -> Result<(), CommandError> {
        let mut events = Vec::new();
        let result = world::apply(&mut self.world, command, &mut events);
        self.log.extend(events.iter().cloned());
        self.pending.append(&mut events);
        result
    }

    fn dispatch(&mut self, command: Command) {
        if let Err(error) = self.submit(command) {
            debug!(%error, "system command rejected");
        }
    }

    fn report_script_error(&mut self) {
        let current = self.targeting.last_error();
        if current == self.reported_script_error.as_ref() {
            return;
        }
        if let Some(error) = current {
            warn!(%error, "targeting script failed; falling back to nearest enemy");
        }
        self.reported_script_error = current.cloned();
    }
}

fn spawn_config(seed: u64) -> spawning::Config {
    spawning::Config::new(seed.rotate_left(17) ^ SPAWN_STREAM_SALT)
}
