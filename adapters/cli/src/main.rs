#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Gem Defence simulation.

mod config;

use std::{collections::VecDeque, fmt, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gem_defence_core::{
    Event, ItemId, ItemTemplate, Loadout, RunOutcome, Slot, WavePhase, TICK_DURATION,
    TICKS_PER_SECOND,
};
use gem_defence_engine::{Config, Engine};
use gem_defence_world::query;
use tracing::{info, warn};
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

use crate::config::{LoadoutConfig, SimulationConfig};

const DEFAULT_LOG_FILTER: &str = "gem_defence=info";

#[derive(Debug, Parser)]
#[command(name = "gem-defence")]
#[command(about = "Runs a headless Gem Defence simulation and prints a summary")]
#[command(version)]
struct Cli {
    /// Path to a TOML simulation config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated wall-clock seconds
    #[arg(long)]
    seconds: Option<f32>,

    /// Seed for every random roll
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation speed multiplier
    #[arg(long)]
    time_scale: Option<f32>,
}

/// Entry point for the Gem Defence command-line interface.
fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seconds) = cli.seconds {
        config.seconds = seconds;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(time_scale) = cli.time_scale {
        config.time_scale = time_scale;
    }

    let summary = run(&config)?;
    println!("{summary}");
    Ok(())
}

/// Tallies gathered while the run was simulated.
#[derive(Debug, Default)]
struct Summary {
    ticks: u64,
    wave: u32,
    phase: Option<WavePhase>,
    kills: u32,
    shots: u32,
    synergies: u32,
    breaches: u32,
    gold: u32,
    level: u32,
    health: f32,
    max_health: f32,
    outcome: Option<RunOutcome>,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::ShotFired { .. } => self.shots += 1,
            Event::SynergyTriggered { .. } => self.synergies += 1,
            Event::EnemyBreached { .. } => self.breaches += 1,
            _ => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(RunOutcome::Victory) => "victory",
            Some(RunOutcome::Defeat) => "defeat",
            None => "in progress",
        };
        writeln!(f, "outcome: {outcome}")?;
        match self.phase {
            Some(phase) => writeln!(f, "wave: {} ({phase:?})", self.wave)?,
            None => writeln!(f, "wave: {}", self.wave)?,
        }
        writeln!(
            f,
            "time: {:.1}s ({} ticks)",
            self.ticks as f32 / TICKS_PER_SECOND as f32,
            self.ticks
        )?;
        writeln!(f, "kills: {}", self.kills)?;
        writeln!(f, "shots: {}", self.shots)?;
        writeln!(f, "synergies: {}", self.synergies)?;
        writeln!(f, "breaches: {}", self.breaches)?;
        writeln!(f, "gold: {}", self.gold)?;
        writeln!(f, "level: {}", self.level)?;
        write!(f, "integrity: {:.1}/{:.1}", self.health, self.max_health)
    }
}

fn run(config: &SimulationConfig) -> Result<Summary> {
    let mut engine = Engine::new(
        Config::new(config.seed, config.final_wave, config.time_scale)
            .with_bootstrap(config.bootstrap()),
    );

    if !config.crew.is_empty() {
        engine
            .select_crew(config.crew.clone())
            .context("failed to select crew")?;
    }
    outfit(&mut engine, Loadout::Main, &config.main)?;
    outfit(&mut engine, Loadout::Alternate, &config.alternate)?;
    if config.shield {
        engine
            .set_shield_state(true)
            .context("failed to raise the shield")?;
    }

    let mut summary = Summary::default();
    let mut skill_plan: VecDeque<_> = config.skill_plan().into();
    let frames = (config.seconds.max(0.0) * TICKS_PER_SECOND as f32).round() as u64;
    info!(seed = config.seed, frames, "simulation started");

    for _ in 0..frames {
        let _ = engine.frame(TICK_DURATION);
        for event in engine.drain_events() {
            summary.record(&event);
        }

        while query::skill_points(engine.world()) > 0 {
            let Some(node) = skill_plan.pop_front() else {
                break;
            };
            if let Err(error) = engine.allocate_skill_node(node) {
                warn!(%error, node = node.get(), "skipping planned skill node");
            }
        }

        if query::pending_offer(engine.world()).is_some() {
            engine
                .choose_reward(0)
                .context("failed to claim the pending reward")?;
        }

        if query::outcome(engine.world()).is_some() {
            break;
        }
    }
    for event in engine.drain_events() {
        summary.record(&event);
    }

    let world = engine.world();
    summary.ticks = query::tick(world);
    summary.wave = query::wave(world);
    summary.phase = Some(query::wave_phase(world));
    summary.kills = query::total_kills(world);
    summary.gold = query::gold(world);
    summary.level = query::level(world);
    summary.health = query::health(world);
    summary.max_health = query::max_health(world);
    summary.outcome = query::outcome(world);
    info!(kills = summary.kills, wave = summary.wave, "simulation finished");
    Ok(summary)
}

/// Buys and sockets the gems configured for `loadout`.
fn outfit(engine: &mut Engine, loadout: Loadout, gems: &LoadoutConfig) -> Result<()> {
    if let Some(active) = gems.active {
        if let Some(item) = buy(engine, ItemTemplate::ActiveGem(active))? {
            engine
                .equip(item, Slot::Active(loadout))
                .with_context(|| format!("failed to equip {active:?} in {loadout:?}"))?;
        }
    }

    let mut index = 0;
    for support in &gems.supports {
        let Some(item) = buy(engine, ItemTemplate::SupportGem(*support))? else {
            continue;
        };
        engine
            .equip(item, Slot::Support(loadout, index))
            .with_context(|| format!("failed to socket {support:?} in {loadout:?}"))?;
        index += 1;
    }
    Ok(())
}

/// Purchases `template`, returning the new instance unless it fused into one.
fn buy(engine: &mut Engine, template: ItemTemplate) -> Result<Option<ItemId>> {
    engine
        .purchase(template)
        .with_context(|| format!("failed to buy {template:?}"))?;
    let acquired = engine.drain_events().into_iter().find_map(|event| match event {
        Event::ItemAcquired { item, .. } => Some(item),
        _ => None,
    });
    Ok(acquired)
}
