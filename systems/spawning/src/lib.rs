#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for the normal-wave spawn table.

use gem_defence_core::{Command, EnemyTier, Event, WavePhase, ARENA_WIDTH};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Ticks between spawns on wave one.
pub const BASE_SPAWN_INTERVAL_TICKS: u32 = 90;
/// Fastest spawn cadence reached on late waves.
pub const MIN_SPAWN_INTERVAL_TICKS: u32 = 20;
/// Cadence reduction per wave.
pub const SPAWN_INTERVAL_STEP_TICKS: u32 = 4;
/// Horizontal margin kept free at both arena edges.
pub const LANE_MARGIN: f32 = 40.0;
/// Enemies in a swarm cluster.
pub const SWARM_CLUSTER: u32 = 3;
/// Horizontal spacing inside a swarm cluster.
pub const SWARM_SPACING: f32 = 18.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding the spawn stream.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Ticks between normal-wave spawns on `wave`.
#[must_use]
pub fn spawn_interval(wave: u32) -> u32 {
    let reduction = SPAWN_INTERVAL_STEP_TICKS.saturating_mul(wave.saturating_sub(1));
    BASE_SPAWN_INTERVAL_TICKS
        .saturating_sub(reduction)
        .max(MIN_SPAWN_INTERVAL_TICKS)
}

/// Health multiplier applied to every enemy spawned on `wave`.
#[must_use]
pub fn health_multiplier(wave: u32) -> f32 {
    1.0 + 0.15 * wave.saturating_sub(1) as f32
}

/// Contact damage multiplier applied to every enemy spawned on `wave`.
#[must_use]
pub fn damage_multiplier(wave: u32) -> f32 {
    1.0 + 0.08 * wave.saturating_sub(1) as f32
}

/// Relative spawn weights of the normal tiers on `wave`.
///
/// Tiers unlock progressively; bosses never appear in the normal table.
#[must_use]
pub fn tier_weights(wave: u32) -> [(EnemyTier, u32); 4] {
    let unlocked = |from: u32, weight: u32| if wave >= from { weight } else { 0 };
    [
        (EnemyTier::Common, 60),
        (EnemyTier::Swift, unlocked(2, 20)),
        (EnemyTier::Tank, unlocked(3, 10 + wave)),
        (EnemyTier::Swarm, unlocked(4, 15)),
    ]
}

/// Pure system that deterministically emits spawn commands during normal waves.
#[derive(Debug)]
pub struct Spawning {
    accumulator: u32,
    rng_state: u64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            accumulator: 0,
            rng_state: config.rng_seed,
        }
    }

    /// Consumes events and the current wave state to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], wave: u32, phase: WavePhase, out: &mut Vec<Command>) {
        for event in events {
            if matches!(event, Event::WaveStarted { .. }) {
                self.accumulator = 0;
            }
        }

        if phase != WavePhase::Normal || wave == 0 {
            self.accumulator = 0;
            return;
        }

        let ticks = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count() as u32;
        if ticks == 0 {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(ticks);
        let interval = spawn_interval(wave);
        while self.accumulator >= interval {
            self.accumulator -= interval;
            self.spawn(wave, out);
        }
    }

    fn spawn(&mut self, wave: u32, out: &mut Vec<Command>) {
        let tier = self.select_tier(wave);
        let lane_x = self.select_lane();
        let cluster = if tier == EnemyTier::Swarm {
            SWARM_CLUSTER
        } else {
            1
        };

        for member in 0..cluster {
            let offset = (member as f32 - (cluster - 1) as f32 / 2.0) * SWARM_SPACING;
            out.push(Command::SpawnEnemy {
                tier,
                lane_x: (lane_x + offset).clamp(LANE_MARGIN, ARENA_WIDTH - LANE_MARGIN),
                health_multiplier: health_multiplier(wave),
                damage_multiplier: damage_multiplier(wave),
            });
        }
    }

    fn select_tier(&mut self, wave: u32) -> EnemyTier {
        let weights = tier_weights(wave);
        let total: u32 = weights.iter().map(|(_, weight)| weight).sum();
        let mut roll = (self.advance_rng() % u64::from(total)) as u32;
        for (tier, weight) in weights {
            if roll < weight {
                return tier;
            }
            roll -= weight;
        }
        EnemyTier::Common
    }

    fn select_lane(&mut self) -> f32 {
        let unit = (self.advance_rng() % 10_000) as f32 / 10_000.0;
        LANE_MARGIN + unit * (ARENA_WIDTH - 2.0 * LANE_MARGIN)
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state >> 33
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_tightens_until_the_floor() {
        assert_eq!(spawn_interval(1), 90);
        assert_eq!(spawn_interval(5), 74);
        assert_eq!(spawn_interval(40), MIN_SPAWN_INTERVAL_TICKS);
    }

    #[test]
    fn first_wave_only_spawns_commons() {
        let mut spawning = Spawning::new(Config::new(99));
        for _ in 0..64 {
            assert_eq!(spawning.select_tier(1), EnemyTier::Common);
        }
    }

    #[test]
    fn lanes_stay_inside_the_margins() {
        let mut spawning = Spawning::new(Config::new(3));
        for _ in 0..256 {
            let lane = spawning.select_lane();
            assert!((LANE_MARGIN..=ARENA_WIDTH - LANE_MARGIN).contains(&lane));
        }
    }
}
