#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave progression scheduler.
//!
//! The scheduler walks `Normal -> Boss -> Reward -> Normal(next)` and
//! finishes with victory once the final wave's bosses fall. Kill events are
//! de-duplicated by enemy identity, so replaying a death never advances the
//! quota twice, and a boss wave completes only when no boss is left alive.

use std::collections::BTreeSet;

use gem_defence_core::{Command, EnemyId, EnemyTier, Event, WavePhase, ARENA_WIDTH};

/// Last wave of a default run.
pub const FINAL_WAVE: u32 = 20;
/// Ticks between a boss wave ending and its reward being offered.
pub const REWARD_DELAY_TICKS: u32 = 60;

/// Normal-wave kills required before the boss phase of `wave` begins.
#[must_use]
pub fn quota(wave: u32) -> u32 {
    let n = wave.max(1) as f32;
    (10.0 + 4.0 * n + 0.5 * n.powf(1.5)).floor() as u32
}

/// Bosses spawned by a boss wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossComposition {
    /// Bosses on the field.
    pub count: u32,
    /// Multiplier applied to boss health.
    pub health_multiplier: f32,
    /// Multiplier applied to boss attack damage.
    pub damage_multiplier: f32,
}

/// Boss composition of `wave`.
#[must_use]
pub fn boss_composition(wave: u32) -> BossComposition {
    let steps = wave.saturating_sub(1) as f32;
    BossComposition {
        count: 1 + wave / 5,
        health_multiplier: 1.0 + 0.35 * steps,
        damage_multiplier: 1.0 + 0.1 * steps,
    }
}

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    final_wave: u32,
}

impl Config {
    /// Creates a configuration ending the run after `final_wave`.
    #[must_use]
    pub const fn new(final_wave: u32) -> Self {
        Self { final_wave }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(FINAL_WAVE)
    }
}

/// World state the scheduler reads every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressionView {
    /// Current wave number.
    pub wave: u32,
    /// Current wave phase.
    pub phase: WavePhase,
    /// Boss-tier enemies still alive.
    pub active_bosses: usize,
}

/// Stage of the scheduler's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the first tick of the run.
    Idle,
    /// Counting normal-wave kills toward the quota.
    Normal {
        /// Wave in progress.
        wave: u32,
        /// Distinct kills counted this wave.
        kills: u32,
    },
    /// Waiting for every boss of the wave to die.
    Boss {
        /// Wave in progress.
        wave: u32,
        /// The world acknowledged the boss phase.
        confirmed: bool,
    },
    /// Counting down to the reward offer.
    Reward {
        /// Wave that was completed.
        wave: u32,
        /// Ticks left before the offer.
        remaining: u32,
    },
    /// The run ended.
    Finished,
}

/// Pure system that drives wave progression.
#[derive(Debug)]
pub struct Progression {
    final_wave: u32,
    stage: Stage,
    processed: BTreeSet<EnemyId>,
}

impl Progression {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            final_wave: config.final_wave.max(1),
            stage: Stage::Idle,
            processed: BTreeSet::new(),
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Consumes events and the world view to emit progression commands.
    pub fn handle(&mut self, events: &[Event], view: ProgressionView, out: &mut Vec<Command>) {
        let mut ticks = 0;
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => ticks += 1,
                Event::EnemyKilled { enemy, tier, .. } => self.record_kill(*enemy, *tier),
                Event::BossWaveStarted { wave } => {
                    if let Stage::Boss {
                        wave: current,
                        confirmed,
                    } = &mut self.stage
                    {
                        if *current == *wave {
                            *confirmed = true;
                        }
                    }
                }
                Event::RunEnded { .. } => self.stage = Stage::Finished,
                _ => {}
            }
        }

        match self.stage {
            Stage::Idle => {
                if ticks > 0 {
                    self.start_wave(view.wave + 1, out);
                }
            }
            Stage::Normal { wave, kills } => {
                if kills >= quota(wave) && view.phase == WavePhase::Normal {
                    self.begin_boss_wave(wave, out);
                }
            }
            Stage::Boss { wave, confirmed } => {
                if confirmed && view.active_bosses == 0 {
                    out.push(Command::CompleteWave { wave });
                    if wave >= self.final_wave {
                        out.push(Command::DeclareVictory);
                        self.stage = Stage::Finished;
                    } else {
                        self.stage = Stage::Reward {
                            wave,
                            remaining: REWARD_DELAY_TICKS,
                        };
                    }
                }
            }
            Stage::Reward { wave, remaining } => {
                let remaining = remaining.saturating_sub(ticks);
                if remaining == 0 {
                    out.push(Command::OfferReward { wave });
                    self.start_wave(wave + 1, out);
                } else {
                    self.stage = Stage::Reward { wave, remaining };
                }
            }
            Stage::Finished => {}
        }
    }

    fn record_kill(&mut self, enemy: EnemyId, tier: EnemyTier) {
        if !self.processed.insert(enemy) {
            return;
        }
        if tier == EnemyTier::Boss {
            return;
        }
        if let Stage::Normal { kills, .. } = &mut self.stage {
            *kills += 1;
        }
    }

    fn start_wave(&mut self, wave: u32, out: &mut Vec<Command>) {
        out.push(Command::StartWave { wave });
        // Enemy ids only grow, so earlier waves' deaths never come back.
        self.processed.clear();
        self.stage = Stage::Normal { wave, kills: 0 };
    }

    fn begin_boss_wave(&mut self, wave: u32, out: &mut Vec<Command>) {
        out.push(Command::BeginBossWave { wave });
        let composition = boss_composition(wave);
        let spacing = ARENA_WIDTH / (composition.count + 1) as f32;
        for index in 0..composition.count {
            out.push(Command::SpawnEnemy {
                tier: EnemyTier::Boss,
                lane_x: spacing * (index + 1) as f32,
                health_multiplier: composition.health_multiplier,
                damage_multiplier: composition.damage_multiplier,
            });
        }
        self.stage = Stage::Boss {
            wave,
            confirmed: false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_grows_monotonically() {
        assert_eq!(quota(1), 14);
        assert_eq!(quota(5), 35);
        for wave in 1..60 {
            assert!(quota(wave + 1) > quota(wave));
        }
    }

    #[test]
    fn boss_count_grows_every_five_waves() {
        assert_eq!(boss_composition(1).count, 1);
        assert_eq!(boss_composition(5).count, 2);
        assert_eq!(boss_composition(10).count, 3);
        assert!(boss_composition(6).health_multiplier > boss_composition(5).health_multiplier);
    }

    fn view(wave: u32, phase: WavePhase) -> ProgressionView {
        ProgressionView {
            wave,
            phase,
            active_bosses: 0,
        }
    }

    fn tick() -> Event {
        Event::TimeAdvanced { tick: 1 }
    }

    #[test]
    fn kill_ledger_is_cleared_when_a_wave_starts() {
        let mut progression = Progression::new(Config::default());
        let mut out = Vec::new();
        progression.handle(&[tick()], view(0, WavePhase::Normal), &mut out);

        let kills: Vec<Event> = (1..=quota(1))
            .map(|id| Event::EnemyKilled {
                enemy: EnemyId::new(id),
                tier: EnemyTier::Common,
                xp: 1,
                gold: 1,
            })
            .collect();
        progression.handle(&kills, view(1, WavePhase::Normal), &mut out);
        assert_eq!(progression.processed.len(), quota(1) as usize);

        progression.handle(
            &[Event::BossWaveStarted { wave: 1 }],
            view(1, WavePhase::Boss),
            &mut out,
        );
        for _ in 0..REWARD_DELAY_TICKS {
            progression.handle(&[tick()], view(1, WavePhase::Intermission), &mut out);
        }

        assert_eq!(progression.stage(), Stage::Normal { wave: 2, kills: 0 });
        assert!(progression.processed.is_empty());
    }
}
