use gem_defence_core::{Command, EnemyId, EnemyTier, Event, OfferKind, RunOutcome, WavePhase};
use gem_defence_system_progression::{
    boss_composition, quota, Config, Progression, ProgressionView, Stage, REWARD_DELAY_TICKS,
};
use gem_defence_world::{self as world, query, World};

fn tick() -> Event {
    Event::TimeAdvanced { tick: 1 }
}

fn killed(id: u32, tier: EnemyTier) -> Event {
    Event::EnemyKilled {
        enemy: EnemyId::new(id),
        tier,
        xp: 1,
        gold: 1,
    }
}

fn view(wave: u32, phase: WavePhase, active_bosses: usize) -> ProgressionView {
    ProgressionView {
        wave,
        phase,
        active_bosses,
    }
}

fn started(progression: &mut Progression) {
    let mut out = Vec::new();
    progression.handle(&[tick()], view(0, WavePhase::Normal, 0), &mut out);
    assert_eq!(out, vec![Command::StartWave { wave: 1 }]);
}

#[test]
fn first_tick_starts_wave_one() {
    let mut progression = Progression::new(Config::default());
    assert_eq!(progression.stage(), Stage::Idle);
    started(&mut progression);
    assert_eq!(progression.stage(), Stage::Normal { wave: 1, kills: 0 });
}

#[test]
fn repeated_deaths_count_once() {
    let mut progression = Progression::new(Config::default());
    started(&mut progression);

    let mut out = Vec::new();
    let events = vec![
        killed(1, EnemyTier::Common),
        killed(1, EnemyTier::Common),
        killed(2, EnemyTier::Swift),
    ];
    progression.handle(&events, view(1, WavePhase::Normal, 0), &mut out);
    progression.handle(&events, view(1, WavePhase::Normal, 0), &mut out);

    assert!(out.is_empty());
    assert_eq!(progression.stage(), Stage::Normal { wave: 1, kills: 2 });
}

#[test]
fn reaching_the_quota_spawns_the_boss_composition() {
    let mut progression = Progression::new(Config::default());
    started(&mut progression);

    let kills: Vec<Event> = (1..=quota(1))
        .map(|id| killed(id, EnemyTier::Common))
        .collect();
    let mut out = Vec::new();
    progression.handle(&kills, view(1, WavePhase::Normal, 0), &mut out);

    assert_eq!(out[0], Command::BeginBossWave { wave: 1 });
    let bosses = out
        .iter()
        .filter(|command| {
            matches!(
                command,
                Command::SpawnEnemy {
                    tier: EnemyTier::Boss,
                    ..
                }
            )
        })
        .count();
    assert_eq!(bosses as u32, boss_composition(1).count);
}

#[test]
fn boss_wave_waits_for_every_boss() {
    let mut progression = Progression::new(Config::default());
    started(&mut progression);
    let kills: Vec<Event> = (1..=quota(1))
        .map(|id| killed(id, EnemyTier::Common))
        .collect();
    let mut out = Vec::new();
    progression.handle(&kills, view(1, WavePhase::Normal, 0), &mut out);
    out.clear();

    // Unconfirmed boss phase never completes, even with an empty field.
    progression.handle(&[tick()], view(1, WavePhase::Normal, 0), &mut out);
    assert!(out.is_empty());

    progression.handle(
        &[Event::BossWaveStarted { wave: 1 }, tick()],
        view(1, WavePhase::Boss, 2),
        &mut out,
    );
    progression.handle(
        &[killed(500, EnemyTier::Boss)],
        view(1, WavePhase::Boss, 1),
        &mut out,
    );
    assert!(out.is_empty(), "one boss still alive");

    progression.handle(
        &[killed(501, EnemyTier::Boss), killed(501, EnemyTier::Boss)],
        view(1, WavePhase::Boss, 0),
        &mut out,
    );
    assert_eq!(out, vec![Command::CompleteWave { wave: 1 }]);
    assert_eq!(
        progression.stage(),
        Stage::Reward {
            wave: 1,
            remaining: REWARD_DELAY_TICKS
        }
    );

    out.clear();
    for _ in 0..REWARD_DELAY_TICKS - 1 {
        progression.handle(&[tick()], view(1, WavePhase::Intermission, 0), &mut out);
    }
    assert!(out.is_empty());
    progression.handle(&[tick()], view(1, WavePhase::Intermission, 0), &mut out);
    assert_eq!(
        out,
        vec![
            Command::OfferReward { wave: 1 },
            Command::StartWave { wave: 2 }
        ]
    );
}

/// Feeds `events` to the scheduler and applies its commands to `world`.
fn step(world: &mut World, progression: &mut Progression, events: &[Event]) -> Vec<Event> {
    let mut out = Vec::new();
    progression.handle(
        events,
        ProgressionView {
            wave: query::wave(world),
            phase: query::wave_phase(world),
            active_bosses: query::active_boss_count(world),
        },
        &mut out,
    );
    let mut produced = Vec::new();
    for command in out {
        let _ = world::apply(world, command, &mut produced);
    }
    produced
}

#[test]
fn final_wave_declares_victory_in_the_world() {
    let mut world = World::new();
    let mut progression = Progression::new(Config::new(1));

    let mut pending = vec![tick()];
    pending = step(&mut world, &mut progression, &pending);
    assert_eq!(query::wave(&world), 1);

    let kills: Vec<Event> = (1_000..1_000 + quota(1))
        .map(|id| killed(id, EnemyTier::Common))
        .collect();
    pending.extend(kills);
    pending = step(&mut world, &mut progression, &pending);
    assert_eq!(query::wave_phase(&world), WavePhase::Boss);
    assert_eq!(
        query::active_boss_count(&world),
        boss_composition(1).count as usize
    );

    // Bosses still standing: the confirmed boss phase holds.
    pending = step(&mut world, &mut progression, &pending);
    assert!(pending.is_empty());
    assert_eq!(query::outcome(&world), None);

    let mut fresh = World::new();
    let _ = world::apply(&mut fresh, Command::StartWave { wave: 1 }, &mut Vec::new());
    let _ = world::apply(&mut fresh, Command::BeginBossWave { wave: 1 }, &mut Vec::new());
    let produced = step(&mut fresh, &mut progression, &[]);
    assert!(produced.contains(&Event::WaveCompleted { wave: 1 }));
    assert!(produced.contains(&Event::RunEnded {
        outcome: RunOutcome::Victory
    }));
    assert_eq!(query::outcome(&fresh), Some(RunOutcome::Victory));
    assert_eq!(progression.stage(), Stage::Finished);
}

#[test]
fn reward_offer_reaches_the_world() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::OfferReward { wave: 3 }, &mut events)
        .expect("offer accepted");
    let offer = query::pending_offer(&world).expect("offer pending");
    assert_eq!(offer.kind, OfferKind::BossReward);
    assert!(!offer.choices.is_empty());
}
