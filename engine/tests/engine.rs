use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use gem_defence_core::{
    ActiveGemKind, Event, ItemTemplate, Loadout, RunOutcome, Slot, StatDelta, StatKey, WavePhase,
    TICK_DURATION,
};
use gem_defence_engine::{Config, Engine};
use gem_defence_system_targeting::ScriptError;
use gem_defence_world::{query, Bootstrap};

fn armed(seed: u64) -> Engine {
    let mut engine = Engine::new(Config::new(seed, 20, 1.0));
    engine
        .purchase(ItemTemplate::ActiveGem(ActiveGemKind::Spark))
        .expect("starting gold covers a spark");
    let spark = query::inventory(engine.world())[0].id;
    engine
        .equip(spark, Slot::Active(Loadout::Main))
        .expect("spark fits the main loadout");
    engine
}

fn run(engine: &mut Engine, ticks: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        engine.step();
        events.extend(engine.drain_events());
    }
    events
}

#[test]
fn frames_become_capped_fixed_ticks() {
    let mut engine = Engine::default();
    assert_eq!(engine.frame(TICK_DURATION * 3), 3);
    assert_eq!(engine.frame(Duration::from_secs(1)), 5);
    assert_eq!(query::tick(engine.world()), 8);
}

#[test]
fn paused_engine_holds_state() {
    let mut engine = Engine::default();
    let _ = engine.frame(TICK_DURATION * 2);
    assert!(engine.toggle_pause());
    assert_eq!(engine.frame(Duration::from_secs(1)), 0);
    assert_eq!(query::tick(engine.world()), 2);

    assert!(!engine.toggle_pause());
    assert_eq!(engine.frame(TICK_DURATION), 1);
}

#[test]
fn first_tick_starts_the_first_wave() {
    let mut engine = Engine::default();
    let events = run(&mut engine, 1);
    assert!(events.contains(&Event::WaveStarted { wave: 1 }));
    assert_eq!(query::wave(engine.world()), 1);
    assert_eq!(query::wave_phase(engine.world()), WavePhase::Normal);

    let _ = run(&mut engine, 120);
    assert!(!query::enemy_view(engine.world()).is_empty());
}

#[test]
fn armed_turret_fires_and_kills() {
    let mut engine = armed(11);
    let events = run(&mut engine, 2_400);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ShotFired { loadout: Loadout::Main, .. })));
    assert!(query::total_kills(engine.world()) > 0);
}

#[test]
fn identical_seeds_replay_identically() {
    let fingerprint = |seed: u64| {
        let mut engine = armed(seed);
        let events = run(&mut engine, 1_800);
        let mut hasher = DefaultHasher::new();
        for event in &events {
            format!("{event:?}").hash(&mut hasher);
        }
        hasher.finish()
    };

    assert_eq!(fingerprint(5), fingerprint(5));
    assert_ne!(fingerprint(5), fingerprint(6));
}

#[test]
fn reset_restores_the_bootstrap_state() {
    let mut engine = armed(3);
    let _ = run(&mut engine, 600);
    assert!(query::tick(engine.world()) > 0);

    engine.reset();
    let events = engine.drain_events();
    assert_eq!(events, vec![Event::StateRefreshed]);
    assert_eq!(query::tick(engine.world()), 0);
    assert_eq!(query::wave(engine.world()), 0);
    assert!(query::enemy_view(engine.world()).is_empty());
    assert!(query::inventory(engine.world()).is_empty());

    let events = run(&mut engine, 1);
    assert!(events.contains(&Event::WaveStarted { wave: 1 }));
}

#[test]
fn rejected_commands_report_failure_and_toast() {
    let mut engine = Engine::default();
    let result = engine.purchase(ItemTemplate::ActiveGem(ActiveGemKind::Meteor));
    assert!(result.is_err());

    let events = engine.drain_events();
    assert!(matches!(
        events.as_slice(),
        [Event::CommandRejected { .. }]
    ));
}

#[test]
fn failing_scripts_do_not_stop_the_turret() {
    let mut engine = armed(11);
    engine.set_target_script(|_, _| Err(ScriptError::Failed("broken".to_owned())));
    let events = run(&mut engine, 600);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ShotFired { .. })));
}

#[test]
fn defeat_tick_sends_no_system_commands() {
    let bootstrap = Bootstrap {
        bonus_stats: vec![StatDelta::new(StatKey::MaxHealth, -95.0)],
        ..Bootstrap::default()
    };
    let mut engine = Engine::new(Config::default().with_bootstrap(bootstrap));
    assert_eq!(query::health(engine.world()), 5.0);

    let mut first = None;
    for _ in 0..600 {
        engine.step();
        first = query::enemy_view(engine.world())
            .iter()
            .next()
            .map(|enemy| enemy.id);
        if first.is_some() {
            break;
        }
    }
    // The unarmed base lets its manual target walk in; that breach is lethal.
    let first = first.expect("a wave enemy spawned");
    engine
        .designate_target(Some(first))
        .expect("target is alive");
    let _ = engine.drain_events();

    let mut events = Vec::new();
    for _ in 0..2_000 {
        engine.step();
        events.extend(engine.drain_events());
        if query::outcome(engine.world()).is_some() {
            break;
        }
    }

    assert_eq!(query::outcome(engine.world()), Some(RunOutcome::Defeat));
    assert!(events.contains(&Event::EnemyBreached {
        enemy: first,
        tier: gem_defence_core::EnemyTier::Common,
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. })));
}
