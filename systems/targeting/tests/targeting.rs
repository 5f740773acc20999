use gem_defence_core::{Command, EnemyId, EnemyTier, Event};
use gem_defence_system_targeting::{ScriptError, Selection, TargetSelector};
use gem_defence_world::{self as world, query, World};

fn spawn(world: &mut World, tier: EnemyTier, lane_x: f32) -> EnemyId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            tier,
            lane_x,
            health_multiplier: 1.0,
            damage_multiplier: 1.0,
        },
        &mut events,
    )
    .expect("spawn accepted");
    match events.as_slice() {
        [Event::EnemySpawned { enemy, .. }] => *enemy,
        other => panic!("unexpected events: {other:?}"),
    }
}

fn advance(world: &mut World, ticks: u32) {
    for _ in 0..ticks {
        let mut events = Vec::new();
        world::apply(world, Command::Tick, &mut events).expect("tick accepted");
    }
}

fn populated() -> (World, EnemyId, EnemyId) {
    let mut world = World::new();
    let swift = spawn(&mut world, EnemyTier::Swift, 200.0);
    let tank = spawn(&mut world, EnemyTier::Tank, 600.0);
    advance(&mut world, 30);
    (world, swift, tank)
}

#[test]
fn default_strategy_prefers_the_enemy_nearest_the_base() {
    let (world, swift, _) = populated();
    let mut selector = TargetSelector::new();

    let selection = selector.select(&query::enemy_view(&world), None);
    assert_eq!(
        selection,
        Selection {
            target: Some(swift),
            clear_manual: false,
        }
    );
}

#[test]
fn live_manual_designation_wins() {
    let (world, _, tank) = populated();
    let mut selector = TargetSelector::new();

    let selection = selector.select(&query::enemy_view(&world), Some(tank));
    assert_eq!(selection.target, Some(tank));
    assert!(!selection.clear_manual);
}

#[test]
fn stale_manual_designation_is_cleared() {
    let (world, swift, _) = populated();
    let mut selector = TargetSelector::new();

    let selection = selector.select(&query::enemy_view(&world), Some(EnemyId::new(99)));
    assert_eq!(selection.target, Some(swift));
    assert!(selection.clear_manual);
}

#[test]
fn scripts_use_the_strategy_library() {
    let (world, _, tank) = populated();
    let mut selector = TargetSelector::new();
    selector.set_script(|enemies, library| library.pick("highest_health", enemies));

    let selection = selector.select(&query::enemy_view(&world), None);
    assert_eq!(selection.target, Some(tank));
    assert!(selector.last_error().is_none());
}

#[test]
fn failing_scripts_fall_through_to_the_default() {
    let (world, swift, _) = populated();
    let view = query::enemy_view(&world);
    let mut selector = TargetSelector::new();

    selector.set_script(|_, _| Err(ScriptError::Failed("no opinion".to_owned())));
    assert_eq!(selector.select(&view, None).target, Some(swift));
    assert_eq!(
        selector.last_error(),
        Some(&ScriptError::Failed("no opinion".to_owned()))
    );

    selector.set_script(|_, _| Ok(Some(EnemyId::new(77))));
    assert_eq!(selector.select(&view, None).target, Some(swift));
    assert_eq!(
        selector.last_error(),
        Some(&ScriptError::UnknownEnemy(EnemyId::new(77)))
    );

    selector.set_script(|_, _| panic!("script bug"));
    assert_eq!(selector.select(&view, None).target, Some(swift));
    assert_eq!(selector.last_error(), Some(&ScriptError::Panicked));

    selector.clear_script();
    assert!(!selector.has_script());
    assert_eq!(selector.select(&view, None).target, Some(swift));
    assert!(selector.last_error().is_none());
}

#[test]
fn empty_field_selects_nothing() {
    let world = World::new();
    let mut selector = TargetSelector::new();
    let selection = selector.select(&query::enemy_view(&world), None);
    assert_eq!(selection.target, None);
}
