use gem_defence_core::{
    ActiveGemKind, Command, EnemyId, EnemyTier, Event, ItemId, ItemTemplate, Loadout, Slot,
    SupportGemKind,
};
use gem_defence_system_weapon_fire::WeaponFire;
use gem_defence_world::{self as world, query, World};

fn submit(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events).expect("command accepted");
    events
}

fn buy(world: &mut World, template: ItemTemplate) -> ItemId {
    let events = submit(world, Command::Purchase { template });
    events
        .iter()
        .find_map(|event| match event {
            Event::ItemAcquired { item, .. } => Some(*item),
            _ => None,
        })
        .expect("purchase acquires an item")
}

fn spawn(world: &mut World) -> EnemyId {
    let events = submit(
        world,
        Command::SpawnEnemy {
            tier: EnemyTier::Tank,
            lane_x: 400.0,
            health_multiplier: 1.0,
            damage_multiplier: 1.0,
        },
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("enemy spawned")
}

/// Runs the world for `ticks`, feeding each tick's events through the system.
fn drive(world: &mut World, system: &mut WeaponFire, target: Option<EnemyId>, ticks: u32) -> Vec<Event> {
    let mut log = Vec::new();
    for _ in 0..ticks {
        let events = submit(world, Command::Tick);
        let mut commands = Vec::new();
        system.handle(
            &events,
            &query::loadouts(world),
            query::stats(world),
            target,
            &mut commands,
        );
        log.extend(events);
        for command in commands {
            log.extend(submit(world, command));
        }
    }
    log
}

fn shots(events: &[Event], loadout: Loadout) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::ShotFired { loadout: fired, .. } if *fired == loadout))
        .count()
}

#[test]
fn equipped_gem_fires_on_its_cadence() {
    let mut world = World::new();
    let spark = buy(&mut world, ItemTemplate::ActiveGem(ActiveGemKind::Spark));
    let _ = submit(
        &mut world,
        Command::Equip {
            item: spark,
            slot: Slot::Active(Loadout::Main),
        },
    );
    let tank = spawn(&mut world);
    let mut system = WeaponFire::new();

    let events = drive(&mut world, &mut system, Some(tank), 29);
    assert_eq!(shots(&events, Loadout::Main), 0);

    let events = drive(&mut world, &mut system, Some(tank), 1);
    assert_eq!(shots(&events, Loadout::Main), 1);

    let events = drive(&mut world, &mut system, Some(tank), 90);
    assert_eq!(shots(&events, Loadout::Main), 3);
}

#[test]
fn nothing_fires_without_a_target_or_a_gem() {
    let mut world = World::new();
    let mut system = WeaponFire::new();
    let events = drive(&mut world, &mut system, None, 120);
    assert_eq!(shots(&events, Loadout::Main), 0);

    let spark = buy(&mut world, ItemTemplate::ActiveGem(ActiveGemKind::Spark));
    let _ = submit(
        &mut world,
        Command::Equip {
            item: spark,
            slot: Slot::Active(Loadout::Main),
        },
    );
    let events = drive(&mut world, &mut system, None, 120);
    assert_eq!(shots(&events, Loadout::Main), 0);
    assert_eq!(system.elapsed(Loadout::Main), 30);
}

#[test]
fn haste_support_shortens_the_interval() {
    let mut world = World::new();
    let spark = buy(&mut world, ItemTemplate::ActiveGem(ActiveGemKind::Spark));
    let haste = buy(&mut world, ItemTemplate::SupportGem(SupportGemKind::Haste));
    for (item, slot) in [
        (spark, Slot::Active(Loadout::Main)),
        (haste, Slot::Support(Loadout::Main, 0)),
    ] {
        let _ = submit(&mut world, Command::Equip { item, slot });
    }
    let tank = spawn(&mut world);
    let mut system = WeaponFire::new();

    // 30 ticks at +20% rate rounds up to a 25 tick interval.
    let events = drive(&mut world, &mut system, Some(tank), 100);
    assert_eq!(shots(&events, Loadout::Main), 4);
}
