use bot_core::{BotConfig, BotController, CPos, Command, OrderTarget, PlayerId, WorldQuery};
use bot_sandbox::{Ruleset, SandboxWorld, Scenario, Skirmish, init_test_tracing};

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

/// Two-player map with a bot only for the first player.
fn solo_skirmish() -> Skirmish {
    init_test_tracing();
    let world = Scenario::two_player()
        .create_world(Ruleset::standard())
        .expect("two-player scenario");
    let mut skirmish = Skirmish::new(world);
    skirmish.add_bot(BotController::activate(BotConfig::default(), P1, 11).expect("default config"));
    skirmish
}

#[test]
fn first_tick_deploys_construction_vehicle() {
    let mut skirmish = solo_skirmish();
    skirmish.step();

    let deploys: Vec<_> = skirmish.orders_of(P1, Command::DeployTransform).collect();
    assert_eq!(deploys.len(), 1);
    assert_eq!(deploys[0].outcome, Ok(()));

    let world = skirmish.world();
    assert_eq!(world.count_of(P1, "mcv"), 0);
    let yard = world.owned_by(P1).find(|a| a.kind == "fact").expect("yard");
    assert_eq!(yard.cell, CPos::new(16, 16));
    assert_eq!(skirmish.bot(P1).unwrap().base().initial, CPos::new(16, 16));
}

#[test]
fn first_structure_is_a_power_plant() {
    let mut skirmish = solo_skirmish();
    skirmish.run(200);

    let first = skirmish
        .orders_of(P1, Command::StartProduction)
        .next()
        .expect("structure production started");
    assert_eq!(first.order.item.as_deref(), Some("powr"));
    assert_eq!(first.outcome, Ok(()));
}

#[test]
fn bot_builds_economy() {
    let mut skirmish = solo_skirmish();
    skirmish.run(1000);

    let world = skirmish.world();
    assert!(world.count_of(P1, "powr") >= 1);
    assert!(world.count_of(P1, "proc") >= 1);
    assert!(world.count_of(P1, "harv") >= 1);

    // Every accepted placement sits in the base and off resource cells.
    for placed in skirmish
        .orders_of(P1, Command::PlaceBuilding)
        .filter(|o| o.outcome.is_ok())
    {
        let cell = placed.order.target_cell().expect("placement cell");
        assert!(!world.has_resources(cell));
        assert!(cell.distance_sq(CPos::new(16, 16)) <= 30 * 30);
    }
}

#[test]
fn idle_harvester_goes_to_work() {
    let mut skirmish = solo_skirmish();
    skirmish.run(1000);

    let harvest = skirmish
        .orders_of(P1, Command::Harvest)
        .next()
        .expect("harvester dispatched");
    assert_eq!(harvest.outcome, Ok(()));
}

#[test]
fn attacked_base_is_defended_and_repaired() {
    init_test_tracing();
    let scenario = Scenario::new(bot_core::MapSize::new(48, 48))
        .with_player(P1)
        .with_player(P2)
        .place(P1, "fact", CPos::new(10, 10))
        .place(P2, "2tnk", CPos::new(13, 10));
    let world = scenario.create_world(Ruleset::standard()).unwrap();
    let yard = world.owned_by(P1).next().unwrap().id;
    let tank = world.owned_by(P2).next().unwrap().id;

    let mut skirmish = Skirmish::new(world);
    skirmish.add_bot(BotController::activate(BotConfig::default(), P1, 3).unwrap());
    skirmish.run(60);

    let bot = skirmish.bot(P1).unwrap();
    assert_eq!(bot.base().defense, CPos::new(13, 10));
    assert!(bot.squads().aggro(P2) > 0);

    let repairs: Vec<_> = skirmish.orders_of(P1, Command::RepairBuilding).collect();
    assert_eq!(repairs.len(), 1);
    assert_eq!(repairs[0].order.target, OrderTarget::Actor(yard));
    assert_eq!(repairs[0].outcome, Ok(()));
    assert!(skirmish.world().actor(tank).is_some());
}

/// Two bots, same seeds, same orders.
#[test]
fn matches_replay_identically() {
    init_test_tracing();
    let play = || {
        let world: SandboxWorld = Scenario::two_player()
            .create_world(Ruleset::standard())
            .unwrap();
        let mut skirmish = Skirmish::new(world);
        skirmish.add_bot(BotController::activate(BotConfig::default(), P1, 5).unwrap());
        let rush = bot_content::presets::rush().unwrap();
        skirmish.add_bot(BotController::activate(rush, P2, 6).unwrap());
        skirmish.run(800);
        skirmish
    };

    let first = play();
    let second = play();
    assert!(!first.log().is_empty());
    assert_eq!(first.log(), second.log());
    assert_eq!(first.world().actors(), second.world().actors());
}
