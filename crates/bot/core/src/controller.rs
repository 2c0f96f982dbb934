//! Per-tick orchestrator.

use std::collections::{BTreeMap, BTreeSet};

use crate::builder::{BaseBuilder, BuildingType, choose_build_location};
use crate::bot_debug;
use crate::config::BotConfig;
use crate::context::{BaseCenters, BotContext};
use crate::debug::BotDebug;
use crate::error::ConfigError;
use crate::fuzzy::AttackOrFlee;
use crate::geometry::{CPos, cells_in_circle};
use crate::order::{Command, Order, OrderQueue};
use crate::production;
use crate::rng::BotRng;
use crate::squad::SquadManager;
use crate::support_power::SupportPowerTargeting;
use crate::timer::IntervalTimer;
use crate::world::{
    ActorCaps, ActorId, DamageEvent, DamageState, OrderSink, PlayerId, ProductionQueues, Stance,
    WorldQuery,
};

/// One bot playing one player.
///
/// # Design
///
/// Each call to [`BotController::tick`] runs, in order:
/// 1. Base initialization on the very first tick (deploy the construction vehicle)
/// 2. Unit production every `feedback_time` ticks
/// 3. Role assignment, squad updates and backup construction vehicle deployment
/// 4. Rally point fixes for production buildings
/// 5. Support power targeting
/// 6. Every [`BaseBuilder`], building queues before defense queues
/// 7. Release of this tick's share of queued orders to the host
///
/// All state lives here; policies borrow it through a [`BotContext`] for the
/// duration of one step. Nothing in a tick can fail: a policy that finds nothing
/// to do simply issues no order.
#[derive(Debug)]
pub struct BotController {
    player: PlayerId,
    config: BotConfig,
    rng: BotRng,
    orders: OrderQueue,
    debug: BotDebug,
    base: BaseCenters,
    attack_or_flee: AttackOrFlee,
    rush_policy: AttackOrFlee,
    squads: SquadManager,
    builders: Vec<BaseBuilder>,
    support_powers: SupportPowerTargeting,
    production_timer: IntervalTimer,
    /// Rally point each producer had when we last asked to move it.
    rally_requests: BTreeMap<ActorId, CPos>,
    /// Backup construction vehicles already sent to deploy.
    deploy_requests: BTreeSet<ActorId>,
    ticks: u64,
}

impl BotController {
    /// Validates `config` and sets the bot up for `player`.
    ///
    /// `seed` drives every random choice the bot makes; hosts typically derive it
    /// from the player so that replays reproduce.
    pub fn activate(config: BotConfig, player: PlayerId, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let attack_or_flee = AttackOrFlee::general()?;
        let rush_policy = AttackOrFlee::rush()?;

        let mut rng = BotRng::new(seed);
        let squads = SquadManager::new(&config, &mut rng);
        let production_timer = IntervalTimer::new(config.feedback_time);
        let builders = config
            .building_queues
            .iter()
            .chain(&config.defense_queues)
            .map(|category| BaseBuilder::new(category.as_str(), &config))
            .collect();

        tracing::info!(
            target: "bot",
            player = player.0,
            config = %config.name,
            "bot activated"
        );

        Ok(Self {
            player,
            debug: BotDebug::new(config.debug, player),
            config,
            rng,
            orders: OrderQueue::new(),
            base: BaseCenters::default(),
            attack_or_flee,
            rush_policy,
            squads,
            builders,
            support_powers: SupportPowerTargeting::new(),
            production_timer,
            rally_requests: BTreeMap::new(),
            deploy_requests: BTreeSet::new(),
            ticks: 0,
        })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Ticks run since activation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn base(&self) -> BaseCenters {
        self.base
    }

    pub fn squads(&self) -> &SquadManager {
        &self.squads
    }

    pub fn builders(&self) -> &[BaseBuilder] {
        &self.builders
    }

    /// Orders decided but not yet handed to the host.
    pub fn pending_orders(&self) -> &OrderQueue {
        &self.orders
    }

    pub fn tick(
        &mut self,
        world: &dyn WorldQuery,
        queues: &dyn ProductionQueues,
        sink: &mut dyn OrderSink,
    ) {
        self.ticks += 1;

        let mut ctx = BotContext {
            world,
            player: self.player,
            config: &self.config,
            rng: &mut self.rng,
            orders: &mut self.orders,
            debug: self.debug,
            base: self.base,
            attack_or_flee: &self.attack_or_flee,
            tick: self.ticks,
        };

        if self.ticks == 1 {
            initialize_base(&mut ctx, &mut self.deploy_requests);
        }

        if self.production_timer.tick() {
            production::run(&mut ctx, queues, self.squads.hanging_around_base().len());
        }

        if self.squads.assign_roles(&mut ctx, &self.rush_policy) {
            deploy_backup_mcvs(&mut ctx, &mut self.deploy_requests);
        }
        set_rally_points(&mut ctx, &mut self.rally_requests);
        self.support_powers.tick(&mut ctx);

        for builder in &mut self.builders {
            builder.tick(&mut ctx, queues);
        }

        self.base = ctx.base;
        self.orders
            .flush(sink, self.config.min_order_quotient_per_tick);
    }

    /// Reacts to one of the bot's actors taking damage.
    ///
    /// Repairs buildings that just dropped below light damage, raises aggro toward
    /// the attacking player, and when a harvester or building is hit moves the
    /// defense center to the attacker and sends the protection squad after it.
    pub fn on_damaged(&mut self, world: &dyn WorldQuery, event: DamageEvent) {
        let Some(attacker_id) = event.attacker else {
            return;
        };
        let Some(victim) = world.actor(event.victim).filter(|v| v.owner == self.player) else {
            return;
        };
        let Some(attacker) = world.actor(attacker_id) else {
            return;
        };
        if world.stance(attacker.owner, self.player) == Stance::Neutral {
            return;
        }

        let mut ctx = BotContext {
            world,
            player: self.player,
            config: &self.config,
            rng: &mut self.rng,
            orders: &mut self.orders,
            debug: self.debug,
            base: self.base,
            attack_or_flee: &self.attack_or_flee,
            tick: self.ticks,
        };

        let before = DamageState::from_health(event.previous_hp, victim.max_hp);
        let after = victim.damage_state();
        if ctx.config.should_repair_buildings
            && victim.has(ActorCaps::REPAIRABLE)
            && after > DamageState::Light
            && before <= DamageState::Light
            && !victim.repairing
        {
            bot_debug!(ctx.debug, victim = %victim.id, ?before, ?after, "repairing damaged building");
            ctx.queue(Order::for_player(Command::RepairBuilding).with_actor(victim.id));
        }

        if !attacker.has(ActorCaps::TARGETABLE) {
            return;
        }

        if event.damage > 0 {
            self.squads.add_aggro(attacker.owner, event.damage);
        }

        let protected = victim.has(ActorCaps::HARVESTER) || victim.has(ActorCaps::BUILDING);
        if protected && world.stance(self.player, attacker.owner) == Stance::Enemy {
            ctx.base.defense = attacker.cell;
            self.squads.protect_own(&mut ctx, attacker.id);
        }
        self.base = ctx.base;
    }
}

/// Records the base centers and deploys the starting construction vehicle.
fn initialize_base(ctx: &mut BotContext<'_>, deploying: &mut BTreeSet<ActorId>) {
    let Some(builder) = ctx
        .own_actors()
        .into_iter()
        .find(|a| a.has(ActorCaps::BASE_BUILDING))
    else {
        bot_debug!(ctx.debug, "no base builder found");
        return;
    };

    ctx.base = BaseCenters {
        initial: builder.cell,
        defense: builder.cell,
    };
    if builder.has(ActorCaps::MOBILE) {
        ctx.queue(Order::new(Command::DeployTransform, builder.id));
        deploying.insert(builder.id);
    }
}

/// Sends idle construction vehicles built later to a free spot in the base.
fn deploy_backup_mcvs(ctx: &mut BotContext<'_>, requested: &mut BTreeSet<ActorId>) {
    let mcvs: Vec<_> = ctx
        .own_actors()
        .into_iter()
        .filter(|a| a.is_undeployed_base_builder())
        .collect();
    requested.retain(|id| mcvs.iter().any(|m| m.id == *id));

    for mcv in mcvs {
        if !mcv.is_idle() || requested.contains(&mcv.id) {
            continue;
        }
        let Some(yard) = mcv.transforms_into.as_deref() else {
            continue;
        };

        match choose_build_location(ctx, yard, false, BuildingType::Building) {
            Ok(cell) => {
                bot_debug!(ctx.debug, mcv = %mcv.id, %cell, "deploying backup construction vehicle");
                ctx.queue(Order::new(Command::Move, mcv.id).with_cell(cell).queued());
                ctx.queue(Order::new(Command::DeployTransform, mcv.id).queued());
                requested.insert(mcv.id);
            }
            Err(err) => ctx.debug.decision(&err),
        }
    }
}

/// Moves rally points that sit on unbuildable cells.
fn set_rally_points(ctx: &mut BotContext<'_>, requested: &mut BTreeMap<ActorId, CPos>) {
    let producers: Vec<_> = ctx
        .own_actors()
        .into_iter()
        .filter(|a| a.has(ActorCaps::RALLY_POINT))
        .collect();
    requested.retain(|id, _| producers.iter().any(|p| p.id == *id));

    for producer in producers {
        let rally = producer.rally_point.unwrap_or(producer.cell);
        if ctx.world.is_cell_buildable(rally, &producer.kind) {
            continue;
        }
        if requested.get(&producer.id) == Some(&rally) {
            continue;
        }

        let candidates: Vec<CPos> = cells_in_circle(
            ctx.world.map_size(),
            producer.cell,
            ctx.config.rally_point_scan_radius,
        )
        .into_iter()
        .filter(|&cell| ctx.world.is_cell_buildable(cell, &producer.kind))
        .collect();
        let cell = match ctx.rng.pick(&candidates) {
            Some(&cell) => cell,
            None => {
                bot_debug!(ctx.debug, producer = %producer.id, "no valid rally point nearby");
                producer.cell
            }
        };

        ctx.queue(Order::new(Command::SetRallyPoint, producer.id).with_cell(cell));
        requested.insert(producer.id, rally);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{BOT, ENEMY, TestWorld, building, harvester, tank};
    use crate::world::{ActorSnapshot, QueueSnapshot};

    fn mcv(id: u32, x: i32, y: i32) -> ActorSnapshot {
        ActorSnapshot::new(ActorId(id), BOT, "mcv", CPos::new(x, y))
            .with_caps(ActorCaps::MOBILE | ActorCaps::BASE_BUILDING)
            .with_health(100, 100)
            .transforms_into("fact")
    }

    fn controller() -> BotController {
        BotController::activate(BotConfig::default(), BOT, 42).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = BotConfig {
            squad_size: 0,
            ..BotConfig::default()
        };
        assert!(matches!(
            BotController::activate(config, BOT, 1),
            Err(ConfigError::ZeroInterval("squad_size"))
        ));
    }

    #[test]
    fn first_tick_deploys_the_construction_vehicle() {
        let mut world = TestWorld::new();
        world.spawn(mcv(1, 12, 14));
        let mut bot = controller();
        let mut sink = Vec::new();

        bot.tick(&world, &world, &mut sink);

        assert_eq!(bot.base().initial, CPos::new(12, 14));
        assert_eq!(bot.base().defense, CPos::new(12, 14));
        assert_eq!(sink[0].command, Command::DeployTransform);
        assert_eq!(sink[0].subject, Some(ActorId(1)));
    }

    #[test]
    fn deployed_yard_is_not_redeployed() {
        let mut world = TestWorld::new();
        world.spawn(
            building(1, BOT, "fact", 12, 14)
                .with_caps(ActorCaps::BASE_BUILDING | ActorCaps::BASE_PROVIDER),
        );
        let mut bot = controller();
        let mut sink = Vec::new();

        bot.tick(&world, &world, &mut sink);
        assert_eq!(bot.base().initial, CPos::new(12, 14));
        assert!(sink.iter().all(|o| o.command != Command::DeployTransform));
    }

    #[test]
    fn rally_point_on_blocked_cell_is_moved_once() {
        let mut world = TestWorld::new();
        world.blocked.insert(CPos::new(30, 30));
        world.spawn(
            building(5, BOT, "weap", 30, 30).with_caps(ActorCaps::RALLY_POINT),
        );
        let mut bot = controller();
        let mut sink = Vec::new();

        for _ in 0..5 {
            bot.tick(&world, &world, &mut sink);
        }

        let rallies: Vec<_> = sink
            .iter()
            .filter(|o| o.command == Command::SetRallyPoint)
            .collect();
        assert_eq!(rallies.len(), 1);
        let cell = rallies[0].target_cell().unwrap();
        assert!(world.is_cell_buildable(cell, "weap"));
    }

    #[test]
    fn damaged_building_is_repaired_and_defended() {
        let mut world = TestWorld::new();
        world.spawn(
            building(1, BOT, "fact", 10, 10)
                .with_caps(ActorCaps::BASE_BUILDING | ActorCaps::REPAIRABLE)
                .with_health(60, 100),
        );
        world.spawn(tank(2, BOT, 12, 10));
        world.spawn(tank(9, ENEMY, 15, 12));
        let mut bot = controller();

        bot.on_damaged(
            &world,
            DamageEvent {
                victim: ActorId(1),
                attacker: Some(ActorId(9)),
                damage: 30,
                previous_hp: 90,
            },
        );

        assert_eq!(bot.base().defense, CPos::new(15, 12));
        assert_eq!(bot.squads().aggro(ENEMY), 30);
        let protection = bot
            .squads()
            .squad_of_kind(crate::squad::SquadKind::Protection)
            .unwrap();
        assert_eq!(protection.members(), &[ActorId(2)]);
        let repair = bot.pending_orders().iter().next().unwrap();
        assert_eq!(repair.command, Command::RepairBuilding);
        assert_eq!(repair.target_actor(), Some(ActorId(1)));
    }

    #[test]
    fn neutral_attackers_are_ignored() {
        let mut world = TestWorld::new();
        world.spawn(harvester(1, BOT, 10, 10));
        world.spawn(tank(9, ENEMY, 12, 10));
        world.stances.insert((ENEMY, BOT), Stance::Neutral);
        let mut bot = controller();

        bot.on_damaged(
            &world,
            DamageEvent {
                victim: ActorId(1),
                attacker: Some(ActorId(9)),
                damage: 10,
                previous_hp: 100,
            },
        );
        assert_eq!(bot.squads().aggro(ENEMY), 0);
        assert!(bot.squads().squads().is_empty());
    }

    #[test]
    fn damage_to_foreign_actors_is_ignored() {
        let mut world = TestWorld::new();
        world.spawn(
            building(1, ENEMY, "fact", 10, 10)
                .with_caps(ActorCaps::BASE_BUILDING | ActorCaps::REPAIRABLE)
                .with_health(60, 100),
        );
        world.spawn(tank(2, BOT, 12, 10));
        world.spawn(tank(9, ENEMY, 15, 12));
        let mut bot = controller();
        let defense = bot.base().defense;

        bot.on_damaged(
            &world,
            DamageEvent {
                victim: ActorId(1),
                attacker: Some(ActorId(9)),
                damage: 30,
                previous_hp: 90,
            },
        );

        assert_eq!(bot.base().defense, defense);
        assert_eq!(bot.squads().aggro(ENEMY), 0);
        assert!(bot.squads().squads().is_empty());
        assert!(bot.pending_orders().is_empty());
    }

    #[test]
    fn unit_production_waits_a_full_feedback_interval() {
        let mut world = TestWorld::new();
        world.spawn(building(1, BOT, "fact", 20, 20));
        world.spawn(building(2, BOT, "powr", 22, 20));
        world.spawn(building(3, BOT, "proc", 24, 20));
        world.queues.push(QueueSnapshot {
            actor: ActorId(50),
            category: "Infantry".to_owned(),
            enabled: true,
            buildable: vec!["e1".to_owned()],
            current: None,
        });
        let mut bot = controller();
        let feedback = bot.config().feedback_time as u64;

        let mut started = Vec::new();
        for _ in 0..feedback * 3 {
            let mut sink = Vec::new();
            bot.tick(&world, &world, &mut sink);
            if sink
                .iter()
                .any(|o| o.command == Command::StartProduction && o.subject == Some(ActorId(50)))
            {
                started.push(bot.ticks());
            }
        }
        assert_eq!(started, [feedback, feedback * 2, feedback * 3]);
    }

    #[test]
    fn unchanged_world_gets_no_repeated_orders() {
        let mut world = TestWorld::new();
        world.spawn(
            building(1, BOT, "fact", 20, 20)
                .with_caps(ActorCaps::BASE_BUILDING | ActorCaps::BASE_PROVIDER),
        );
        world.spawn(harvester(2, BOT, 22, 22));
        world.spawn(harvester(3, BOT, 23, 22));
        world.resources.insert(CPos::new(40, 40));
        let mut bot = controller();
        let mut sink = Vec::new();

        for _ in 0..200 {
            bot.tick(&world, &world, &mut sink);
        }

        assert_eq!(sink.len(), 2);
        assert!(sink.iter().all(|o| o.command == Command::Harvest));
        assert!(bot.pending_orders().is_empty());
    }

    #[test]
    fn starting_vehicle_is_not_sent_off_as_a_backup() {
        let mut world = TestWorld::new();
        world.spawn(mcv(1, 12, 14));
        let mut bot = controller();
        let mut sink = Vec::new();

        for _ in 0..100 {
            bot.tick(&world, &world, &mut sink);
        }
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].command, Command::DeployTransform);
    }
}
