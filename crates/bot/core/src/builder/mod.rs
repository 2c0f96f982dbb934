//! Structure production: what to build next and where to put it.
//!
//! # Design
//!
//! One [`BaseBuilder`] runs per production category (buildings, defenses). It sleeps
//! on a wait timer between passes and on every pass ticks each queue of its category:
//!
//! - idle queue: pick an item (see `choose`) and start producing it
//! - finished item: pick a cell (see [`placement`]) and place it, or cancel the item
//!   and count a failed placement
//!
//! After too many failed placements in a row the builder stops starting new items
//! until the base changed in a way that could free up space.

mod choose;
pub mod placement;

pub use placement::{choose_build_location, find_pos};

use crate::bot_debug;
use crate::config::BotConfig;
use crate::context::BotContext;
use crate::order::{Command, Order};
use crate::timer::IntervalTimer;
use crate::world::{ActorCaps, ActorSnapshot, ProductionQueues, QueueSnapshot};

/// Placement strategy for a finished structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum BuildingType {
    /// Generic structure inside the base.
    Building,
    /// Armed structure, placed toward the nearest enemy building.
    Defense,
    /// Placed next to a resource field.
    Refinery,
}

#[derive(Clone, Debug)]
pub struct BaseBuilder {
    category: String,
    wait: IntervalTimer,
    fail_count: u32,
    fail_retry: IntervalTimer,
    cached_buildings: usize,
    cached_base_providers: usize,
    minimum_excess_power: i32,
    /// Own buildings as of the last pass.
    player_buildings: Vec<ActorSnapshot>,
}

impl BaseBuilder {
    pub fn new(category: impl Into<String>, config: &BotConfig) -> Self {
        Self {
            category: category.into(),
            wait: IntervalTimer::with_countdown(0, 0),
            fail_count: 0,
            fail_retry: IntervalTimer::new(config.structure_production_resume_delay),
            cached_buildings: 0,
            cached_base_providers: 0,
            minimum_excess_power: config.minimum_excess_power,
            player_buildings: Vec::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Consecutive placements that found no legal cell.
    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    /// Excess power the builder currently tries to keep.
    pub fn minimum_excess_power(&self) -> i32 {
        self.minimum_excess_power
    }

    pub fn tick(&mut self, ctx: &mut BotContext<'_>, queues: &dyn ProductionQueues) {
        let config = ctx.config;

        if self.fail_count >= config.maximum_failed_placement_attempts && self.fail_retry.tick() {
            let (buildings, providers) = base_counts(ctx);
            // Retry only if something was destroyed or a new base provider appeared.
            if buildings < self.cached_buildings || providers > self.cached_base_providers {
                bot_debug!(ctx.debug, category = %self.category, "resuming structure production");
                self.fail_count = 0;
            }
        }

        if !self.wait.tick() {
            return;
        }

        self.player_buildings = ctx.own_buildings();
        let threshold = config.excess_power_increase_threshold.max(1);
        let bonus = config.excess_power_increment * (self.player_buildings.len() as i32 / threshold);
        let min = config.minimum_excess_power;
        self.minimum_excess_power = match config.maximum_excess_power {
            0 => min,
            max => (min + bonus).min(max).max(min),
        };

        let mut active = false;
        for queue in queues.queues(ctx.player, &self.category) {
            if queue.enabled && self.tick_queue(ctx, &queue) {
                active = true;
            }
        }

        let random = ctx
            .rng
            .range(0, config.structure_production_random_bonus_delay as i64);
        let delay = if active {
            4 * config.order_latency as i64 + config.structure_production_active_delay as i64
        } else {
            config.structure_production_inactive_delay as i64
        };
        self.wait.set_countdown(delay + random);
    }

    /// Returns whether the queue counts as active for the wait timer.
    fn tick_queue(&mut self, ctx: &mut BotContext<'_>, queue: &QueueSnapshot) -> bool {
        let max_failures = ctx.config.maximum_failed_placement_attempts;

        match &queue.current {
            None if self.fail_count < max_failures => {
                let Some(item) = self.choose_building_to_build(ctx, queue) else {
                    return false;
                };
                ctx.queue(Order::new(Command::StartProduction, queue.actor).with_item(item));
            }
            Some(current) if current.done => {
                let kind = self.classify(ctx, &current.item);
                match choose_build_location(ctx, &current.item, true, kind) {
                    Ok(cell) => {
                        self.fail_count = 0;
                        ctx.queue(
                            Order::new(Command::PlaceBuilding, queue.actor)
                                .with_cell(cell)
                                .with_item(current.item.clone()),
                        );
                    }
                    Err(err) => {
                        ctx.debug.decision(&err);
                        ctx.queue(
                            Order::new(Command::CancelProduction, queue.actor)
                                .with_item(current.item.clone()),
                        );
                        self.fail_count += 1;
                        if self.fail_count == max_failures {
                            (self.cached_buildings, self.cached_base_providers) = base_counts(ctx);
                        }
                    }
                }
            }
            _ => {}
        }
        true
    }

    fn classify(&self, ctx: &BotContext<'_>, item: &str) -> BuildingType {
        if ctx.world.item_info(item).is_some_and(|info| info.armed) {
            BuildingType::Defense
        } else if ctx.config.common_names.refinery.iter().any(|r| r == item) {
            BuildingType::Refinery
        } else {
            BuildingType::Building
        }
    }
}

/// Own buildings and own base providers.
fn base_counts(ctx: &BotContext<'_>) -> (usize, usize) {
    let buildings = ctx.own_buildings();
    let providers = buildings
        .iter()
        .filter(|b| b.has(ActorCaps::BASE_PROVIDER))
        .count();
    (buildings.len(), providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CPos;
    use crate::test_utils::{BOT, Harness, building};
    use crate::world::{ActorId, Economy, ItemInfo, QueuedItem, WorldQuery};

    fn building_queue(buildable: &[&str], current: Option<(&str, bool)>) -> QueueSnapshot {
        QueueSnapshot {
            actor: ActorId(100),
            category: "Building".to_owned(),
            enabled: true,
            buildable: buildable.iter().map(|b| (*b).to_owned()).collect(),
            current: current.map(|(item, done)| QueuedItem {
                item: item.to_owned(),
                done,
            }),
        }
    }

    fn harness_with_base() -> Harness {
        let mut harness = Harness::new();
        harness.base.initial = CPos::new(20, 20);
        harness.base.defense = CPos::new(20, 20);
        harness.world.spawn(
            building(1, BOT, "fact", 20, 20)
                .with_caps(ActorCaps::BASE_BUILDING | ActorCaps::BASE_PROVIDER),
        );
        harness.world.add_item(ItemInfo::new("powr").with_power(100));
        harness.world.add_item(ItemInfo::new("apwr").with_power(200));
        harness.world.add_item(ItemInfo::new("proc").with_power(-30));
        harness.world.add_item(ItemInfo::new("barr").with_power(-20));
        harness.world.add_item(ItemInfo::new("gun").with_power(-40).armed());
        harness
    }

    #[test]
    fn low_power_builds_strongest_power_plant() {
        let mut harness = harness_with_base();
        harness.world.economy = Economy {
            power_provided: 0,
            power_drained: 50,
            ..Economy::default()
        };
        let queues = QueuesOf(vec![building_queue(&["powr", "apwr", "proc", "barr"], None)]);

        let mut builder = BaseBuilder::new("Building", &harness.config);
        builder.tick(&mut harness.ctx(), &queues);

        let order = harness.orders.iter().next().unwrap();
        assert_eq!(order.command, Command::StartProduction);
        assert_eq!(order.subject, Some(ActorId(100)));
        assert_eq!(order.item.as_deref(), Some("apwr"));
    }

    #[test]
    fn finished_item_is_placed_on_a_legal_cell() {
        let mut harness = harness_with_base();
        harness.world.economy.power_provided = 500;

        let mut builder = BaseBuilder::new("Building", &harness.config);
        let queues = QueuesOf(vec![building_queue(&["barr"], Some(("barr", true)))]);
        builder.tick(&mut harness.ctx(), &queues);

        let order = harness.orders.iter().next().unwrap();
        assert_eq!(order.command, Command::PlaceBuilding);
        assert_eq!(order.item.as_deref(), Some("barr"));
        let cell = order.target_cell().unwrap();
        assert!(harness.world.can_place_building(BOT, "barr", cell));
        assert_eq!(builder.fail_count(), 0);
    }

    #[test]
    fn repeated_placement_failures_pause_production() {
        let mut harness = harness_with_base();
        harness.world.economy.power_provided = 500;
        for x in 0..64 {
            for y in 0..64 {
                harness.world.blocked.insert(CPos::new(x, y));
            }
        }

        let mut builder = BaseBuilder::new("Building", &harness.config);
        let done = QueuesOf(vec![building_queue(&["barr"], Some(("barr", true)))]);
        for _ in 0..3 {
            builder.wait.set_countdown(0);
            builder.tick(&mut harness.ctx(), &done);
        }
        assert_eq!(builder.fail_count(), 3);
        assert!(harness.orders.iter().all(|o| o.command == Command::CancelProduction));

        let idle = QueuesOf(vec![building_queue(&["barr"], None)]);
        let before = harness.orders.len();
        builder.wait.set_countdown(0);
        builder.tick(&mut harness.ctx(), &idle);
        assert_eq!(harness.orders.len(), before);
    }

    #[test]
    fn minimum_excess_power_scales_with_base_size() {
        let mut harness = harness_with_base();
        harness.config.minimum_excess_power = 10;
        harness.config.maximum_excess_power = 40;
        harness.config.excess_power_increment = 10;
        harness.config.excess_power_increase_threshold = 1;
        harness.world.spawn(building(2, BOT, "powr", 25, 25));

        let mut builder = BaseBuilder::new("Building", &harness.config);
        builder.tick(&mut harness.ctx(), &QueuesOf(Vec::new()));
        assert_eq!(builder.minimum_excess_power(), 30);

        for id in 3..8 {
            harness.world.spawn(building(id, BOT, "powr", 30, id as i32));
        }
        builder.wait.set_countdown(0);
        builder.tick(&mut harness.ctx(), &QueuesOf(Vec::new()));
        assert_eq!(builder.minimum_excess_power(), 40);
    }

    #[test]
    fn zero_excess_power_cap_keeps_the_minimum_fixed() {
        let mut harness = harness_with_base();
        harness.config.minimum_excess_power = 10;
        harness.config.maximum_excess_power = 0;
        harness.config.excess_power_increment = 10;
        harness.config.excess_power_increase_threshold = 1;
        for id in 2..6 {
            harness.world.spawn(building(id, BOT, "powr", 30, id as i32));
        }

        let mut builder = BaseBuilder::new("Building", &harness.config);
        builder.tick(&mut harness.ctx(), &QueuesOf(Vec::new()));
        assert_eq!(builder.minimum_excess_power(), 10);
    }

    #[test]
    fn armed_structures_are_defenses() {
        let mut harness = harness_with_base();
        let builder = BaseBuilder::new("Defense", &harness.config);
        let ctx = harness.ctx();
        assert_eq!(builder.classify(&ctx, "gun"), BuildingType::Defense);
        assert_eq!(builder.classify(&ctx, "proc"), BuildingType::Refinery);
        assert_eq!(builder.classify(&ctx, "barr"), BuildingType::Building);
    }

    /// Fixed queue list, independent of the harness world.
    struct QueuesOf(Vec<QueueSnapshot>);

    impl ProductionQueues for QueuesOf {
        fn queues(&self, _player: crate::world::PlayerId, category: &str) -> Vec<QueueSnapshot> {
            self.0
                .iter()
                .filter(|q| q.category == category)
                .cloned()
                .collect()
        }
    }
}
