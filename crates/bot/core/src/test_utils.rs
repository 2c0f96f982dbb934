//! In-memory world and fixtures for unit tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::BotConfig;
use crate::context::{BaseCenters, BotContext};
use crate::debug::BotDebug;
use crate::fuzzy::AttackOrFlee;
use crate::geometry::{CPos, MapSize};
use crate::order::OrderQueue;
use crate::rng::BotRng;
use crate::world::{
    ActorCaps, ActorId, ActorSnapshot, Economy, ItemInfo, PlayerId, ProductionQueues,
    QueueSnapshot, Stance, SupportPowerSnapshot, WorldQuery,
};

pub const BOT: PlayerId = PlayerId(1);
pub const ENEMY: PlayerId = PlayerId(2);

pub fn tank(id: u32, owner: PlayerId, x: i32, y: i32) -> ActorSnapshot {
    ActorSnapshot::new(ActorId(id), owner, "2tnk", CPos::new(x, y))
        .with_caps(ActorCaps::MOBILE | ActorCaps::ARMED)
        .with_health(100, 100)
        .with_damage(10)
        .with_speed(100)
}

pub fn aircraft(id: u32, owner: PlayerId, x: i32, y: i32) -> ActorSnapshot {
    ActorSnapshot::new(ActorId(id), owner, "mig", CPos::new(x, y))
        .with_caps(ActorCaps::MOBILE | ActorCaps::ARMED | ActorCaps::AIRCRAFT)
        .with_health(100, 100)
        .with_damage(20)
        .with_speed(200)
}

pub fn harvester(id: u32, owner: PlayerId, x: i32, y: i32) -> ActorSnapshot {
    let mut harv = ActorSnapshot::new(ActorId(id), owner, "harv", CPos::new(x, y))
        .with_caps(ActorCaps::MOBILE | ActorCaps::HARVESTER)
        .with_health(100, 100)
        .with_speed(60);
    harv.harvester_empty = true;
    harv
}

pub fn building(id: u32, owner: PlayerId, kind: &str, x: i32, y: i32) -> ActorSnapshot {
    ActorSnapshot::new(ActorId(id), owner, kind, CPos::new(x, y))
        .with_caps(ActorCaps::BUILDING)
        .with_health(100, 100)
}

#[derive(Default)]
pub struct TestWorld {
    pub map: MapSize,
    pub actors: BTreeMap<ActorId, ActorSnapshot>,
    pub stances: BTreeMap<(PlayerId, PlayerId), Stance>,
    pub live: Vec<PlayerId>,
    pub economy: Economy,
    pub items: BTreeMap<String, ItemInfo>,
    pub blocked: BTreeSet<CPos>,
    pub resources: BTreeSet<CPos>,
    pub queues: Vec<QueueSnapshot>,
    pub powers: Vec<SupportPowerSnapshot>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            map: MapSize::new(64, 64),
            live: vec![BOT, ENEMY],
            ..Self::default()
        }
    }

    pub fn spawn(&mut self, actor: ActorSnapshot) {
        self.actors.insert(actor.id, actor);
    }

    pub fn remove(&mut self, id: ActorId) {
        self.actors.remove(&id);
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorSnapshot> {
        self.actors.get_mut(&id)
    }

    pub fn add_item(&mut self, item: ItemInfo) {
        self.items.insert(item.name.clone(), item);
    }
}

impl WorldQuery for TestWorld {
    fn map_size(&self) -> MapSize {
        self.map
    }

    fn actors(&self) -> Vec<ActorSnapshot> {
        self.actors.values().cloned().collect()
    }

    fn actor(&self, id: ActorId) -> Option<ActorSnapshot> {
        self.actors.get(&id).cloned()
    }

    fn stance(&self, of: PlayerId, toward: PlayerId) -> Stance {
        if of == toward {
            return Stance::Ally;
        }
        self.stances
            .get(&(of, toward))
            .copied()
            .unwrap_or(Stance::Enemy)
    }

    fn live_players(&self) -> Vec<PlayerId> {
        self.live.clone()
    }

    fn economy(&self, _player: PlayerId) -> Economy {
        self.economy
    }

    fn item_info(&self, name: &str) -> Option<ItemInfo> {
        self.items.get(name).cloned()
    }

    fn can_place_building(&self, _player: PlayerId, _item: &str, cell: CPos) -> bool {
        self.map.contains(cell)
            && !self.blocked.contains(&cell)
            && !self
                .actors
                .values()
                .any(|a| a.cell == cell && a.has(ActorCaps::BUILDING))
    }

    fn is_close_enough_to_base(&self, _player: PlayerId, _item: &str, _cell: CPos) -> bool {
        true
    }

    fn is_cell_buildable(&self, cell: CPos, _producer: &str) -> bool {
        self.map.contains(cell) && !self.blocked.contains(&cell)
    }

    fn has_resources(&self, cell: CPos) -> bool {
        self.resources.contains(&cell)
    }

    fn next_resource_cell(&self, _harvester: ActorId) -> Option<CPos> {
        self.resources.iter().next().copied()
    }

    fn support_powers(&self, _player: PlayerId) -> Vec<SupportPowerSnapshot> {
        self.powers.clone()
    }
}

impl ProductionQueues for TestWorld {
    fn queues(&self, _player: PlayerId, category: &str) -> Vec<QueueSnapshot> {
        self.queues
            .iter()
            .filter(|q| q.category == category)
            .cloned()
            .collect()
    }
}

/// Everything a [`BotContext`] borrows, owned in one place.
pub struct Harness {
    pub world: TestWorld,
    pub config: BotConfig,
    pub rng: BotRng,
    pub orders: OrderQueue,
    pub attack_or_flee: AttackOrFlee,
    pub base: BaseCenters,
    pub tick: u64,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            world: TestWorld::new(),
            config: BotConfig::default(),
            rng: BotRng::new(7),
            orders: OrderQueue::new(),
            attack_or_flee: AttackOrFlee::general().expect("general rules compile"),
            base: BaseCenters::default(),
            tick: 1,
        }
    }

    pub fn ctx(&mut self) -> BotContext<'_> {
        BotContext {
            world: &self.world,
            player: BOT,
            config: &self.config,
            rng: &mut self.rng,
            orders: &mut self.orders,
            debug: BotDebug::new(false, BOT),
            base: self.base,
            attack_or_flee: &self.attack_or_flee,
            tick: self.tick,
        }
    }
}
