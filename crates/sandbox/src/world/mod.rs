//! In-memory skirmish host.
//!
//! [`SandboxWorld`] owns a tiny simulation: single-cell structures, units that
//! walk one cell per tick, production with build times, harvesting, direct-fire
//! combat and support powers. It implements [`WorldQuery`] and
//! [`ProductionQueues`] so a [`bot_core::BotController`] can play in it, and
//! applies the bot's orders through [`SandboxWorld::apply`].

mod orders;
mod simulate;

pub use simulate::{ATTACK_RANGE, HARVEST_RATE, REPAIR_RATE};

use std::collections::{BTreeMap, BTreeSet};

use bot_core::{
    ActorCaps, ActorId, ActorSnapshot, CPos, DamageEvent, Economy, ItemInfo, MapSize, PlayerId,
    ProductionQueues, QueueSnapshot, QueuedItem, Stance, SupportPowerSnapshot, WorldQuery,
    cells_in_circle,
};

use crate::error::{Result, SandboxError};
use crate::rules::{ActorTemplate, Ruleset};

/// Cells around an own structure in which new structures may be placed.
pub const DEFAULT_BASE_RADIUS: i32 = 14;

/// A hit the owner of `event.victim` should hear about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub owner: PlayerId,
    pub event: DamageEvent,
}

/// A support power owned by one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerState {
    pub key: String,
    pub order_name: String,
    pub charge_time: u32,
    pub remaining: u32,
    pub disabled: bool,
    pub radius: i32,
    pub damage: i32,
}

impl PowerState {
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub cash: i32,
    pub resources: i32,
    pub outage_ticks: u32,
    pub powers: Vec<PowerState>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Production {
    item: String,
    remaining: u32,
    paid: i32,
}

/// What a unit was told to do beyond its displayed activity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Activity {
    destination: Option<CPos>,
    target: Option<ActorId>,
    /// Engages enemies met on the way.
    attack_move: bool,
    deploy_on_arrival: bool,
}

pub struct SandboxWorld {
    map: MapSize,
    rules: Ruleset,
    actors: BTreeMap<ActorId, ActorSnapshot>,
    next_id: u32,
    players: BTreeMap<PlayerId, PlayerState>,
    stances: BTreeMap<(PlayerId, PlayerId), Stance>,
    blocked: BTreeSet<CPos>,
    resources: BTreeSet<CPos>,
    /// Keyed by hosting actor and queue category.
    production: BTreeMap<(ActorId, String), Production>,
    activities: BTreeMap<ActorId, Activity>,
    pending_hits: Vec<Hit>,
    base_radius: i32,
    tick: u64,
}

impl SandboxWorld {
    pub fn new(map: MapSize, rules: Ruleset) -> Self {
        Self {
            map,
            rules,
            actors: BTreeMap::new(),
            next_id: 1,
            players: BTreeMap::new(),
            stances: BTreeMap::new(),
            blocked: BTreeSet::new(),
            resources: BTreeSet::new(),
            production: BTreeMap::new(),
            activities: BTreeMap::new(),
            pending_hits: Vec::new(),
            base_radius: DEFAULT_BASE_RADIUS,
            tick: 0,
        }
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    /// Simulation ticks advanced so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn add_player(&mut self, player: PlayerId, cash: i32) {
        self.players.insert(
            player,
            PlayerState {
                cash,
                ..PlayerState::default()
            },
        );
    }

    pub fn player(&self, player: PlayerId) -> Option<&PlayerState> {
        self.players.get(&player)
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(&player)
    }

    /// Sets how `of` regards `toward`. Unset pairs are enemies.
    pub fn set_stance(&mut self, of: PlayerId, toward: PlayerId, stance: Stance) {
        self.stances.insert((of, toward), stance);
    }

    pub fn set_base_radius(&mut self, radius: i32) {
        self.base_radius = radius;
    }

    pub fn block(&mut self, cell: CPos) {
        self.blocked.insert(cell);
    }

    pub fn add_resource(&mut self, cell: CPos) {
        self.resources.insert(cell);
    }

    pub fn add_support_power(&mut self, player: PlayerId, power: PowerState) {
        if let Some(state) = self.players.get_mut(&player) {
            state.powers.push(power);
        }
    }

    /// Spawns a full-health actor of type `kind`.
    pub fn spawn(&mut self, owner: PlayerId, kind: &str, cell: CPos) -> Result<ActorId> {
        let template = self.template(kind)?.clone();
        let id = self.allocate_id();
        let actor = template.spawn(id, owner, cell);
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Inserts a hand-built actor under a fresh id.
    pub fn insert(&mut self, mut actor: ActorSnapshot) -> ActorId {
        let id = self.allocate_id();
        actor.id = id;
        self.actors.insert(id, actor);
        id
    }

    pub fn remove(&mut self, id: ActorId) -> Option<ActorSnapshot> {
        self.activities.remove(&id);
        self.production.retain(|(host, _), _| *host != id);
        self.actors.remove(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorSnapshot> {
        self.actors.get_mut(&id)
    }

    /// Actors of `player`, ordered by id.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &ActorSnapshot> {
        self.actors.values().filter(move |a| a.owner == player)
    }

    pub fn count_of(&self, player: PlayerId, kind: &str) -> usize {
        self.owned_by(player).filter(|a| a.kind == kind).count()
    }

    /// Marks every item in production as finished.
    pub fn finish_production(&mut self) {
        for production in self.production.values_mut() {
            production.remaining = 0;
        }
    }

    fn allocate_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    fn template(&self, kind: &str) -> Result<&ActorTemplate> {
        self.rules
            .template(kind)
            .ok_or_else(|| SandboxError::UnknownType(kind.to_owned()))
    }

    fn owns_any(&self, player: PlayerId, kinds: &[String]) -> bool {
        self.owned_by(player).any(|a| kinds.contains(&a.kind))
    }

    /// Structures of `player` may be produced while any prerequisite stands.
    fn prerequisites_met(&self, player: PlayerId, template: &ActorTemplate) -> bool {
        template.prerequisites.is_empty() || self.owns_any(player, &template.prerequisites)
    }

    fn structure_at(&self, cell: CPos) -> bool {
        self.actors
            .values()
            .any(|a| a.cell == cell && a.has(ActorCaps::BUILDING))
    }

    /// Nearest cell around `center` free of structures and other actors.
    fn free_cell_near(&self, center: CPos) -> CPos {
        cells_in_circle(self.map, center, 4)
            .into_iter()
            .find(|&cell| {
                !self.blocked.contains(&cell) && !self.actors.values().any(|a| a.cell == cell)
            })
            .unwrap_or(center)
    }

    fn spend(&mut self, player: PlayerId, amount: i32) -> bool {
        let Some(state) = self.players.get_mut(&player) else {
            return false;
        };
        if state.cash + state.resources < amount {
            return false;
        }
        let from_cash = amount.min(state.cash);
        state.cash -= from_cash;
        state.resources -= amount - from_cash;
        true
    }

    fn refund(&mut self, player: PlayerId, amount: i32) {
        if let Some(state) = self.players.get_mut(&player) {
            state.cash += amount;
        }
    }

    fn storage_capacity(&self, player: PlayerId) -> i32 {
        self.owned_by(player)
            .filter_map(|a| self.rules.template(&a.kind))
            .map(|t| t.storage)
            .sum()
    }
}

impl WorldQuery for SandboxWorld {
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
        self.players
            .keys()
            .copied()
            .filter(|&p| self.owned_by(p).next().is_some())
            .collect()
    }

    fn economy(&self, player: PlayerId) -> Economy {
        let (provided, drained) = self
            .owned_by(player)
            .filter(|a| a.has(ActorCaps::BUILDING))
            .filter_map(|a| self.rules.template(&a.kind))
            .fold((0, 0), |(provided, drained), t| {
                if t.power >= 0 {
                    (provided + t.power, drained)
                } else {
                    (provided, drained - t.power)
                }
            });
        let state = self.players.get(&player).cloned().unwrap_or_default();

        Economy {
            cash: state.cash,
            resources: state.resources,
            resource_capacity: self.storage_capacity(player),
            power_provided: provided,
            power_drained: drained,
            power_outage_ticks: state.outage_ticks,
        }
    }

    fn item_info(&self, name: &str) -> Option<ItemInfo> {
        self.rules.template(name).map(ActorTemplate::item_info)
    }

    fn can_place_building(&self, _player: PlayerId, _item: &str, cell: CPos) -> bool {
        self.map.contains(cell)
            && !self.blocked.contains(&cell)
            && !self.resources.contains(&cell)
            && !self.structure_at(cell)
    }

    fn is_close_enough_to_base(&self, player: PlayerId, _item: &str, cell: CPos) -> bool {
        let radius_sq = self.base_radius as i64 * self.base_radius as i64;
        let mut structures = self
            .owned_by(player)
            .filter(|a| a.has(ActorCaps::BUILDING))
            .peekable();
        structures.peek().is_none() || structures.any(|a| a.cell.distance_sq(cell) <= radius_sq)
    }

    fn is_cell_buildable(&self, cell: CPos, _producer: &str) -> bool {
        self.map.contains(cell) && !self.blocked.contains(&cell) && !self.structure_at(cell)
    }

    fn has_resources(&self, cell: CPos) -> bool {
        self.resources.contains(&cell)
    }

    fn next_resource_cell(&self, harvester: ActorId) -> Option<CPos> {
        let from = self.actors.get(&harvester)?.cell;
        self.resources
            .iter()
            .copied()
            .min_by_key(|cell| (cell.distance_sq(from), cell.y, cell.x))
    }

    fn support_powers(&self, player: PlayerId) -> Vec<SupportPowerSnapshot> {
        self.players
            .get(&player)
            .map(|state| {
                state
                    .powers
                    .iter()
                    .map(|p| SupportPowerSnapshot {
                        key: p.key.clone(),
                        order_name: p.order_name.clone(),
                        ready: p.is_ready(),
                        disabled: p.disabled,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ProductionQueues for SandboxWorld {
    fn queues(&self, player: PlayerId, category: &str) -> Vec<QueueSnapshot> {
        let Some(rule) = self.rules.queue_rule(category) else {
            return Vec::new();
        };
        let buildable: Vec<String> = self
            .rules
            .templates()
            .filter(|t| t.queue.as_deref() == Some(category))
            .filter(|t| self.prerequisites_met(player, t))
            .map(|t| t.name.clone())
            .collect();

        self.owned_by(player)
            .filter(|a| rule.hosts.contains(&a.kind))
            .map(|host| QueueSnapshot {
                actor: host.id,
                category: category.to_owned(),
                enabled: true,
                buildable: buildable.clone(),
                current: self
                    .production
                    .get(&(host.id, category.to_owned()))
                    .map(|p| QueuedItem {
                        item: p.item.clone(),
                        done: p.remaining == 0,
                    }),
            })
            .collect()
    }
}
