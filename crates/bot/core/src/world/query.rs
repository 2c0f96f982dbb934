use super::types::{
    ActorSnapshot, ActorId, Economy, ItemInfo, PlayerId, QueueSnapshot, Stance,
    SupportPowerSnapshot,
};
use crate::geometry::{CPos, MapSize, WDist};
use crate::order::Order;

/// Read-only access to the simulation.
///
/// Every call returns a fresh snapshot. Implementations must return actors ordered by
/// [`ActorId`] so that decisions do not depend on storage order.
pub trait WorldQuery {
    fn map_size(&self) -> MapSize;

    /// All actors in the world, ordered by id.
    fn actors(&self) -> Vec<ActorSnapshot>;

    fn actor(&self, id: ActorId) -> Option<ActorSnapshot> {
        self.actors().into_iter().find(|a| a.id == id)
    }

    fn actors_in_circle(&self, center: CPos, radius: WDist) -> Vec<ActorSnapshot> {
        self.actors()
            .into_iter()
            .filter(|a| a.cell.within(center, radius))
            .collect()
    }

    fn actors_in_box(&self, top_left: CPos, bottom_right: CPos) -> Vec<ActorSnapshot> {
        self.actors()
            .into_iter()
            .filter(|a| a.cell.in_box(top_left, bottom_right))
            .collect()
    }

    /// How `of` regards `toward`. A player is always its own ally.
    fn stance(&self, of: PlayerId, toward: PlayerId) -> Stance;

    /// Players that have neither won nor lost yet.
    fn live_players(&self) -> Vec<PlayerId>;

    fn economy(&self, player: PlayerId) -> Economy;

    /// Rules lookup for a producible actor type.
    fn item_info(&self, name: &str) -> Option<ItemInfo>;

    /// Footprint and terrain legality of placing `item` at `cell`.
    fn can_place_building(&self, player: PlayerId, item: &str, cell: CPos) -> bool;

    /// Whether `cell` is close enough to the player's existing base for `item`.
    fn is_close_enough_to_base(&self, player: PlayerId, item: &str, cell: CPos) -> bool;

    /// Whether units produced by `producer` may rally at `cell`.
    fn is_cell_buildable(&self, cell: CPos, producer: &str) -> bool;

    fn has_resources(&self, cell: CPos) -> bool;

    /// Safest resource cell for an idle harvester, as judged by the host's pathfinder.
    fn next_resource_cell(&self, harvester: ActorId) -> Option<CPos>;

    fn support_powers(&self, player: PlayerId) -> Vec<SupportPowerSnapshot>;
}

/// Access to a player's production queues.
pub trait ProductionQueues {
    /// Queues of `player` in `category`, in host order.
    fn queues(&self, player: PlayerId, category: &str) -> Vec<QueueSnapshot>;
}

/// Destination of the bot's decisions. Fire-and-forget.
pub trait OrderSink {
    fn issue(&mut self, order: Order);
}

impl OrderSink for Vec<Order> {
    fn issue(&mut self, order: Order) {
        self.push(order);
    }
}
