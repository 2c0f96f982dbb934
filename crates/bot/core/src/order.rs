//! Command intents and the throttled outgoing queue.
//!
//! Decisions never mutate the world. They become [`Order`]s pushed onto the bot's
//! [`OrderQueue`], which releases them to the host in FIFO order at a bounded rate so
//! that a burst of decisions (a whole squad retargeting at once) is spread over
//! several ticks.

use std::collections::VecDeque;

use crate::geometry::CPos;
use crate::world::{ActorId, OrderSink};

/// Order names understood by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum Command {
    Move,
    AttackMove,
    Attack,
    Stop,
    Harvest,
    DeployTransform,
    ReturnToBase,
    StartProduction,
    CancelProduction,
    PlaceBuilding,
    SetRallyPoint,
    RepairBuilding,
    /// Activates a support power; the power's order name travels in [`Order::item`].
    SupportPower,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderTarget {
    #[default]
    None,
    Actor(ActorId),
    Cell(CPos),
}

/// A single command intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub command: Command,
    /// Actor receiving the order; `None` for player-level orders.
    pub subject: Option<ActorId>,
    pub target: OrderTarget,
    /// Item or power name for production, placement and support power orders.
    pub item: Option<String>,
    /// Append to the subject's activity queue instead of replacing it.
    pub queued: bool,
}

impl Order {
    pub fn new(command: Command, subject: ActorId) -> Self {
        Self {
            command,
            subject: Some(subject),
            target: OrderTarget::None,
            item: None,
            queued: false,
        }
    }

    /// Order addressed to the player rather than to one actor.
    pub fn for_player(command: Command) -> Self {
        Self {
            command,
            subject: None,
            target: OrderTarget::None,
            item: None,
            queued: false,
        }
    }

    #[must_use]
    pub fn with_cell(mut self, cell: CPos) -> Self {
        self.target = OrderTarget::Cell(cell);
        self
    }

    #[must_use]
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.target = OrderTarget::Actor(actor);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    #[must_use]
    pub fn queued(mut self) -> Self {
        self.queued = true;
        self
    }

    /// Name the host dispatches on.
    pub fn name(&self) -> &str {
        match (self.command, &self.item) {
            (Command::SupportPower, Some(order_name)) => order_name.as_str(),
            (command, _) => <&'static str>::from(command),
        }
    }

    pub fn target_cell(&self) -> Option<CPos> {
        match self.target {
            OrderTarget::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn target_actor(&self) -> Option<ActorId> {
        match self.target {
            OrderTarget::Actor(actor) => Some(actor),
            _ => None,
        }
    }
}

/// FIFO of orders waiting to be handed to the host.
#[derive(Clone, Debug, Default)]
pub struct OrderQueue {
    pending: VecDeque<Order>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: Order) {
        self.pending.push_back(order);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.pending.iter()
    }

    /// Number of orders released this tick: `ceil(pending / quotient)`.
    pub fn quota(&self, quotient: u32) -> usize {
        let n = self.pending.len();
        let q = quotient.max(1) as usize;
        n.div_ceil(q).min(n)
    }

    /// Hands this tick's quota to `sink` and returns how many were issued.
    pub fn flush(&mut self, sink: &mut dyn OrderSink, quotient: u32) -> usize {
        let quota = self.quota(quotient);
        for order in self.pending.drain(..quota) {
            sink.issue(order);
        }
        quota
    }
}
