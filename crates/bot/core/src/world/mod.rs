//! Surfaces the bot consumes from its host.
//!
//! The host owns the simulation. The bot only sees it through three traits:
//!
//! - [`WorldQuery`]: read-only snapshots of actors, players, economy and map rules
//! - [`ProductionQueues`]: what each production queue can build and is building
//! - [`OrderSink`]: where finished decisions are delivered
//!
//! Snapshots are plain values. The bot never holds a reference into host state across
//! ticks; handles such as [`ActorId`] are re-resolved every time they are used.

mod query;
mod types;

pub use query::{OrderSink, ProductionQueues, WorldQuery};
pub use types::{
    ActivityKind, ActorCaps, ActorId, ActorSnapshot, AmmoPool, DamageEvent, DamageState,
    Economy, ItemInfo, PlayerId, QueueSnapshot, QueuedItem, Stance, SupportPowerSnapshot,
};
