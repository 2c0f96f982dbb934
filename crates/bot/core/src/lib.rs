//! Deterministic decision core for a skirmish opponent in a real-time strategy game.
//!
//! The bot runs once per simulation tick inside the host's update loop. It reads fresh
//! snapshots through [`WorldQuery`] and [`ProductionQueues`], decides what to build,
//! how to group units and when to fight or retreat, and hands every decision back to
//! the host as an [`Order`] through an [`OrderSink`].
//!
//! # Module map
//!
//! - [`fuzzy`]: Mamdani engine answering "engage or retreat?"
//! - [`squad`]: squads, their state machines and the manager routing units into them
//! - [`builder`]: per-category structure selection and placement
//! - [`support_power`]: coarse/fine spatial scan for support power targets
//! - [`controller`]: the per-tick orchestrator tying everything together
//!
//! # Determinism
//!
//! Given the same snapshots, seed and tick count the bot issues the same orders.
//! All waiting is expressed as [`IntervalTimer`] countdowns, all randomness comes from
//! the seeded [`BotRng`], and every collection that influences a decision is ordered.

pub mod builder;
pub mod config;
pub mod context;
pub mod controller;
pub mod debug;
pub mod error;
pub mod fuzzy;
pub mod geometry;
pub mod order;
pub mod production;
pub mod rng;
pub mod squad;
pub mod support_power;
pub mod timer;
pub mod world;

#[cfg(test)]
mod test_utils;

pub use builder::{BaseBuilder, BuildingType, choose_build_location, find_pos};
pub use config::{BotConfig, CommonNames};
pub use context::{BaseCenters, BotContext};
pub use controller::BotController;
pub use debug::BotDebug;
pub use error::{BotError, ConfigError, DecisionError, ErrorSeverity};
pub use fuzzy::{AttackOrFlee, FleePolicy, FuzzyInputs, MamdaniEngine, Trapezoid};
pub use geometry::{CPos, MapSize, WDist, cells_in_annulus, cells_in_circle};
pub use order::{Command, Order, OrderQueue, OrderTarget};
pub use rng::BotRng;
pub use squad::{Squad, SquadId, SquadKind, SquadManager, SquadState, StateMachine};
pub use support_power::{
    Consideration, DecisionMetric, SupportPowerDecision, SupportPowerTargeting,
};
pub use timer::IntervalTimer;
pub use world::{
    ActivityKind, ActorCaps, ActorId, ActorSnapshot, AmmoPool, DamageEvent, DamageState,
    Economy, ItemInfo, OrderSink, PlayerId, ProductionQueues, QueueSnapshot, QueuedItem,
    Stance, SupportPowerSnapshot, WorldQuery,
};
