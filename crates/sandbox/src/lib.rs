//! In-memory host for running and testing skirmish bots.
//!
//! - [`Ruleset`]: actor templates and which actors host which production queues
//! - [`Scenario`]: map size and starting placements
//! - [`SandboxWorld`]: the simulation, implementing the bot's query surfaces
//! - [`Skirmish`]: the host loop feeding orders and damage between bots and world

pub mod error;
pub mod logging;
pub mod rules;
pub mod scenario;
pub mod skirmish;
pub mod world;

pub use error::{Result, SandboxError};
pub use logging::{init_test_tracing, init_tracing};
pub use rules::{ActorTemplate, QueueRule, Ruleset};
pub use scenario::{Placement, Scenario};
pub use skirmish::{IssuedOrder, Skirmish};
pub use world::{DEFAULT_BASE_RADIUS, Hit, PlayerState, PowerState, SandboxWorld};
