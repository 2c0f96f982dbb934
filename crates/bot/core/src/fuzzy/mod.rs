//! Small Mamdani fuzzy inference engine and the attack-or-flee policies built on it.
//!
//! # Design
//!
//! The engine is split the way the data flows:
//!
//! - [`membership`]: trapezoidal membership functions
//! - [`variable`]: linguistic variables, a numeric domain plus named terms
//! - [`rule`]: declarative rule data and its compiled, index-based form
//! - [`engine`]: min/max inference and centroid defuzzification
//! - [`attack_or_flee`]: the two rule tables and the crisp inputs they read
//!
//! Rule tables are `static` data resolved against the variables once, when an engine
//! is built. A misspelt variable or term is a [`ConfigError`](crate::ConfigError) at
//! construction, never a runtime surprise. Evaluation is a pure function of the crisp
//! inputs.

pub mod attack_or_flee;
pub mod engine;
pub mod membership;
pub mod rule;
pub mod variable;

pub use attack_or_flee::{AttackOrFlee, FleePolicy, FuzzyInputs};
pub use engine::MamdaniEngine;
pub use membership::Trapezoid;
pub use rule::{ClauseSpec, FuzzyRule, RuleSpec};
pub use variable::{FuzzyTerm, FuzzyVariable};
