//! "Should this force engage or retreat?"
//!
//! Two policies share the same variables and differ only in the rules applied when
//! the own force is healthy:
//!
//! - [`FleePolicy::General`]: a healthy force always engages
//! - [`FleePolicy::Rush`]: a healthy force only engages when clearly stronger, used
//!   to decide opportunistic attacks on an enemy base
//!
//! # Inputs
//!
//! | variable              | domain     | derived from                                  |
//! |-----------------------|------------|-----------------------------------------------|
//! | `OwnHealth`           | 0..=100    | summed hit points over summed maximum         |
//! | `EnemyHealth`         | 0..=100    | same, for the enemy force                     |
//! | `RelativeAttackPower` | 0..=999    | own / enemy summed damage rating, times 100   |
//! | `RelativeSpeed`       | 0..=999    | own / enemy average speed, times 100          |

use strum::Display;

use super::engine::MamdaniEngine;
use super::rule::RuleSpec;
use super::variable::FuzzyVariable;
use crate::debug::BotDebug;
use crate::error::{ConfigError, DecisionError};
use crate::fuzzy_rule;
use crate::world::{ActorCaps, ActorSnapshot};

pub const OWN_HEALTH: &str = "OwnHealth";
pub const ENEMY_HEALTH: &str = "EnemyHealth";
pub const RELATIVE_ATTACK_POWER: &str = "RelativeAttackPower";
pub const RELATIVE_SPEED: &str = "RelativeSpeed";
pub const ATTACK_OR_FLEE: &str = "AttackOrFlee";

/// Relative values are clamped to this ceiling; an empty enemy force reads as it.
pub const RELATIVE_MAX: f64 = 999.0;

static NORMAL_OWN_HEALTH: &[RuleSpec] = &[fuzzy_rule!(
    "OwnHealth" is ["Normal"]
        and "EnemyHealth" is ["NearDead", "Injured", "Normal"]
        and "RelativeAttackPower" is ["Weak", "Equal", "Strong"]
        and "RelativeSpeed" is ["Slow", "Equal", "Fast"]
        => "Attack"
)];

static RUSH_NORMAL_OWN_HEALTH: &[RuleSpec] = &[
    fuzzy_rule!(
        "OwnHealth" is ["Normal"]
            and "EnemyHealth" is ["NearDead", "Injured", "Normal"]
            and "RelativeAttackPower" is ["Strong"]
            and "RelativeSpeed" is ["Slow", "Equal", "Fast"]
            => "Attack"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["Normal"]
            and "EnemyHealth" is ["NearDead", "Injured", "Normal"]
            and "RelativeAttackPower" is ["Weak", "Equal"]
            and "RelativeSpeed" is ["Slow", "Equal", "Fast"]
            => "Flee"
    ),
];

static INJURED_OWN_HEALTH: &[RuleSpec] = &[
    fuzzy_rule!(
        "OwnHealth" is ["Injured"]
            and "EnemyHealth" is ["NearDead"]
            and "RelativeAttackPower" is ["Weak", "Equal", "Strong"]
            and "RelativeSpeed" is ["Slow", "Equal", "Fast"]
            => "Attack"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["Injured"]
            and "EnemyHealth" is ["Injured", "Normal"]
            and "RelativeAttackPower" is ["Equal", "Strong"]
            and "RelativeSpeed" is ["Slow", "Equal", "Fast"]
            => "Attack"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["Injured"]
            and "EnemyHealth" is ["Injured", "Normal"]
            and "RelativeAttackPower" is ["Weak"]
            and "RelativeSpeed" is ["Slow"]
            => "Attack"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["Injured"]
            and "EnemyHealth" is ["Injured", "Normal"]
            and "RelativeAttackPower" is ["Weak"]
            and "RelativeSpeed" is ["Equal", "Fast"]
            => "Flee"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["Injured"]
            and "EnemyHealth" is ["NearDead", "Injured", "Normal"]
            and "RelativeAttackPower" is ["Weak", "Equal", "Strong"]
            and "RelativeSpeed" is ["Slow"]
            => "Attack"
    ),
];

static NEAR_DEAD_OWN_HEALTH: &[RuleSpec] = &[
    fuzzy_rule!(
        "OwnHealth" is ["NearDead"]
            and "EnemyHealth" is ["NearDead", "Injured"]
            and "RelativeAttackPower" is ["Equal", "Strong"]
            and "RelativeSpeed" is ["Slow", "Equal"]
            => "Attack"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["NearDead"]
            and "EnemyHealth" is ["NearDead", "Injured"]
            and "RelativeAttackPower" is ["Weak"]
            and "RelativeSpeed" is ["Equal", "Fast"]
            => "Flee"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["NearDead"]
            and "EnemyHealth" is ["Normal"]
            and "RelativeAttackPower" is ["Weak"]
            and "RelativeSpeed" is ["Equal", "Fast"]
            => "Flee"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["NearDead"]
            and "EnemyHealth" is ["Normal"]
            and "RelativeAttackPower" is ["Equal", "Strong"]
            and "RelativeSpeed" is ["Fast"]
            => "Flee"
    ),
    fuzzy_rule!(
        "OwnHealth" is ["NearDead"]
            and "EnemyHealth" is ["Injured"]
            and "RelativeAttackPower" is ["Equal"]
            and "RelativeSpeed" is ["Fast"]
            => "Flee"
    ),
];

/// Which rule set governs a healthy own force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum FleePolicy {
    General,
    Rush,
}

impl FleePolicy {
    fn rule_tables(self) -> [&'static [RuleSpec]; 3] {
        let normal = match self {
            Self::General => NORMAL_OWN_HEALTH,
            Self::Rush => RUSH_NORMAL_OWN_HEALTH,
        };
        [normal, INJURED_OWN_HEALTH, NEAR_DEAD_OWN_HEALTH]
    }
}

/// Crisp inputs for one engagement question.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyInputs {
    pub own_health: f64,
    pub enemy_health: f64,
    pub relative_attack_power: f64,
    pub relative_speed: f64,
}

impl FuzzyInputs {
    pub fn from_forces(own: &[ActorSnapshot], enemy: &[ActorSnapshot]) -> Self {
        Self {
            own_health: normalized_health(own),
            enemy_health: normalized_health(enemy),
            relative_attack_power: relative_value(own, enemy, attack_power),
            relative_speed: relative_value(own, enemy, average_speed),
        }
    }

    fn as_array(&self) -> [f64; 4] {
        [
            self.own_health,
            self.enemy_health,
            self.relative_attack_power,
            self.relative_speed,
        ]
    }
}

/// Remaining health of a force in percent, truncated; 0 without health-bearing actors.
pub fn normalized_health(actors: &[ActorSnapshot]) -> f64 {
    let (hp, max_hp) = actors
        .iter()
        .filter(|a| a.max_hp > 0)
        .fold((0i64, 0i64), |(hp, max), a| {
            (hp + a.hp as i64, max + a.max_hp as i64)
        });

    if max_hp == 0 {
        return 0.0;
    }
    (hp * 100 / max_hp) as f64
}

/// `own / enemy * 100` of an aggregate, clamped to `[0, 999]`.
///
/// An empty enemy force reads as 999 and an empty own force as 0. Two zero aggregates
/// make the ratio undefined, which also reads as 0.
pub fn relative_value(
    own: &[ActorSnapshot],
    enemy: &[ActorSnapshot],
    aggregate: fn(&[ActorSnapshot]) -> f64,
) -> f64 {
    if enemy.is_empty() {
        return RELATIVE_MAX;
    }
    if own.is_empty() {
        return 0.0;
    }

    let ratio = aggregate(own) / aggregate(enemy) * 100.0;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, RELATIVE_MAX)
    }
}

/// Summed damage rating of armed actors.
pub fn attack_power(actors: &[ActorSnapshot]) -> f64 {
    actors
        .iter()
        .filter(|a| a.has(ActorCaps::ARMED))
        .map(|a| a.damage as i64)
        .sum::<i64>() as f64
}

/// Integer average speed of mobile actors; 0 if none can move.
pub fn average_speed(actors: &[ActorSnapshot]) -> f64 {
    let (sum, count) = actors
        .iter()
        .filter(|a| a.has(ActorCaps::MOBILE))
        .fold((0i64, 0i64), |(sum, count), a| (sum + a.speed as i64, count + 1));

    if count == 0 {
        return 0.0;
    }
    (sum / count) as f64
}

/// Engagement policy backed by a [`MamdaniEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct AttackOrFlee {
    policy: FleePolicy,
    engine: MamdaniEngine,
}

impl AttackOrFlee {
    /// Outputs strictly below this value mean "attack".
    pub const ATTACK_THRESHOLD: f64 = 30.0;

    pub fn new(policy: FleePolicy) -> Result<Self, ConfigError> {
        let health = |name| {
            FuzzyVariable::new(name, 0.0, 100.0)
                .with_term("NearDead", 0.0, 0.0, 20.0, 40.0)
                .with_term("Injured", 30.0, 50.0, 50.0, 70.0)
                .with_term("Normal", 50.0, 80.0, 100.0, 100.0)
        };
        let relative = |name, low, high| {
            FuzzyVariable::new(name, 0.0, 1000.0)
                .with_term(low, 0.0, 0.0, 70.0, 90.0)
                .with_term("Equal", 85.0, 100.0, 100.0, 115.0)
                .with_term(high, 110.0, 150.0, 150.0, 1000.0)
        };

        let inputs = vec![
            health(OWN_HEALTH),
            health(ENEMY_HEALTH),
            relative(RELATIVE_ATTACK_POWER, "Weak", "Strong"),
            relative(RELATIVE_SPEED, "Slow", "Fast"),
        ];
        let output = FuzzyVariable::new(ATTACK_OR_FLEE, 0.0, 50.0)
            .with_term("Attack", 0.0, 15.0, 15.0, 30.0)
            .with_term("Flee", 25.0, 35.0, 35.0, 50.0);

        let engine = MamdaniEngine::new(inputs, output, &policy.rule_tables())?;
        Ok(Self { policy, engine })
    }

    pub fn general() -> Result<Self, ConfigError> {
        Self::new(FleePolicy::General)
    }

    pub fn rush() -> Result<Self, ConfigError> {
        Self::new(FleePolicy::Rush)
    }

    pub fn policy(&self) -> FleePolicy {
        self.policy
    }

    pub fn engine(&self) -> &MamdaniEngine {
        &self.engine
    }

    /// Defuzzified output, or [`DecisionError::NumericDegenerate`] if it is not finite.
    pub fn evaluate(&self, inputs: &FuzzyInputs) -> Result<f64, DecisionError> {
        let output = self.engine.evaluate(&inputs.as_array());
        if output.is_finite() {
            Ok(output)
        } else {
            Err(DecisionError::NumericDegenerate { output })
        }
    }

    /// Attack verdict for crisp inputs; a degenerate output is an error.
    pub fn decide(&self, inputs: &FuzzyInputs) -> Result<bool, DecisionError> {
        self.evaluate(inputs)
            .map(|output| output < Self::ATTACK_THRESHOLD)
    }

    /// Whether `own` should engage `enemy`. A degenerate output means "no".
    pub fn can_attack(
        &self,
        own: &[ActorSnapshot],
        enemy: &[ActorSnapshot],
        debug: BotDebug,
    ) -> bool {
        let inputs = FuzzyInputs::from_forces(own, enemy);
        match self.decide(&inputs) {
            Ok(attack) => attack,
            Err(err) => {
                debug.decision(&err);
                false
            }
        }
    }
}
