//! Common error infrastructure for bot-core.
//!
//! Two error families exist and they never mix:
//!
//! - [`DecisionError`]: a single decision produced nothing usable this tick. These are
//!   always recoverable, never cross a tick boundary and are only reported through the
//!   bot's debug channel.
//! - [`ConfigError`]: the tunables handed over at activation are unusable. This is the
//!   only error that can stop [`BotController::activate`](crate::BotController::activate).
//!
//! # Design Principles
//!
//! - **Severity Classification**: every error reports how the caller should react
//! - **Local Failure**: per-tick failures are swallowed where they happen
//! - **Deterministic**: errors carry plain data only, no backtraces or timestamps

use crate::geometry::CPos;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: nothing usable this cycle, retry on the next interval
/// - **Validation**: the configuration is rejected as a whole
/// - **Fatal**: the bot cannot be activated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Recoverable error - the owning policy retries at its next interval.
    ///
    /// Examples: no enemy in range, no legal placement cell
    Recoverable,

    /// Validation error - invalid input that must be fixed before retrying.
    ///
    /// Examples: inverted radius range, unknown fuzzy term
    Validation,

    /// Fatal error - the bot cannot run with this input.
    ///
    /// Examples: a common name the bot relies on is missing
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all bot-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BotError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// A decision that produced nothing usable this tick.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DecisionError {
    /// A scan or search found nothing worth targeting.
    #[error("no valid target for {purpose}")]
    NoValidTarget { purpose: &'static str },

    /// No cell passed the placement checks for `item`.
    #[error("no valid location to place {item} around {center:?}")]
    NoValidLocation { item: String, center: CPos },

    /// The fuzzy engine produced a non-finite output.
    ///
    /// Happens when no rule fires, e.g. all-zero health sums on both sides.
    #[error("fuzzy output {output} is not a finite number")]
    NumericDegenerate { output: f64 },
}

impl BotError for DecisionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoValidTarget { .. } => "NO_VALID_TARGET",
            Self::NoValidLocation { .. } => "NO_VALID_LOCATION",
            Self::NumericDegenerate { .. } => "NUMERIC_DEGENERATE",
        }
    }
}

/// Invalid tunables detected at activation time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("common name group `{0}` is empty")]
    MissingCommonName(&'static str),

    #[error("queue list `{0}` is empty")]
    EmptyQueueList(&'static str),

    #[error("interval `{0}` must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("`{field}` range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("`{table}` references `{name}` which is not listed in any common name group")]
    UnknownName { table: &'static str, name: String },

    #[error("fuzzy rule references unknown variable `{0}`")]
    UnknownFuzzyVariable(String),

    #[error("fuzzy rule references unknown term `{term}` of `{variable}`")]
    UnknownFuzzyTerm { variable: String, term: String },

    #[error("support power decision `{order}` is invalid: {reason}")]
    InvalidSupportPower { order: String, reason: &'static str },
}

impl BotError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingCommonName(_) | Self::EmptyQueueList(_) => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCommonName(_) => "MISSING_COMMON_NAME",
            Self::EmptyQueueList(_) => "EMPTY_QUEUE_LIST",
            Self::ZeroInterval(_) => "ZERO_INTERVAL",
            Self::InvertedRange { .. } => "INVERTED_RANGE",
            Self::UnknownName { .. } => "UNKNOWN_NAME",
            Self::UnknownFuzzyVariable(_) => "UNKNOWN_FUZZY_VARIABLE",
            Self::UnknownFuzzyTerm { .. } => "UNKNOWN_FUZZY_TERM",
            Self::InvalidSupportPower { .. } => "INVALID_SUPPORT_POWER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_errors_are_recoverable() {
        let err = DecisionError::NoValidTarget { purpose: "rush" };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.error_code(), "NO_VALID_TARGET");
    }

    #[test]
    fn missing_names_are_fatal() {
        let err = ConfigError::MissingCommonName("power");
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.severity().as_str(), "fatal");
        assert_eq!(err.to_string(), "common name group `power` is empty");
    }
}
