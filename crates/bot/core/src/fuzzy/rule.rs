//! Rule data and compiled rules.
//!
//! A rule reads "if A is X and B is (Y or Z) then Out is W". In data form that is a
//! [`RuleSpec`]: a list of [`ClauseSpec`]s, each naming one input variable and the
//! terms it may take, plus the output term. Compiling a spec resolves every name to an
//! index so evaluation does no string comparisons.

use super::variable::FuzzyVariable;
use crate::error::ConfigError;

/// One antecedent clause: `variable is (terms[0] or terms[1] or ...)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClauseSpec {
    pub variable: &'static str,
    pub terms: &'static [&'static str],
}

/// Conjunction of clauses implying one output term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSpec {
    pub when: &'static [ClauseSpec],
    pub then: &'static str,
}

/// Builds a [`RuleSpec`] that reads like the rule it encodes.
///
/// ```
/// use bot_core::fuzzy::RuleSpec;
/// use bot_core::fuzzy_rule;
///
/// const RULE: RuleSpec = fuzzy_rule!(
///     "OwnHealth" is ["Normal"] and "RelativeSpeed" is ["Slow", "Equal"] => "Attack"
/// );
/// assert_eq!(RULE.when.len(), 2);
/// ```
#[macro_export]
macro_rules! fuzzy_rule {
    ($($variable:literal is [$($term:literal),+ $(,)?])and+ => $then:literal) => {
        $crate::fuzzy::RuleSpec {
            when: &[$($crate::fuzzy::ClauseSpec {
                variable: $variable,
                terms: &[$($term),+],
            }),+],
            then: $then,
        }
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Clause {
    variable: usize,
    terms: Vec<usize>,
}

/// A rule with names resolved to variable and term indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuzzyRule {
    clauses: Vec<Clause>,
    output: usize,
}

impl FuzzyRule {
    pub fn compile(
        spec: &RuleSpec,
        inputs: &[FuzzyVariable],
        output: &FuzzyVariable,
    ) -> Result<Self, ConfigError> {
        let mut clauses = Vec::with_capacity(spec.when.len());
        for clause in spec.when {
            let variable = inputs
                .iter()
                .position(|v| v.name() == clause.variable)
                .ok_or_else(|| ConfigError::UnknownFuzzyVariable(clause.variable.to_owned()))?;

            let terms = clause
                .terms
                .iter()
                .map(|term| {
                    inputs[variable]
                        .term_index(term)
                        .ok_or_else(|| ConfigError::UnknownFuzzyTerm {
                            variable: clause.variable.to_owned(),
                            term: (*term).to_owned(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            clauses.push(Clause { variable, terms });
        }

        let output_index =
            output
                .term_index(spec.then)
                .ok_or_else(|| ConfigError::UnknownFuzzyTerm {
                    variable: output.name().to_owned(),
                    term: spec.then.to_owned(),
                })?;

        Ok(Self {
            clauses,
            output: output_index,
        })
    }

    /// Output term index this rule implies.
    pub fn output(&self) -> usize {
        self.output
    }

    /// Firing strength: min over clauses of the max over each clause's terms.
    ///
    /// `values[i]` is the crisp value of `inputs[i]`; missing values read as 0.
    pub fn strength(&self, inputs: &[FuzzyVariable], values: &[f64]) -> f64 {
        self.clauses
            .iter()
            .map(|clause| {
                let x = values.get(clause.variable).copied().unwrap_or(0.0);
                let variable = &inputs[clause.variable];
                clause
                    .terms
                    .iter()
                    .map(|&term| variable.degree(term, x))
                    .fold(0.0, f64::max)
            })
            .fold(1.0, f64::min)
    }
}
