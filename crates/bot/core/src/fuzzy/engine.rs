use super::rule::{FuzzyRule, RuleSpec};
use super::variable::FuzzyVariable;
use crate::error::ConfigError;

/// Mamdani inference over a fixed set of input variables and one output variable.
///
/// - rule strength: min over clauses, max over the terms inside a clause
/// - implication: the output term is clipped at the rule strength
/// - aggregation: max over all rules
/// - defuzzification: centroid, integrated with composite Simpson's rule
///
/// When no rule fires the centroid is `0 / 0` and [`MamdaniEngine::evaluate`]
/// returns NaN. Callers decide what a non-finite answer means.
#[derive(Clone, Debug, PartialEq)]
pub struct MamdaniEngine {
    inputs: Vec<FuzzyVariable>,
    output: FuzzyVariable,
    rules: Vec<FuzzyRule>,
}

impl MamdaniEngine {
    /// Simpson segments used for the centroid integral.
    pub const CENTROID_SEGMENTS: usize = 50;

    pub fn new(
        inputs: Vec<FuzzyVariable>,
        output: FuzzyVariable,
        tables: &[&[RuleSpec]],
    ) -> Result<Self, ConfigError> {
        let rules = tables
            .iter()
            .flat_map(|table| table.iter())
            .map(|spec| FuzzyRule::compile(spec, &inputs, &output))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            inputs,
            output,
            rules,
        })
    }

    pub fn inputs(&self) -> &[FuzzyVariable] {
        &self.inputs
    }

    pub fn output(&self) -> &FuzzyVariable {
        &self.output
    }

    pub fn rules(&self) -> &[FuzzyRule] {
        &self.rules
    }

    /// Crisp output for crisp inputs given in the order of [`MamdaniEngine::inputs`].
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let strengths: Vec<(usize, f64)> = self
            .rules
            .iter()
            .map(|rule| (rule.output(), rule.strength(&self.inputs, values)))
            .filter(|&(_, strength)| strength > 0.0)
            .collect();

        let aggregated = |x: f64| -> f64 {
            strengths
                .iter()
                .map(|&(term, strength)| strength.min(self.output.degree(term, x)))
                .fold(0.0, f64::max)
        };

        centroid(aggregated, self.output.domain())
    }
}

/// Centroid of `membership` over `[min, max]`.
///
/// Each of the segments is integrated with Simpson's rule over its end points and
/// midpoint, for both the weighted and the plain integral.
fn centroid(membership: impl Fn(f64) -> f64, (min, max): (f64, f64)) -> f64 {
    let segments = MamdaniEngine::CENTROID_SEGMENTS;
    let step = (max - min) / segments as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut left = min;
    let mut left_value = membership(left);

    for i in 0..segments {
        let center = min + step * (i as f64 + 0.5);
        let right = min + step * (i + 1) as f64;
        let center_value = membership(center);
        let right_value = membership(right);

        numerator +=
            step * (left * left_value + 4.0 * center * center_value + right * right_value) / 3.0;
        denominator += step * (left_value + 4.0 * center_value + right_value) / 3.0;

        left = right;
        left_value = right_value;
    }

    numerator / denominator
}
