use super::membership::Trapezoid;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyTerm {
    pub name: &'static str,
    pub membership: Trapezoid,
}

/// Linguistic variable: a numeric domain partitioned into named terms.
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzyVariable {
    name: &'static str,
    min: f64,
    max: f64,
    terms: Vec<FuzzyTerm>,
}

impl FuzzyVariable {
    pub fn new(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            min,
            max,
            terms: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_term(mut self, name: &'static str, a: f64, b: f64, c: f64, d: f64) -> Self {
        self.terms.push(FuzzyTerm {
            name,
            membership: Trapezoid::new(a, b, c, d),
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn terms(&self) -> &[FuzzyTerm] {
        &self.terms
    }

    pub fn term_index(&self, name: &str) -> Option<usize> {
        self.terms.iter().position(|t| t.name == name)
    }

    /// Degree of membership of `x` in the term at `index`; 0 for an unknown index.
    pub fn degree(&self, index: usize, x: f64) -> f64 {
        self.terms
            .get(index)
            .map_or(0.0, |term| term.membership.degree(x))
    }
}
