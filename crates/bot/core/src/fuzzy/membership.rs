/// Trapezoidal membership function over the points `a <= b <= c <= d`.
///
/// Degree rises linearly from 0 at `a` to 1 at `b`, stays 1 until `c`, and falls back
/// to 0 at `d`. Shoulders are expressed by repeating a point, e.g. `(0, 0, 20, 40)` is
/// fully true at 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trapezoid {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Trapezoid {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn degree(&self, x: f64) -> f64 {
        if x < self.a || x > self.d {
            0.0
        } else if x >= self.b && x <= self.c {
            1.0
        } else if x < self.b {
            (x - self.a) / (self.b - self.a)
        } else {
            (self.d - x) / (self.d - self.c)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_shoulder_is_true_at_origin() {
        let near_dead = Trapezoid::new(0.0, 0.0, 20.0, 40.0);
        assert_eq!(near_dead.degree(0.0), 1.0);
        assert_eq!(near_dead.degree(20.0), 1.0);
        assert_eq!(near_dead.degree(30.0), 0.5);
        assert_eq!(near_dead.degree(40.0), 0.0);
    }

    #[test]
    fn triangle_peaks_once() {
        let attack = Trapezoid::new(0.0, 15.0, 15.0, 30.0);
        assert_eq!(attack.degree(0.0), 0.0);
        assert_eq!(attack.degree(7.5), 0.5);
        assert_eq!(attack.degree(15.0), 1.0);
        assert_eq!(attack.degree(22.5), 0.5);
        assert_eq!(attack.degree(31.0), 0.0);
    }

    #[test]
    fn right_shoulder_reaches_domain_end() {
        let normal = Trapezoid::new(50.0, 80.0, 100.0, 100.0);
        assert_eq!(normal.degree(100.0), 1.0);
        assert_eq!(normal.degree(65.0), 0.5);
    }
}
