//! Axes stored in descending order, exposed ascending.

/// Reflection over the raw domain `[min, max]`: `raw = max - (canonical - min)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reverse {
    pub min: f64,
    pub max: f64,
}

impl Reverse {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Self-inverse: the same map sends canonical to raw and back.
    #[inline]
    pub fn reflect(&self, v: f64) -> f64 {
        self.max - (v - self.min)
    }

    pub fn reflect_interval(&self, a: f64, b: f64) -> (f64, f64) {
        (self.reflect(b), self.reflect(a))
    }
}
