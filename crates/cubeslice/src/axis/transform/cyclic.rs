//! Periodic axes: canonical values live in `[lower, upper)`.

use super::SubRange;

/// Cyclic axis with period `upper - lower`. `raw_lower` anchors the period
/// window the dataset actually stores (e.g. `-180` for a `[0, 360)` canonical
/// longitude stored as `[-180, 180)`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cyclic {
    pub lower: f64,
    pub upper: f64,
    pub raw_lower: f64,
}

impl Cyclic {
    pub fn new(lower: f64, upper: f64, raw_lower: f64) -> Self {
        Self { lower, upper, raw_lower }
    }

    #[inline]
    pub fn period(&self) -> f64 {
        self.upper - self.lower
    }

    /// Canonical representative in `[lower, upper)`.
    pub fn wrap(&self, v: f64) -> f64 {
        self.lower + (v - self.lower).rem_euclid(self.period())
    }

    /// Representative inside the stored raw window `[raw_lower, raw_lower + period)`.
    pub fn to_raw(&self, v: f64) -> f64 {
        self.raw_lower + (v - self.raw_lower).rem_euclid(self.period())
    }

    /// Split `[lo, up]` at period boundaries. Each piece is shifted into
    /// `[lower, upper]`; `offset` is the multiple of the period removed.
    pub fn remap_range(&self, lo: f64, up: f64) -> Vec<SubRange> {
        let p = self.period();
        let mut out = Vec::new();
        if !(lo.is_finite() && up.is_finite()) {
            return out;
        }
        let mut k = ((lo - self.lower) / p).floor();
        loop {
            let start = self.lower + k * p;
            if start > up {
                break;
            }
            let a = lo.max(start);
            let b = up.min(start + p);
            if a <= b {
                let shift = k * p;
                out.push(SubRange {
                    lower: a - shift,
                    upper: b - shift,
                    offset: shift,
                });
            }
            k += 1.0;
        }
        out
    }

    /// Raw-window intervals covering canonical `[a, b]`.
    pub fn raw_intervals(&self, a: f64, b: f64) -> Vec<(f64, f64)> {
        let p = self.period();
        let end = self.raw_lower + p;
        if b - a >= p {
            return vec![(self.raw_lower, end)];
        }
        let ra = self.to_raw(a);
        let rb = ra + (b - a);
        if rb <= end {
            vec![(ra, rb)]
        } else {
            vec![(ra, end), (self.raw_lower, rb - p)]
        }
    }

    /// Shift a wrapped value to the copy closest to `mid`.
    pub fn nearest_to(&self, v: f64, mid: f64) -> f64 {
        let p = self.period();
        v + p * ((mid - v) / p).round()
    }

    /// Bounds with `lower > upper` denote the interval wrapping through the
    /// period end: lift `upper` by whole periods until it reaches `lower`.
    pub fn unwrap_bounds(&self, lower: f64, upper: f64) -> (f64, f64) {
        if lower <= upper {
            return (lower, upper);
        }
        let p = self.period();
        let k = ((lower - upper) / p).ceil();
        (lower, upper + k * p)
    }
}
