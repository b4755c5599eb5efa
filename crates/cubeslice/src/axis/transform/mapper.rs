//! Structured-grid mapper: one flat storage axis exposed as two logical axes.
//!
//! Purpose
//! - Global grids are often stored as a single `values` axis. The mapper
//!   exposes it as an outer (latitude-like) axis and an inner (longitude-like)
//!   axis whose values depend on the outer row.
//!
//! Grids
//! - regular(N): `2N` rows at `-90 + i·90/N`, each with `4N` points spaced `90/N`.
//! - octahedral(N): `2N` Gaussian latitudes north to south; row `i` holds
//!   `4·min(i, 2N−1−i) + 20` points equally spaced from 0.
//!
//! References
//! - Gaussian latitudes are the roots of the Legendre polynomial `P_2N`,
//!   found by Newton iteration from the Chebyshev-like initial guess.

use crate::config::GridKind;

/// Outer/inner values within this distance of a grid line match it.
const GRID_EPS: f64 = 1e-8;
const NEWTON_MAX_ITERS: usize = 100;
const NEWTON_EPS: f64 = 1e-14;

/// Row-structured grid over `[outer, inner]` logical axes.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMapper {
    kind: GridKind,
    resolution: usize,
    base: String,
    outer_axis: String,
    inner_axis: String,
    outer: Vec<f64>,
    row_len: Vec<usize>,
    row_start: Vec<usize>,
}

impl GridMapper {
    pub fn new(kind: GridKind, resolution: usize, base: impl Into<String>, axes: [String; 2]) -> Self {
        let n = resolution;
        let (outer, row_len): (Vec<f64>, Vec<usize>) = match kind {
            GridKind::Regular => {
                let step = 90.0 / n as f64;
                ((0..2 * n).map(|i| -90.0 + i as f64 * step).collect(), vec![4 * n; 2 * n])
            }
            GridKind::Octahedral => (
                gaussian_latitudes(2 * n),
                (0..2 * n).map(|i| 4 * i.min(2 * n - 1 - i) + 20).collect(),
            ),
        };
        let mut row_start = Vec::with_capacity(row_len.len());
        let mut acc = 0usize;
        for len in &row_len {
            row_start.push(acc);
            acc += len;
        }
        let [outer_axis, inner_axis] = axes;
        Self {
            kind,
            resolution,
            base: base.into(),
            outer_axis,
            inner_axis,
            outer,
            row_len,
            row_start,
        }
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Flat storage axis replaced by this mapper.
    pub fn base_axis(&self) -> &str {
        &self.base
    }

    pub fn outer_axis(&self) -> &str {
        &self.outer_axis
    }

    pub fn inner_axis(&self) -> &str {
        &self.inner_axis
    }

    /// Outer values in storage order.
    pub fn outer_values(&self) -> &[f64] {
        &self.outer
    }

    pub fn total_points(&self) -> usize {
        self.row_len.iter().sum()
    }

    pub fn row_len(&self, row: usize) -> Option<usize> {
        self.row_len.get(row).copied()
    }

    /// Row holding `outer` (within grid tolerance).
    pub fn row_of(&self, outer: f64) -> Option<usize> {
        let descending = self.outer.first() > self.outer.last();
        let i = if descending {
            self.outer.partition_point(|&x| x > outer)
        } else {
            self.outer.partition_point(|&x| x < outer)
        };
        [i.checked_sub(1), Some(i)]
            .into_iter()
            .flatten()
            .filter(|&j| j < self.outer.len())
            .find(|&j| (self.outer[j] - outer).abs() <= GRID_EPS)
    }

    fn spacing(&self, row: usize) -> f64 {
        360.0 / self.row_len[row] as f64
    }

    /// Outer values within `[lo, up]`, storage order.
    pub fn outer_in(&self, lo: f64, up: f64) -> Vec<f64> {
        self.outer.iter().copied().filter(|&x| x >= lo && x <= up).collect()
    }

    /// Inner values of the row at `outer` within `[lo, up]`.
    pub fn inner_in(&self, outer: f64, lo: f64, up: f64) -> Vec<f64> {
        let Some(row) = self.row_of(outer) else {
            return Vec::new();
        };
        let len = self.row_len[row];
        let sp = self.spacing(row);
        let first = ((lo / sp).floor() - 1.0).max(0.0);
        let last = ((up / sp).ceil() + 1.0).min(len as f64 - 1.0);
        if last < first {
            return Vec::new();
        }
        (first as usize..=last as usize)
            .map(|j| j as f64 * sp)
            .filter(|&x| x >= lo && x <= up)
            .collect()
    }

    /// Flat index of `(outer, inner)`.
    pub fn unmap(&self, outer: f64, inner: f64) -> Option<usize> {
        let row = self.row_of(outer)?;
        let sp = self.spacing(row);
        let j = (inner / sp).round();
        if j < 0.0 || j >= self.row_len[row] as f64 || (j * sp - inner).abs() > GRID_EPS {
            return None;
        }
        Some(self.row_start[row] + j as usize)
    }

    /// `(outer, inner)` of a flat index.
    pub fn map(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.total_points() {
            return None;
        }
        let row = self.row_start.partition_point(|&s| s <= index) - 1;
        let j = index - self.row_start[row];
        Some((self.outer[row], j as f64 * self.spacing(row)))
    }
}

/// Gaussian latitudes in degrees, north to south: roots of the Legendre
/// polynomial `P_n` mapped through `asin`.
pub fn gaussian_latitudes(n: usize) -> Vec<f64> {
    let mut lats = vec![0.0; n];
    let half = n.div_ceil(2);
    for i in 0..half {
        let mut z = (std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..NEWTON_MAX_ITERS {
            let (p, dp) = legendre_with_derivative(n, z);
            let dz = p / dp;
            z -= dz;
            if dz.abs() < NEWTON_EPS {
                break;
            }
        }
        let lat = z.asin().to_degrees();
        lats[i] = lat;
        lats[n - 1 - i] = -lat;
    }
    lats
}

/// `P_n(z)` and `P_n'(z)` by the three-term recurrence.
fn legendre_with_derivative(n: usize, z: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = z;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * z * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (z * p1 - p0) / (z * z - 1.0);
    (p1, dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn axes() -> [String; 2] {
        ["latitude".to_string(), "longitude".to_string()]
    }

    #[test]
    fn gaussian_latitudes_small_n() {
        // Roots of P_2 are ±1/sqrt(3).
        let l = gaussian_latitudes(2);
        let expect = (1.0f64 / 3.0f64.sqrt()).asin().to_degrees();
        assert!((l[0] - expect).abs() < 1e-12);
        assert!((l[1] + expect).abs() < 1e-12);
        let l3 = gaussian_latitudes(3);
        assert!(l3[1].abs() < 1e-12);
    }

    #[test]
    fn o1280_near_pole_and_equator() {
        let m = GridMapper::new(GridKind::Octahedral, 1280, "values", axes());
        let lats = m.outer_values();
        assert_eq!(lats.len(), 2560);
        assert!((lats[0] - 89.946_187_715_665_5).abs() < 1e-6);
        assert!((lats[1279] - 0.035_149_384_215_8).abs() < 1e-6);
        assert_eq!(m.row_len(0), Some(20));
        assert_eq!(m.row_len(1279), Some(4 * 1279 + 20));
        assert_eq!(m.row_len(2559), Some(20));
        assert_eq!(m.total_points(), 6_599_680);
    }

    #[test]
    fn octahedral_box_near_origin() {
        let m = GridMapper::new(GridKind::Octahedral, 1280, "values", axes());
        let rows = m.outer_in(0.0, 0.2);
        assert_eq!(rows.len(), 3);
        let pts: usize = rows.iter().map(|&lat| m.inner_in(lat, 0.0, 0.2).len()).sum();
        assert_eq!(pts, 9);
    }

    #[test]
    fn regular_grid_layout() {
        let m = GridMapper::new(GridKind::Regular, 2, "values", axes());
        assert_eq!(m.outer_values(), &[-90.0, -45.0, 0.0, 45.0]);
        assert_eq!(m.total_points(), 4 * 8);
        assert_eq!(m.unmap(0.0, 45.0), Some(2 * 8 + 1));
        assert_eq!(m.map(2 * 8 + 1), Some((0.0, 45.0)));
        assert_eq!(m.unmap(0.0, 44.0), None);
        assert_eq!(m.unmap(10.0, 45.0), None);
        assert_eq!(m.map(32), None);
    }

    proptest! {
        #[test]
        fn map_unmap_roundtrip(idx in 0usize..(4 * 32 * 32 + 80 * 16)) {
            let m = GridMapper::new(GridKind::Octahedral, 16, "values", axes());
            prop_assume!(idx < m.total_points());
            let (outer, inner) = m.map(idx).unwrap();
            prop_assert_eq!(m.unmap(outer, inner), Some(idx));
        }
    }
}
