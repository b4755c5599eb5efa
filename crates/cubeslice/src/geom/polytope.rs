//! `ConvexPolytope`: a convex region over an ordered list of named axes.

use nalgebra::{DVector, Vector2};

use super::cfg::DEDUP_EPS;
use super::hull::{convex_hull_2d, dedup_points_in_place};
use super::slice::Slice;
use crate::axis::Coord;

/// Body of a polytope in canonical coordinates (one entry per axis).
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Convex hull of the listed points. Never empty.
    Hull(Vec<DVector<f64>>),
    /// Axis-aligned ellipsoid `sum(((x_i - c_i) / r_i)^2) <= 1`.
    Ellipsoid {
        center: DVector<f64>,
        radii: DVector<f64>,
    },
    /// A single categorical value on a one-axis polytope.
    Label(Coord),
}

/// Convex region over `axes`; `body` coordinates follow `axes` order.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPolytope {
    axes: Vec<String>,
    body: Body,
}

impl ConvexPolytope {
    /// Hull body. Callers guarantee `points` is non-empty and each point has `axes.len()` entries.
    pub fn hull(axes: Vec<String>, points: Vec<DVector<f64>>) -> Self {
        debug_assert!(!points.is_empty());
        debug_assert!(points.iter().all(|p| p.len() == axes.len()));
        Self { axes, body: Body::Hull(points) }
    }

    pub fn ellipsoid(axes: Vec<String>, center: DVector<f64>, radii: DVector<f64>) -> Self {
        debug_assert_eq!(center.len(), axes.len());
        debug_assert_eq!(radii.len(), axes.len());
        Self { axes, body: Body::Ellipsoid { center, radii } }
    }

    pub fn label(axis: impl Into<String>, value: Coord) -> Self {
        Self { axes: vec![axis.into()], body: Body::Label(value) }
    }

    /// Zero-width interval on one axis.
    pub fn point(axis: impl Into<String>, value: f64) -> Self {
        Self::hull(vec![axis.into()], vec![DVector::from_element(1, value)])
    }

    /// Closed interval on one axis.
    pub fn interval(axis: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self::hull(
            vec![axis.into()],
            vec![DVector::from_element(1, lower), DVector::from_element(1, upper)],
        )
    }

    #[inline]
    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.axes.len()
    }

    pub fn axis_index(&self, axis: &str) -> Option<usize> {
        self.axes.iter().position(|a| a == axis)
    }

    pub fn spans(&self, axis: &str) -> bool {
        self.axis_index(axis).is_some()
    }

    /// Categorical value carried by a label body.
    pub fn as_label(&self) -> Option<&Coord> {
        match &self.body {
            Body::Label(c) => Some(c),
            _ => None,
        }
    }

    /// Number of stored vertices (1 for ellipsoids and labels).
    pub fn vertex_count(&self) -> usize {
        match &self.body {
            Body::Hull(pts) => pts.len(),
            _ => 1,
        }
    }

    /// Projection onto axis position `k` as `[min, max]`. `None` for labels.
    pub fn extents(&self, k: usize) -> Option<(f64, f64)> {
        match &self.body {
            Body::Hull(pts) => {
                let (lo, hi) = pts.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p[k]), hi.max(p[k]))
                });
                Some((lo, hi))
            }
            Body::Ellipsoid { center, radii } => Some((center[k] - radii[k], center[k] + radii[k])),
            Body::Label(_) => None,
        }
    }

    /// Cross-section at `x_k = value`, with `tol` widening the plane on both sides.
    ///
    /// Hull bodies interpolate every vertex pair straddling the plane; the
    /// section is deduplicated and, when it is 2-D, reduced to its hull.
    /// Ellipsoids scale the remaining radii by `sqrt(1 - (d/r_k)^2)`.
    pub fn slice(&self, k: usize, value: f64, tol: f64) -> Slice {
        match &self.body {
            Body::Label(_) => Slice::Exhausted,
            Body::Hull(pts) => self.slice_hull(pts, k, value, tol),
            Body::Ellipsoid { center, radii } => {
                let d = value - center[k];
                let r = radii[k];
                if d.abs() > r + tol {
                    return Slice::Empty;
                }
                if self.dim() == 1 {
                    return Slice::Exhausted;
                }
                let q = d / r;
                let scale = (1.0 - q * q).max(0.0).sqrt();
                let center = center.clone().remove_row(k);
                let radii = radii.clone().remove_row(k) * scale;
                Slice::Section(Self::ellipsoid(self.remaining_axes(k), center, radii))
            }
        }
    }

    fn slice_hull(&self, pts: &[DVector<f64>], k: usize, value: f64, tol: f64) -> Slice {
        let above: Vec<&DVector<f64>> = pts.iter().filter(|p| p[k] >= value - tol).collect();
        let below: Vec<&DVector<f64>> = pts.iter().filter(|p| p[k] <= value + tol).collect();
        if above.is_empty() || below.is_empty() {
            return Slice::Empty;
        }
        if self.dim() == 1 {
            return Slice::Exhausted;
        }
        let mut section: Vec<DVector<f64>> = Vec::with_capacity(above.len() * below.len());
        for a in &above {
            for b in &below {
                let gap = a[k] - b[k];
                let p = if gap <= tol {
                    (*b).clone()
                } else {
                    let t = (value - b[k]) / gap;
                    *b + (*a - *b) * t
                };
                section.push(p.remove_row(k));
            }
        }
        let axes = self.remaining_axes(k);
        Slice::Section(Self::hull(axes, reduce_section(section)))
    }

    fn remaining_axes(&self, k: usize) -> Vec<String> {
        self.axes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != k)
            .map(|(_, a)| a.clone())
            .collect()
    }
}

/// Keep cross sections small: 1-D keeps its extremes, 2-D its hull, higher dims are deduplicated.
fn reduce_section(mut points: Vec<DVector<f64>>) -> Vec<DVector<f64>> {
    match points.first().map(|p| p.len()) {
        Some(1) => {
            let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[0]), hi.max(p[0]))
            });
            if hi - lo <= DEDUP_EPS {
                vec![DVector::from_element(1, lo)]
            } else {
                vec![DVector::from_element(1, lo), DVector::from_element(1, hi)]
            }
        }
        Some(2) => {
            let flat: Vec<Vector2<f64>> = points.iter().map(|p| Vector2::new(p[0], p[1])).collect();
            convex_hull_2d(&flat, DEDUP_EPS)
                .into_iter()
                .map(|p| DVector::from_column_slice(&[p.x, p.y]))
                .collect()
        }
        _ => {
            dedup_points_in_place(&mut points, DEDUP_EPS);
            points
        }
    }
}
