//! Hull and dedup helpers: 2-D monotone chain, convexity of vertex rings,
//! lexicographic dedup of N-D points.

use std::cmp::Ordering;

use nalgebra::{DVector, Vector2};

use super::cfg::TURN_EPS;

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Andrew’s monotone chain convex hull (CCW order, collinear points dropped).
///
/// A single distinct point yields itself; collinear input yields its two extremes.
pub fn convex_hull_2d(points: &[Vector2<f64>], eps: f64) -> Vec<Vector2<f64>> {
    let mut pts: Vec<_> = points.to_vec();
    pts.sort_by(|a, b| match a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal),
        o => o,
    });
    pts.dedup_by(|a, b| (*a - *b).norm() <= eps);
    if pts.len() < 3 {
        return pts;
    }
    let mut lower: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    hull
}

/// True when the closed vertex ring turns consistently in one direction and
/// winds exactly once. Collinear and repeated vertices are tolerated.
pub fn is_convex_ring(ring: &[Vector2<f64>]) -> bool {
    let mut pts: Vec<Vector2<f64>> = Vec::with_capacity(ring.len());
    for p in ring {
        if pts.last().map_or(true, |q: &Vector2<f64>| (*q - *p).norm() > TURN_EPS) {
            pts.push(*p);
        }
    }
    while pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() <= TURN_EPS {
        pts.pop();
    }
    if pts.len() < 3 {
        return true;
    }
    let n = pts.len();
    let mut sign = 0.0f64;
    let mut winding = 0.0f64;
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        let c = pts[(i + 2) % n];
        let turn = cross(a, b, c);
        if turn.abs() > TURN_EPS {
            if sign != 0.0 && turn.signum() != sign {
                return false;
            }
            sign = turn.signum();
        }
        let e1 = b - a;
        let e2 = c - b;
        winding += (e1.x * e2.y - e1.y * e2.x).atan2(e1.dot(&e2));
    }
    // A star polygon turns one way throughout but winds more than once.
    (winding.abs() - std::f64::consts::TAU).abs() < 1e-6 || sign == 0.0
}

/// Sort lexicographically and merge points closer than `tol`.
pub(crate) fn dedup_points_in_place(points: &mut Vec<DVector<f64>>, tol: f64) {
    if points.len() < 2 {
        return;
    }
    points.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.partial_cmp(y).unwrap_or(Ordering::Equal))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    points.dedup_by(|a, b| (&*a - &*b).amax() <= tol);
}
