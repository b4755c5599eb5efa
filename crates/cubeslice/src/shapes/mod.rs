//! User-facing regions and their resolution to convex polytopes.
//!
//! Purpose
//! - Requests describe regions per axis group: boxes, ellipsoidal disks,
//!   convex polygons, corridors swept along waypoints, discrete selections,
//!   intervals and unions of those.
//! - `to_polytopes` turns one shape into the polytopes the slicer decomposes;
//!   several polytopes from one shape are alternatives (their union).
//!
//! Conventions
//! - Coordinates are canonical: numeric values as-is, datetimes as epoch
//!   seconds (`Select`/`Span` accept datetime text and convert).
//! - A `Box`/`Span` with `lower > upper` on a cyclic axis wraps through the
//!   period end.

use nalgebra::{DVector, Vector2};
use serde::{Deserialize, Serialize};

use crate::axis::{Axis, AxisRegistry, Coord};
use crate::error::{ConfigError, Result, ValidationError};
use crate::geom::{is_convex_ring, ConvexPolytope};

/// A region over one or more named axes. JSON is tagged by `"shape"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned hyperrectangle.
    Box {
        axes: Vec<String>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    },
    /// Axis-aligned ellipsoid.
    Disk {
        axes: Vec<String>,
        center: Vec<f64>,
        radii: Vec<f64>,
    },
    /// Convex polygon over exactly two axes; a repeated closing vertex is accepted.
    Polygon { axes: Vec<String>, vertices: Vec<Vec<f64>> },
    /// `base` (a box or polygon over `axes`) swept between consecutive waypoints.
    Path {
        axes: Vec<String>,
        base: Box<Shape>,
        waypoints: Vec<Vec<f64>>,
    },
    /// Discrete values on one axis.
    Select { axis: String, values: Vec<Coord> },
    /// Closed interval on one axis.
    Span { axis: String, lower: Coord, upper: Coord },
    /// Both operands over the same axes; resolved independently and merged.
    Union { left: Box<Shape>, right: Box<Shape> },
}

impl Shape {
    pub fn bbox<S: AsRef<str>>(axes: &[S], lower: &[f64], upper: &[f64]) -> Self {
        Shape::Box {
            axes: names(axes),
            lower: lower.to_vec(),
            upper: upper.to_vec(),
        }
    }

    pub fn disk<S: AsRef<str>>(axes: &[S], center: &[f64], radii: &[f64]) -> Self {
        Shape::Disk {
            axes: names(axes),
            center: center.to_vec(),
            radii: radii.to_vec(),
        }
    }

    pub fn polygon<S: AsRef<str>>(axes: &[S], vertices: &[[f64; 2]]) -> Self {
        Shape::Polygon {
            axes: names(axes),
            vertices: vertices.iter().map(|v| v.to_vec()).collect(),
        }
    }

    pub fn path<S: AsRef<str>>(axes: &[S], base: Shape, waypoints: &[&[f64]]) -> Self {
        Shape::Path {
            axes: names(axes),
            base: Box::new(base),
            waypoints: waypoints.iter().map(|w| w.to_vec()).collect(),
        }
    }

    pub fn select<C: Into<Coord>>(axis: &str, values: impl IntoIterator<Item = C>) -> Self {
        Shape::Select {
            axis: axis.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn span(axis: &str, lower: impl Into<Coord>, upper: impl Into<Coord>) -> Self {
        Shape::Span {
            axis: axis.to_string(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn union(left: Shape, right: Shape) -> Self {
        Shape::Union {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "box",
            Shape::Disk { .. } => "disk",
            Shape::Polygon { .. } => "polygon",
            Shape::Path { .. } => "path",
            Shape::Select { .. } => "select",
            Shape::Span { .. } => "span",
            Shape::Union { .. } => "union",
        }
    }

    /// Axes this shape constrains, in declaration order.
    pub fn axes(&self) -> Vec<String> {
        match self {
            Shape::Box { axes, .. } | Shape::Disk { axes, .. } | Shape::Polygon { axes, .. } | Shape::Path { axes, .. } => {
                axes.clone()
            }
            Shape::Select { axis, .. } | Shape::Span { axis, .. } => vec![axis.clone()],
            Shape::Union { left, .. } => left.axes(),
        }
    }

    /// Leaf shapes of nested unions (a non-union shape yields itself).
    pub fn alternatives(&self) -> Vec<&Shape> {
        match self {
            Shape::Union { left, right } => {
                let mut v = left.alternatives();
                v.extend(right.alternatives());
                v
            }
            s => vec![s],
        }
    }

    /// Registry-independent parameter checks.
    pub fn validate(&self) -> Result<()> {
        let shape = self.name();
        match self {
            Shape::Box { axes, lower, upper } => {
                check_axes(shape, axes)?;
                check_coords(shape, axes.len(), lower)?;
                check_coords(shape, axes.len(), upper)?;
            }
            Shape::Disk { axes, center, radii } => {
                check_axes(shape, axes)?;
                check_coords(shape, axes.len(), center)?;
                check_coords(shape, axes.len(), radii)?;
                if let Some(&r) = radii.iter().find(|&&r| r <= 0.0) {
                    return Err(ValidationError::NonPositiveRadius(r).into());
                }
            }
            Shape::Polygon { axes, vertices } => {
                if axes.len() != 2 {
                    return Err(ValidationError::PolygonAxes(axes.len()).into());
                }
                check_axes(shape, axes)?;
                if vertices.is_empty() {
                    return Err(ValidationError::Empty { shape }.into());
                }
                for v in vertices {
                    check_coords(shape, 2, v)?;
                }
                let ring: Vec<Vector2<f64>> = vertices.iter().map(|v| Vector2::new(v[0], v[1])).collect();
                if !is_convex_ring(&ring) {
                    return Err(ValidationError::NonConvex.into());
                }
            }
            Shape::Path { axes, base, waypoints } => {
                check_axes(shape, axes)?;
                match base.as_ref() {
                    Shape::Box { .. } | Shape::Polygon { .. } if base.axes() == *axes => base.validate()?,
                    _ => return Err(ValidationError::UnsupportedPathBase.into()),
                }
                if waypoints.is_empty() {
                    return Err(ValidationError::Empty { shape }.into());
                }
                for w in waypoints {
                    check_coords(shape, axes.len(), w)?;
                }
            }
            Shape::Select { values, .. } => {
                if values.is_empty() {
                    return Err(ValidationError::Empty { shape }.into());
                }
                if values.iter().any(|v| matches!(v, Coord::Num(x) if !x.is_finite())) {
                    return Err(ValidationError::NonFinite { shape }.into());
                }
            }
            Shape::Span { lower, upper, .. } => {
                if [lower, upper].iter().any(|v| matches!(v, Coord::Num(x) if !x.is_finite())) {
                    return Err(ValidationError::NonFinite { shape }.into());
                }
            }
            Shape::Union { left, right } => {
                left.validate()?;
                right.validate()?;
                let mut a = left.axes();
                let mut b = right.axes();
                a.sort();
                b.sort();
                if a != b {
                    return Err(ValidationError::UnionAxesMismatch.into());
                }
            }
        }
        Ok(())
    }

    /// Resolve to canonical-space polytopes (alternatives of one another).
    ///
    /// Unions return the polytopes of all operands; the slicer instead
    /// resolves each operand on its own via [`Shape::alternatives`].
    pub fn to_polytopes(&self, registry: &AxisRegistry) -> Result<Vec<ConvexPolytope>> {
        self.validate()?;
        let axes: Vec<&Axis> = self
            .axes()
            .iter()
            .map(|a| registry.axis_or_err(a))
            .collect::<Result<_>>()?;
        if !matches!(self, Shape::Select { .. } | Shape::Union { .. }) {
            if let Some(ax) = axes.iter().find(|a| a.is_categorical()) {
                return Err(ConfigError::Unsliceable { axis: ax.name.clone() }.into());
            }
        }
        let shape = self.name();
        match self {
            Shape::Box { axes: names, lower, upper } => {
                let (lo, hi) = unwrap_bounds(shape, &axes, lower, upper)?;
                Ok(vec![ConvexPolytope::hull(names.clone(), box_corners(&lo, &hi))])
            }
            Shape::Disk { axes: names, center, radii } => Ok(vec![ConvexPolytope::ellipsoid(
                names.clone(),
                DVector::from_column_slice(center),
                DVector::from_column_slice(radii),
            )]),
            Shape::Polygon { axes: names, vertices } => {
                let mut pts: Vec<DVector<f64>> = vertices.iter().map(|v| DVector::from_column_slice(v)).collect();
                if pts.len() > 1 && pts.first() == pts.last() {
                    pts.pop();
                }
                Ok(vec![ConvexPolytope::hull(names.clone(), pts)])
            }
            Shape::Path { axes: names, base, waypoints } => {
                let base_pts = base_vertices(base, &axes)?;
                let sweep = |w: &[f64]| {
                    let w = DVector::from_column_slice(w);
                    base_pts.iter().map(move |p| p + &w)
                };
                if waypoints.len() == 1 {
                    let pts: Vec<_> = sweep(&waypoints[0]).collect();
                    return Ok(vec![ConvexPolytope::hull(names.clone(), dedup(pts))]);
                }
                Ok(waypoints
                    .windows(2)
                    .map(|seg| {
                        let pts: Vec<_> = sweep(&seg[0]).chain(sweep(&seg[1])).collect();
                        ConvexPolytope::hull(names.clone(), dedup(pts))
                    })
                    .collect())
            }
            Shape::Select { axis, values } => {
                let ax = axes[0];
                if ax.is_categorical() {
                    return Ok(values.iter().map(|v| ConvexPolytope::label(axis.as_str(), v.clone())).collect());
                }
                values
                    .iter()
                    .map(|v| Ok(ConvexPolytope::point(axis.as_str(), ax.position_of(v)?)))
                    .collect()
            }
            Shape::Span { axis, lower, upper } => {
                let ax = axes[0];
                let lo = ax.position_of(lower)?;
                let hi = ax.position_of(upper)?;
                let (lo, hi) = unwrap_bounds(shape, &axes, &[lo], &[hi])?;
                Ok(vec![ConvexPolytope::interval(axis.as_str(), lo[0], hi[0])])
            }
            Shape::Union { left, right } => {
                let mut out = left.to_polytopes(registry)?;
                out.extend(right.to_polytopes(registry)?);
                Ok(out)
            }
        }
    }
}

fn names<S: AsRef<str>>(axes: &[S]) -> Vec<String> {
    axes.iter().map(|a| a.as_ref().to_string()).collect()
}

fn check_axes(shape: &'static str, axes: &[String]) -> Result<()> {
    if axes.is_empty() {
        return Err(ValidationError::Empty { shape }.into());
    }
    for (i, a) in axes.iter().enumerate() {
        if axes[..i].contains(a) {
            return Err(ValidationError::RepeatedAxis { shape }.into());
        }
    }
    Ok(())
}

fn check_coords(shape: &'static str, expected: usize, coords: &[f64]) -> Result<()> {
    if coords.len() != expected {
        return Err(ValidationError::DimensionMismatch {
            shape,
            expected,
            got: coords.len(),
        }
        .into());
    }
    if coords.iter().any(|x| !x.is_finite()) {
        return Err(ValidationError::NonFinite { shape }.into());
    }
    Ok(())
}

/// Per-axis bounds with cyclic wrap-around resolved.
fn unwrap_bounds(shape: &'static str, axes: &[&Axis], lower: &[f64], upper: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut lo = lower.to_vec();
    let mut hi = upper.to_vec();
    for (k, ax) in axes.iter().enumerate() {
        if lo[k] <= hi[k] {
            continue;
        }
        match ax.cyclic() {
            Some(c) => (lo[k], hi[k]) = c.unwrap_bounds(lo[k], hi[k]),
            None => {
                return Err(ValidationError::InvertedBounds {
                    shape,
                    axis: ax.name.clone(),
                    lower: lo[k],
                    upper: hi[k],
                }
                .into())
            }
        }
    }
    Ok((lo, hi))
}

/// All `2^k` corners of the box `[lo, hi]`.
fn box_corners(lo: &[f64], hi: &[f64]) -> Vec<DVector<f64>> {
    let k = lo.len();
    let corners = (0..1usize << k)
        .map(|mask| DVector::from_fn(k, |i, _| if mask & (1 << i) != 0 { hi[i] } else { lo[i] }))
        .collect();
    dedup(corners)
}

fn base_vertices(base: &Shape, axes: &[&Axis]) -> Result<Vec<DVector<f64>>> {
    match base {
        Shape::Box { lower, upper, .. } => {
            let (lo, hi) = unwrap_bounds("path", axes, lower, upper)?;
            Ok(box_corners(&lo, &hi))
        }
        Shape::Polygon { vertices, .. } => Ok(vertices.iter().map(|v| DVector::from_column_slice(v)).collect()),
        _ => Err(ValidationError::UnsupportedPathBase.into()),
    }
}

fn dedup(mut pts: Vec<DVector<f64>>) -> Vec<DVector<f64>> {
    let mut out: Vec<DVector<f64>> = Vec::with_capacity(pts.len());
    for p in pts.drain(..) {
        if !out.iter().any(|q| q == &p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests;
