//! Raw ↔ canonical axis transformations.
//!
//! Purpose
//! - Let callers query datasets in a normalized space: periodic axes wrapped
//!   into one period, flat grid storage exposed as two axes, split date/time
//!   axes exposed as one datetime, descending axes exposed ascending.
//!
//! Why this design
//! - One closed enum instead of trait objects: the set of transformations is
//!   fixed and the registry builds them from a serde-tagged config variant.
//! - Value transformations (cyclic, reverse) act on one coordinate.
//!   Structural ones (mapper, merger) change which raw axes a path holds and
//!   always run outermost: first raw→canonical, last canonical→raw.
//!
//! Lookup fold
//! - A canonical interval is pushed through the value transformations in
//!   reverse order to raw intervals; a structural transformation (if any)
//!   yields the raw values ("indexes"), otherwise the accessor does; the
//!   values are then pulled back through the value transformations in order.

mod cyclic;
mod mapper;
mod merger;
mod reverse;

pub use cyclic::Cyclic;
pub use mapper::{gaussian_latitudes, GridMapper};
pub use merger::Merger;
pub use reverse::Reverse;

use std::sync::Arc;

use super::{Coord, CubePath};

/// Piece of a canonical query range, shifted by `offset` into the canonical domain.
///
/// A value `v` found in `[lower, upper]` sits at `v + offset` in the caller's frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubRange {
    pub lower: f64,
    pub upper: f64,
    pub offset: f64,
}

impl SubRange {
    pub fn identity(lower: f64, upper: f64) -> Self {
        Self { lower, upper, offset: 0.0 }
    }

    #[inline]
    pub fn mid(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

/// Discriminant of [`Transformation`], used in config and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Cyclic,
    Mapper,
    Merger,
    Reverse,
}

impl TransformKind {
    pub fn name(self) -> &'static str {
        match self {
            TransformKind::Cyclic => "cyclic",
            TransformKind::Mapper => "mapper",
            TransformKind::Merger => "merge",
            TransformKind::Reverse => "reverse",
        }
    }

    /// Structural kinds change the set of raw axes in a path.
    pub fn is_structural(self) -> bool {
        matches!(self, TransformKind::Mapper | TransformKind::Merger)
    }
}

/// One transformation attached to a logical axis. Mappers and mergers are
/// shared by every logical axis they produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Transformation {
    Cyclic(Cyclic),
    Mapper(Arc<GridMapper>),
    Merger(Arc<Merger>),
    Reverse(Reverse),
}

impl Transformation {
    pub fn kind(&self) -> TransformKind {
        match self {
            Transformation::Cyclic(_) => TransformKind::Cyclic,
            Transformation::Mapper(_) => TransformKind::Mapper,
            Transformation::Merger(_) => TransformKind::Merger,
            Transformation::Reverse(_) => TransformKind::Reverse,
        }
    }

    #[inline]
    pub fn is_structural(&self) -> bool {
        self.kind().is_structural()
    }

    /// Split a canonical range into pieces the lookup can serve. Only cyclic
    /// axes split; every other kind returns the range unchanged.
    pub fn remap_range(&self, lower: f64, upper: f64) -> Vec<SubRange> {
        match self {
            Transformation::Cyclic(c) => c.remap_range(lower, upper),
            _ => vec![SubRange::identity(lower, upper)],
        }
    }

    /// Canonical interval → raw intervals (value transformations only).
    pub(crate) fn raw_intervals(&self, a: f64, b: f64) -> Vec<(f64, f64)> {
        match self {
            Transformation::Cyclic(c) => c.raw_intervals(a, b),
            Transformation::Reverse(r) => vec![r.reflect_interval(a, b)],
            _ => vec![(a, b)],
        }
    }

    /// Raw value → canonical value (value transformations only).
    pub(crate) fn value_from_raw(&self, v: f64) -> f64 {
        match self {
            Transformation::Cyclic(c) => c.wrap(v),
            Transformation::Reverse(r) => r.reflect(v),
            _ => v,
        }
    }

    /// Canonical value → raw value (value transformations only).
    pub(crate) fn value_to_raw(&self, v: f64) -> f64 {
        match self {
            Transformation::Cyclic(c) => c.to_raw(v),
            Transformation::Reverse(r) => r.reflect(v),
            _ => v,
        }
    }

    /// Raw values a structural transformation serves for `axis` within
    /// `intervals`. `indexes` already found by an earlier step pass through;
    /// value transformations never produce indexes.
    pub(crate) fn lookup(
        &self,
        axis: &str,
        intervals: &[(f64, f64)],
        first_val: Option<f64>,
        indexes: Option<Vec<f64>>,
    ) -> Option<Vec<f64>> {
        if indexes.is_some() {
            return indexes;
        }
        match self {
            Transformation::Mapper(m) if axis == m.outer_axis() => {
                Some(intervals.iter().flat_map(|&(a, b)| m.outer_in(a, b)).collect())
            }
            Transformation::Mapper(m) => Some(match first_val {
                Some(outer) => intervals.iter().flat_map(|&(a, b)| m.inner_in(outer, a, b)).collect(),
                None => Vec::new(),
            }),
            Transformation::Merger(m) => Some(intervals.iter().flat_map(|&(a, b)| m.values_in(a, b)).collect()),
            _ => None,
        }
    }

    /// Rewrite the canonical coordinate(s) this transformation owns into raw
    /// form. Structural kinds also report the outer value the inner axis of a
    /// mapper depends on (`first_val`).
    pub fn adjust_path(&self, axis: &str, path: &mut CubePath) -> Option<f64> {
        match self {
            Transformation::Cyclic(_) | Transformation::Reverse(_) => {
                if let Some(v) = path.get(axis).and_then(Coord::as_f64) {
                    path.insert(axis, Coord::Num(self.value_to_raw(v)));
                }
                None
            }
            Transformation::Mapper(m) => {
                let outer = path.get(m.outer_axis()).and_then(Coord::as_f64)?;
                let Some(inner) = path.get(m.inner_axis()).and_then(Coord::as_f64) else {
                    return Some(outer);
                };
                if let Some(index) = m.unmap(outer, inner) {
                    let at = path.position(m.outer_axis()).unwrap_or(path.len());
                    path.remove(m.outer_axis());
                    path.remove(m.inner_axis());
                    path.insert_at(at, m.base_axis(), Coord::Num(index as f64));
                }
                Some(outer)
            }
            Transformation::Merger(m) => {
                let merged = path.get(m.axis()).and_then(Coord::as_datetime)?;
                let (first, second) = m.unmerge(&merged);
                let at = path.position(m.axis()).unwrap_or(path.len());
                path.insert_at(at, m.axis(), first);
                path.insert_at(at + 1, m.with(), second);
                None
            }
        }
    }

    /// Canonical → raw for the coordinate(s) this transformation owns.
    pub fn canonical_to_raw(&self, axis: &str, path: &mut CubePath) {
        self.adjust_path(axis, path);
    }

    /// Raw → canonical for the coordinate(s) this transformation owns.
    pub fn raw_to_canonical(&self, axis: &str, path: &mut CubePath) {
        match self {
            Transformation::Cyclic(_) | Transformation::Reverse(_) => {
                if let Some(v) = path.get(axis).and_then(Coord::as_f64) {
                    path.insert(axis, Coord::Num(self.value_from_raw(v)));
                }
            }
            Transformation::Mapper(m) => {
                let Some(index) = path.get(m.base_axis()).and_then(Coord::as_f64) else {
                    return;
                };
                if index < 0.0 || index.fract() != 0.0 {
                    return;
                }
                if let Some((outer, inner)) = m.map(index as usize) {
                    let at = path.position(m.base_axis()).unwrap_or(path.len());
                    path.remove(m.base_axis());
                    path.insert_at(at, m.outer_axis(), Coord::Num(outer));
                    path.insert_at(at + 1, m.inner_axis(), Coord::Num(inner));
                }
            }
            Transformation::Merger(m) => {
                let (Some(first), Some(second)) = (path.get(m.axis()), path.get(m.with())) else {
                    return;
                };
                if let Some(t) = m.merge(first, second) {
                    path.remove(m.with());
                    path.insert(m.axis(), Coord::Time(t));
                }
            }
        }
    }
}
