//! Datacube accessor boundary.
//!
//! Purpose
//! - The slicer never reads data itself: it asks an accessor which raw values
//!   an axis holds in a range, whether a categorical value exists, and finally
//!   for the values at fully resolved raw paths.
//!
//! Why this design
//! - One object-safe trait keeps backends (files, remote services, in-memory
//!   grids) outside the engine; batching is opt-in through `fetch_many`.
//! - Errors are the backend's own, boxed into `AccessorError::Backend` and
//!   propagated without retries.

mod grid;

pub use grid::{DatasetAxis, DatasetSpec, GridCube};

use serde::{Deserialize, Serialize};

use crate::axis::{AxisKind, Coord, CubePath};
use crate::error::AccessorError;

/// Result alias for accessor calls.
pub type AccessResult<T> = std::result::Result<T, AccessorError>;

/// Storage order of an axis' values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrdering {
    Ascending,
    Descending,
    Unordered,
}

/// Values held along one raw axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValues {
    /// Listed values in storage order.
    Explicit(Vec<Coord>),
    /// `start + i * step` for `i in 0..count`.
    Regular { start: f64, step: f64, count: usize },
}

impl AxisValues {
    pub fn regular(start: f64, step: f64, count: usize) -> Self {
        AxisValues::Regular { start, step, count }
    }

    pub fn len(&self) -> usize {
        match self {
            AxisValues::Explicit(v) => v.len(),
            AxisValues::Regular { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<Coord> {
        match self {
            AxisValues::Explicit(v) => v.get(i).cloned(),
            AxisValues::Regular { start, step, count } => {
                (i < *count).then(|| Coord::Num(start + step * i as f64))
            }
        }
    }

    /// Inclusive numeric bounds, if the axis is non-empty and numeric-like.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            AxisValues::Regular { start, step, count } if *count > 0 => {
                let end = start + step * (*count - 1) as f64;
                Some((start.min(end), start.max(end)))
            }
            AxisValues::Regular { .. } => None,
            AxisValues::Explicit(v) => {
                let mut it = v.iter().filter_map(Coord::as_f64);
                let first = it.next()?;
                Some(it.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
            }
        }
    }

    pub fn ordering(&self) -> AxisOrdering {
        match self {
            AxisValues::Regular { step, .. } if *step < 0.0 => AxisOrdering::Descending,
            AxisValues::Regular { .. } => AxisOrdering::Ascending,
            AxisValues::Explicit(v) => {
                let xs: Option<Vec<f64>> = v.iter().map(Coord::as_f64).collect();
                match xs {
                    Some(xs) if xs.windows(2).all(|w| w[0] <= w[1]) => AxisOrdering::Ascending,
                    Some(xs) if xs.windows(2).all(|w| w[0] >= w[1]) => AxisOrdering::Descending,
                    _ => AxisOrdering::Unordered,
                }
            }
        }
    }
}

/// Static description of one raw axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisMetadata {
    pub kind: AxisKind,
    pub values: AxisValues,
    pub ordering: AxisOrdering,
}

/// Accessor over a named-axis dataset.
///
/// Continuous ranges are passed as `f64` (datetime axes in epoch seconds) and
/// are inclusive on both ends.
pub trait Datacube {
    /// Raw axis names in storage order.
    fn axis_names(&self) -> Vec<String>;

    fn axis_metadata(&self, axis: &str) -> AccessResult<AxisMetadata>;

    /// Raw values of `axis` within `[lower, upper]`, in storage order.
    fn axis_values_in_range(&self, axis: &str, lower: f64, upper: f64) -> AccessResult<Vec<Coord>>;

    fn has_value(&self, axis: &str, value: &Coord) -> AccessResult<bool>;

    /// Value at a fully resolved raw path; `None` when the dataset holds nothing there.
    fn fetch(&self, path: &CubePath) -> AccessResult<Option<f64>>;

    /// Batch form of [`Datacube::fetch`]; one result per path, same order.
    fn fetch_many(&self, paths: &[CubePath]) -> AccessResult<Vec<Option<f64>>> {
        paths.iter().map(|p| self.fetch(p)).collect()
    }
}

impl<D: Datacube + ?Sized> Datacube for &D {
    fn axis_names(&self) -> Vec<String> {
        (**self).axis_names()
    }
    fn axis_metadata(&self, axis: &str) -> AccessResult<AxisMetadata> {
        (**self).axis_metadata(axis)
    }
    fn axis_values_in_range(&self, axis: &str, lower: f64, upper: f64) -> AccessResult<Vec<Coord>> {
        (**self).axis_values_in_range(axis, lower, upper)
    }
    fn has_value(&self, axis: &str, value: &Coord) -> AccessResult<bool> {
        (**self).has_value(axis, value)
    }
    fn fetch(&self, path: &CubePath) -> AccessResult<Option<f64>> {
        (**self).fetch(path)
    }
    fn fetch_many(&self, paths: &[CubePath]) -> AccessResult<Vec<Option<f64>>> {
        (**self).fetch_many(paths)
    }
}
