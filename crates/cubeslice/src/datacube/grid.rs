//! In-memory reference accessor: a dense row-major grid whose value at each
//! point is its flat index.

use serde::{Deserialize, Serialize};

use super::{AccessResult, AxisMetadata, AxisValues, Datacube};
use crate::axis::{datetime_to_seconds, seconds_to_datetime, AxisKind, Coord, CubePath};
use crate::error::AccessorError;

/// Absolute slack when matching a requested coordinate against stored values.
const MATCH_EPS: f64 = 1e-9;

fn default_kind() -> AxisKind {
    AxisKind::Numeric
}

/// One axis of a [`DatasetSpec`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetAxis {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: AxisKind,
    pub values: AxisValues,
}

/// JSON description of a grid dataset (axes in storage order).
///
/// ```json
/// {"axes": [
///   {"name": "date", "kind": "datetime", "values": ["2000-01-01T00:00:00"]},
///   {"name": "lat", "values": {"start": 0, "step": 1, "count": 200}}
/// ]}
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub axes: Vec<DatasetAxis>,
}

/// Dense grid cube; `fetch` returns the row-major flat index of the point.
#[derive(Clone, Debug, Default)]
pub struct GridCube {
    axes: Vec<DatasetAxis>,
}

impl GridCube {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis (builder style). Datetime values given as text or epoch
    /// seconds are normalized to datetimes.
    pub fn with_axis(mut self, name: impl Into<String>, kind: AxisKind, values: AxisValues) -> Self {
        let values = match (kind, values) {
            (AxisKind::Datetime, AxisValues::Explicit(vs)) => {
                AxisValues::Explicit(vs.into_iter().map(normalize_time).collect())
            }
            (_, v) => v,
        };
        self.axes.push(DatasetAxis { name: name.into(), kind, values });
        self
    }

    pub fn from_spec(spec: DatasetSpec) -> AccessResult<Self> {
        let mut cube = GridCube::new();
        for ax in spec.axes {
            if cube.axis(&ax.name).is_some() {
                return Err(AccessorError::backend(format!("duplicate axis `{}` in dataset", ax.name)));
            }
            cube = cube.with_axis(ax.name, ax.kind, ax.values);
        }
        Ok(cube)
    }

    /// Number of values per axis, storage order.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.values.len()).collect()
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn axis(&self, name: &str) -> Option<&DatasetAxis> {
        self.axes.iter().find(|a| a.name == name)
    }

    fn axis_or_err(&self, name: &str) -> AccessResult<&DatasetAxis> {
        self.axis(name).ok_or_else(|| AccessorError::MissingAxis(name.to_string()))
    }

    fn index_of(ax: &DatasetAxis, value: &Coord) -> Option<usize> {
        if ax.kind == AxisKind::Categorical {
            let want = value.to_string();
            return (0..ax.values.len()).find(|&i| ax.values.get(i).is_some_and(|c| c.to_string() == want));
        }
        let x = position(ax.kind, value)?;
        match &ax.values {
            AxisValues::Regular { start, step, count } => {
                if *step == 0.0 {
                    return (*count > 0 && (x - start).abs() <= MATCH_EPS).then_some(0);
                }
                let i = ((x - start) / step).round();
                if i < 0.0 || i >= *count as f64 {
                    return None;
                }
                let i = i as usize;
                ((start + step * i as f64 - x).abs() <= MATCH_EPS).then_some(i)
            }
            AxisValues::Explicit(vs) => vs
                .iter()
                .position(|c| position(ax.kind, c).is_some_and(|y| (y - x).abs() <= MATCH_EPS)),
        }
    }
}

fn normalize_time(c: Coord) -> Coord {
    match &c {
        Coord::Text(_) => c.as_datetime().map(Coord::Time).unwrap_or(c),
        Coord::Num(s) => seconds_to_datetime(*s).map(Coord::Time).unwrap_or(c),
        Coord::Time(_) => c,
    }
}

/// Continuous position of `c` on an axis of `kind`.
fn position(kind: AxisKind, c: &Coord) -> Option<f64> {
    match (kind, c) {
        (AxisKind::Categorical, _) => None,
        (AxisKind::Datetime, Coord::Text(_)) => c.as_datetime().map(|t| datetime_to_seconds(&t)),
        (_, Coord::Text(s)) => s.trim().parse().ok(),
        _ => c.as_f64(),
    }
}

fn typed(kind: AxisKind, c: Coord) -> Coord {
    match kind {
        AxisKind::Datetime => normalize_time(c),
        _ => c,
    }
}

impl Datacube for GridCube {
    fn axis_names(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.name.clone()).collect()
    }

    fn axis_metadata(&self, axis: &str) -> AccessResult<AxisMetadata> {
        let ax = self.axis_or_err(axis)?;
        Ok(AxisMetadata {
            kind: ax.kind,
            values: ax.values.clone(),
            ordering: ax.values.ordering(),
        })
    }

    fn axis_values_in_range(&self, axis: &str, lower: f64, upper: f64) -> AccessResult<Vec<Coord>> {
        let ax = self.axis_or_err(axis)?;
        if ax.kind == AxisKind::Categorical || lower > upper {
            return Ok(Vec::new());
        }
        let inside = |c: &Coord| position(ax.kind, c).is_some_and(|x| x >= lower && x <= upper);
        let out = match &ax.values {
            AxisValues::Regular { start, step, count } if *step != 0.0 => {
                // Candidate window from the affine index map, one step of slack each side.
                let a = (lower - start) / step;
                let b = (upper - start) / step;
                let lo = (a.min(b).floor() - 1.0).max(0.0);
                let hi = (a.max(b).ceil() + 1.0).min(*count as f64 - 1.0);
                if hi < lo {
                    return Ok(Vec::new());
                }
                let (lo, hi) = (lo as usize, hi as usize);
                (lo..=hi)
                    .filter_map(|i| ax.values.get(i))
                    .filter(inside)
                    .map(|c| typed(ax.kind, c))
                    .collect()
            }
            values => (0..values.len())
                .filter_map(|i| values.get(i))
                .filter(inside)
                .map(|c| typed(ax.kind, c))
                .collect(),
        };
        Ok(out)
    }

    fn has_value(&self, axis: &str, value: &Coord) -> AccessResult<bool> {
        let ax = self.axis_or_err(axis)?;
        Ok(Self::index_of(ax, value).is_some())
    }

    fn fetch(&self, path: &CubePath) -> AccessResult<Option<f64>> {
        if path.len() != self.axes.len() {
            return Ok(None);
        }
        let mut flat = 0usize;
        for ax in &self.axes {
            let Some(value) = path.get(&ax.name) else {
                return Ok(None);
            };
            let Some(i) = Self::index_of(ax, value) else {
                return Ok(None);
            };
            flat = flat * ax.values.len() + i;
        }
        Ok(Some(flat as f64))
    }
}
