//! `Axis`: one logical axis of the canonical slicing space.

use super::transform::{SubRange, Transformation};
use super::value::{parse_datetime, round_to_tolerance, seconds_to_datetime, AxisKind, Coord};
use crate::datacube::Datacube;
use crate::error::{Result, ValidationError};

/// Logical axis: name, value kind, slicing tolerance and its transformations
/// (structural first, then value transformations in registration order).
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub name: String,
    pub kind: AxisKind,
    pub tolerance: f64,
    pub transforms: Vec<Transformation>,
}

impl Axis {
    pub fn new(name: impl Into<String>, kind: AxisKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tolerance: kind.default_tolerance(),
            transforms: Vec::new(),
        }
    }

    #[inline]
    pub fn has_transforms(&self) -> bool {
        !self.transforms.is_empty()
    }

    pub fn is_categorical(&self) -> bool {
        self.kind == AxisKind::Categorical
    }

    /// Structural transformation producing this axis, if any.
    pub fn structural(&self) -> Option<&Transformation> {
        self.transforms.iter().find(|t| t.is_structural())
    }

    fn value_transforms(&self) -> impl DoubleEndedIterator<Item = &Transformation> {
        self.transforms.iter().filter(|t| !t.is_structural())
    }

    /// Period of a cyclic axis.
    pub fn period(&self) -> Option<f64> {
        self.cyclic().map(|c| c.period())
    }

    pub fn cyclic(&self) -> Option<&super::transform::Cyclic> {
        self.transforms.iter().find_map(|t| match t {
            Transformation::Cyclic(c) => Some(c),
            _ => None,
        })
    }

    /// True when this is the inner axis of a grid mapper (its values depend on the outer one).
    pub fn is_mapper_inner(&self) -> bool {
        self.transforms
            .iter()
            .any(|t| matches!(t, Transformation::Mapper(m) if m.inner_axis() == self.name))
    }

    /// Fold the transformation chain's range splitting over `[lower, upper]`.
    pub fn remap_range(&self, lower: f64, upper: f64) -> Vec<SubRange> {
        let mut ranges = vec![SubRange::identity(lower, upper)];
        for t in &self.transforms {
            ranges = ranges
                .into_iter()
                .flat_map(|r| {
                    t.remap_range(r.lower, r.upper).into_iter().map(move |s| SubRange {
                        lower: s.lower,
                        upper: s.upper,
                        offset: r.offset + s.offset,
                    })
                })
                .collect();
        }
        ranges
    }

    /// Wrap into the canonical domain and round to tolerance.
    pub fn canonical(&self, v: f64) -> f64 {
        let mut x = round_to_tolerance(v, self.tolerance);
        if let Some(c) = self.cyclic() {
            x = round_to_tolerance(c.wrap(x), self.tolerance);
            if x >= c.upper {
                x -= c.period();
            }
        }
        x
    }

    /// Canonical position of a caller-supplied coordinate.
    pub fn position_of(&self, value: &Coord) -> Result<f64> {
        let pos = match (self.kind, value) {
            (AxisKind::Datetime, Coord::Text(s)) => {
                parse_datetime(s).map(|t| super::value::datetime_to_seconds(&t))
            }
            (AxisKind::Numeric, Coord::Text(s)) => s.trim().parse::<f64>().ok(),
            (AxisKind::Categorical, _) => None,
            (_, c) => c.as_f64(),
        };
        pos.filter(|x| x.is_finite()).ok_or_else(|| {
            ValidationError::BadValue {
                axis: self.name.clone(),
                value: value.to_string(),
            }
            .into()
        })
    }

    /// Tree coordinate for a canonical position.
    pub fn to_coord(&self, v: f64) -> Coord {
        match self.kind {
            AxisKind::Datetime => seconds_to_datetime(v).map(Coord::Time).unwrap_or(Coord::Num(v)),
            _ => Coord::Num(v),
        }
    }

    /// Values the dataset holds in the canonical sub-range, in the sub-range's frame.
    ///
    /// `first_val` is the raw outer value when this is a mapper's inner axis.
    pub(crate) fn find_values<D: Datacube + ?Sized>(
        &self,
        cube: &D,
        sub: &SubRange,
        first_val: Option<f64>,
    ) -> Result<Vec<f64>> {
        let mut intervals = vec![(sub.lower, sub.upper)];
        for t in self.value_transforms().rev() {
            intervals = intervals.iter().flat_map(|&(a, b)| t.raw_intervals(a, b)).collect();
        }
        let mut indexes: Option<Vec<f64>> = None;
        for t in &self.transforms {
            indexes = t.lookup(&self.name, &intervals, first_val, indexes);
        }
        let raw = match indexes {
            Some(found) => found,
            None => {
                let mut found = Vec::new();
                for &(a, b) in &intervals {
                    found.extend(
                        cube.axis_values_in_range(&self.name, a, b)?
                            .iter()
                            .filter_map(Coord::as_f64),
                    );
                }
                found
            }
        };
        let mid = sub.mid();
        let cyclic = self.cyclic().copied();
        Ok(raw
            .into_iter()
            .map(|r| {
                let c = self.value_transforms().fold(r, |v, t| t.value_from_raw(v));
                match cyclic {
                    Some(cy) => cy.nearest_to(c, mid),
                    None => c,
                }
            })
            .collect())
    }
}
