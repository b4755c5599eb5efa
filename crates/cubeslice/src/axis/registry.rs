//! `AxisRegistry`: the logical axes of a datacube and their transformations.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use super::transform::{Cyclic, GridMapper, Merger, Reverse, Transformation};
use super::types::Axis;
use super::value::AxisKind;
use super::{Coord, CubePath};
use crate::config::{AxisOptions, TransformSpec};
use crate::datacube::{AxisMetadata, AxisValues, Datacube};
use crate::error::{ConfigError, Result};

/// Immutable, shareable description of the canonical slicing space.
///
/// Axis order follows the accessor's raw axis order, with a mapper's two
/// logical axes taking the place of its base axis and merged axes taking the
/// place of their first raw axis.
#[derive(Clone, Debug)]
pub struct AxisRegistry {
    axes: Vec<Axis>,
    raw_axes: Vec<String>,
}

impl AxisRegistry {
    /// Registry over the accessor's axes, without transformations.
    pub fn from_cube<D: Datacube + ?Sized>(cube: &D) -> Result<Self> {
        Self::new(cube, &AxisOptions::default())
    }

    pub fn new<D: Datacube + ?Sized>(cube: &D, options: &AxisOptions) -> Result<Self> {
        let raw_axes = cube.axis_names();
        let mut meta: HashMap<&str, AxisMetadata> = HashMap::new();
        for name in &raw_axes {
            meta.insert(name.as_str(), cube.axis_metadata(name)?);
        }
        let raw_set: BTreeSet<&str> = raw_axes.iter().map(String::as_str).collect();

        // Axes consumed by a merge.
        let mut merged_away: BTreeSet<&str> = BTreeSet::new();
        for (key, specs) in options.iter() {
            for spec in specs {
                if let TransformSpec::Merge(m) = spec {
                    if !raw_set.contains(m.with.as_str()) {
                        return Err(ConfigError::UnknownAxis(m.with.clone()).into());
                    }
                    if m.with == key {
                        return Err(invalid(key, "merge", "cannot merge an axis with itself"));
                    }
                    merged_away.insert(m.with.as_str());
                }
            }
        }

        // Pass 1: structural transformations decide the logical axes.
        let mut axes: Vec<Axis> = Vec::new();
        for raw in &raw_axes {
            if merged_away.contains(raw.as_str()) {
                continue;
            }
            let md = &meta[raw.as_str()];
            let structural: Vec<&TransformSpec> =
                options.get(raw).iter().filter(|s| s.is_structural()).collect();
            if structural.len() > 1 {
                return Err(invalid(raw, "mapper", "at most one structural transformation per axis"));
            }
            match structural.first() {
                Some(TransformSpec::Mapper(spec)) => {
                    if spec.resolution == 0 {
                        return Err(invalid(raw, "mapper", "resolution must be positive"));
                    }
                    if spec.axes[0] == spec.axes[1] {
                        return Err(invalid(raw, "mapper", "outer and inner axes must differ"));
                    }
                    let mapper = Arc::new(GridMapper::new(spec.grid, spec.resolution, raw.as_str(), spec.axes.clone()));
                    for name in &spec.axes {
                        let mut ax = Axis::new(name.as_str(), AxisKind::Numeric);
                        ax.transforms.push(Transformation::Mapper(Arc::clone(&mapper)));
                        axes.push(ax);
                    }
                }
                Some(TransformSpec::Merge(spec)) => {
                    let firsts = explicit_values(&md.values);
                    let seconds = explicit_values(&meta[spec.with.as_str()].values);
                    let merger = Merger::new(raw.as_str(), spec.with.as_str(), spec.linkers.clone(), &firsts, &seconds)?;
                    let mut ax = Axis::new(raw.as_str(), AxisKind::Datetime);
                    ax.transforms.push(Transformation::Merger(Arc::new(merger)));
                    axes.push(ax);
                }
                _ => axes.push(Axis::new(raw.as_str(), md.kind)),
            }
        }
        let mut seen = BTreeSet::new();
        for ax in &axes {
            if !seen.insert(ax.name.as_str()) {
                return Err(ConfigError::DuplicateAxis(ax.name.clone()).into());
            }
        }

        // Pass 2: value transformations, in config order per axis.
        for (key, specs) in options.iter() {
            let value_specs: Vec<&TransformSpec> = specs.iter().filter(|s| !s.is_structural()).collect();
            if value_specs.is_empty() {
                if !raw_set.contains(key) {
                    return Err(ConfigError::UnknownAxis(key.to_string()).into());
                }
                continue;
            }
            let Some(idx) = axes.iter().position(|a| a.name == key) else {
                return Err(ConfigError::UnknownAxis(key.to_string()).into());
            };
            for spec in value_specs {
                let bounds = source_bounds(&axes[idx], &meta);
                let ax = &mut axes[idx];
                let t = match spec {
                    TransformSpec::Cyclic([lower, upper]) => {
                        if ax.kind != AxisKind::Numeric {
                            return Err(invalid(key, "cyclic", "only numeric axes can be cyclic"));
                        }
                        if !(lower < upper) || !lower.is_finite() || !upper.is_finite() {
                            return Err(invalid(key, "cyclic", "period must satisfy lower < upper"));
                        }
                        let raw_lower = bounds.map_or(*lower, |(lo, _)| lo);
                        Transformation::Cyclic(Cyclic::new(*lower, *upper, raw_lower))
                    }
                    TransformSpec::Reverse(_) => {
                        if ax.kind != AxisKind::Numeric {
                            return Err(invalid(key, "reverse", "only numeric axes can be reversed"));
                        }
                        let Some((lo, hi)) = bounds else {
                            return Err(invalid(key, "reverse", "axis has no numeric extent"));
                        };
                        Transformation::Reverse(Reverse::new(lo, hi))
                    }
                    TransformSpec::Mapper(_) | TransformSpec::Merge(_) => continue,
                };
                if ax.transforms.iter().any(|x| x.kind() == t.kind()) {
                    return Err(invalid(key, t.kind().name(), "registered twice"));
                }
                ax.transforms.push(t);
            }
        }

        debug!(
            axes = ?axes.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            raw = raw_axes.len(),
            "axis registry built"
        );
        Ok(Self { axes, raw_axes })
    }

    /// Override the tolerance of every axis of `kind`; it must be finite and positive.
    pub fn set_tolerance(&mut self, kind: AxisKind, tolerance: f64) -> Result<()> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            let reason = format!("{kind:?} tolerance must be finite and positive, got {tolerance}");
            return Err(ConfigError::Malformed(reason).into());
        }
        for ax in self.axes.iter_mut().filter(|a| a.kind == kind) {
            ax.tolerance = tolerance;
        }
        Ok(())
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.name == name)
    }

    pub fn axis_or_err(&self, name: &str) -> Result<&Axis> {
        self.axis(name).ok_or_else(|| ConfigError::UnknownAxis(name.to_string()).into())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|a| a.name.as_str())
    }

    /// Raw axis names in accessor order.
    pub fn raw_axis_names(&self) -> &[String] {
        &self.raw_axes
    }

    /// Canonical path → raw accessor path.
    ///
    /// Value transformations run first (reverse registration order per axis),
    /// structural ones last. The second element is the raw outer value a
    /// mapper reports for its inner axis.
    pub fn adjust_path(&self, path: &CubePath) -> (CubePath, Option<f64>) {
        let mut out = path.clone();
        for (name, _) in path.iter() {
            if let Some(ax) = self.axis(name) {
                for t in ax.transforms.iter().rev().filter(|t| !t.is_structural()) {
                    t.adjust_path(name, &mut out);
                }
            }
        }
        let mut first_val = None;
        for ax in &self.axes {
            if let Some(t) = ax.structural() {
                if let Some(v) = t.adjust_path(&ax.name, &mut out) {
                    first_val = Some(v);
                }
            }
        }
        (out, first_val)
    }

    pub fn canonical_to_raw(&self, path: &CubePath) -> CubePath {
        self.adjust_path(path).0
    }

    /// Raw accessor path → canonical path (structural first, then value
    /// transformations in registration order).
    pub fn raw_to_canonical(&self, path: &CubePath) -> CubePath {
        let mut out = path.clone();
        for ax in &self.axes {
            if let Some(t) = ax.structural() {
                t.raw_to_canonical(&ax.name, &mut out);
            }
        }
        for ax in &self.axes {
            if out.get(&ax.name).is_none() {
                continue;
            }
            for t in ax.transforms.iter().filter(|t| !t.is_structural()) {
                t.raw_to_canonical(&ax.name, &mut out);
            }
            if let Some(v) = out.get(&ax.name).and_then(Coord::as_f64) {
                if ax.kind == AxisKind::Numeric {
                    out.insert(ax.name.as_str(), Coord::Num(ax.canonical(v)));
                }
            }
        }
        out
    }
}

fn invalid(axis: &str, kind: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidTransformation {
        axis: axis.to_string(),
        kind,
        reason: reason.to_string(),
    }
    .into()
}

fn explicit_values(values: &AxisValues) -> Vec<Coord> {
    (0..values.len()).filter_map(|i| values.get(i)).collect()
}

/// Numeric extent of the values feeding an axis before value transformations.
fn source_bounds(axis: &Axis, meta: &HashMap<&str, AxisMetadata>) -> Option<(f64, f64)> {
    match axis.structural() {
        Some(Transformation::Mapper(m)) if m.outer_axis() == axis.name => {
            let v = m.outer_values();
            let lo = v.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (lo <= hi).then_some((lo, hi))
        }
        Some(Transformation::Mapper(_)) => Some((0.0, 360.0)),
        Some(Transformation::Merger(m)) => m.bounds(),
        _ => meta.get(axis.name.as_str()).and_then(|m| m.values.bounds()),
    }
}
