//! Axis transformation options (JSON configuration surface).
//!
//! ```json
//! {
//!   "values":    [{"mapper": {"type": "octahedral", "resolution": 1280,
//!                             "axes": ["latitude", "longitude"]}}],
//!   "longitude": [{"cyclic": [0, 360]}],
//!   "date":      [{"merge": {"with": "time", "linkers": ["T", "00"]}}],
//!   "level":     [{"reverse": {}}]
//! }
//! ```
//!
//! Keys name raw axes (mapper, merge) or logical axes (cyclic, reverse).
//! Unknown transformation types fail deserialization; unknown axes fail when
//! the registry is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Grid family of a mapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    Regular,
    Octahedral,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapperSpec {
    #[serde(rename = "type")]
    pub grid: GridKind,
    pub resolution: usize,
    /// `[outer, inner]` logical axis names.
    pub axes: [String; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeSpec {
    pub with: String,
    pub linkers: [String; 2],
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReverseSpec {}

/// One transformation entry, externally tagged by its type name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSpec {
    /// Canonical period `[lower, upper)`.
    Cyclic([f64; 2]),
    Mapper(MapperSpec),
    Merge(MergeSpec),
    Reverse(ReverseSpec),
}

impl TransformSpec {
    pub fn cyclic(lower: f64, upper: f64) -> Self {
        TransformSpec::Cyclic([lower, upper])
    }

    pub fn mapper(grid: GridKind, resolution: usize, outer: &str, inner: &str) -> Self {
        TransformSpec::Mapper(MapperSpec {
            grid,
            resolution,
            axes: [outer.to_string(), inner.to_string()],
        })
    }

    pub fn merge(with: &str, l0: &str, l1: &str) -> Self {
        TransformSpec::Merge(MergeSpec {
            with: with.to_string(),
            linkers: [l0.to_string(), l1.to_string()],
        })
    }

    pub fn reverse() -> Self {
        TransformSpec::Reverse(ReverseSpec {})
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, TransformSpec::Mapper(_) | TransformSpec::Merge(_))
    }
}

/// Axis name → ordered transformation list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisOptions(BTreeMap<String, Vec<TransformSpec>>);

impl AxisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| ConfigError::Malformed(e.to_string()).into())
    }

    /// Append a transformation to `axis` (builder style).
    pub fn with(mut self, axis: &str, spec: TransformSpec) -> Self {
        self.0.entry(axis.to_string()).or_default().push(spec);
        self
    }

    pub fn get(&self, axis: &str) -> &[TransformSpec] {
        self.0.get(axis).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TransformSpec])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
