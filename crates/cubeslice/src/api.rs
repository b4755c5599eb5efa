//! Curated surface for callers (the CLI, benches and integration tests).
//!
//! Module paths below `crate::` may move; these names are the ones to import.

// Axes and transformations
pub use crate::axis::transform::{gaussian_latitudes, Cyclic, GridMapper, Merger, Reverse};
pub use crate::axis::{
    datetime_to_seconds, parse_datetime, round_to_tolerance, seconds_to_datetime, Axis, AxisKind, AxisRegistry,
    Coord, CoordKey, CubePath, SubRange, TransformKind, Transformation,
};
// Configuration
pub use crate::config::{AxisOptions, GridKind, MapperSpec, MergeSpec, TransformSpec};
// Accessor boundary
pub use crate::datacube::{
    AccessResult, AxisMetadata, AxisOrdering, AxisValues, Datacube, DatasetAxis, DatasetSpec, GridCube,
};
// Engine
pub use crate::engine::{Request, Slicer, SlicerCfg};
pub use crate::error::{AccessorError, ConfigError, Error, Result, ValidationError};
// Geometry
pub use crate::geom::{convex_hull_2d, is_convex_ring, Body, ConvexPolytope, Slice};
pub use crate::shapes::Shape;
pub use crate::tree::{IndexTree, NodeId};
