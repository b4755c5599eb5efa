//! Axis registry and raw ↔ canonical coordinate transformations.
//!
//! Purpose
//! - Describe every logical axis the slicer can resolve: kind, tolerance and
//!   the transformations between the dataset's raw coordinates and the
//!   canonical space shapes are expressed in.
//!
//! Why this design
//! - The registry is built once per datacube and is immutable afterwards, so
//!   it is shared read-only across requests and threads.
//! - Paths travel as `CubePath` (ordered axis → value); the registry rewrites
//!   whole paths because structural transformations touch several axes.

mod path;
mod registry;
pub mod transform;
mod types;
mod value;

pub use path::CubePath;
pub use registry::AxisRegistry;
pub use transform::{SubRange, TransformKind, Transformation};
pub use types::Axis;
pub use value::{
    datetime_to_seconds, parse_datetime, round_to_tolerance, seconds_to_datetime, AxisKind, Coord, CoordKey,
};

#[cfg(test)]
mod tests;
