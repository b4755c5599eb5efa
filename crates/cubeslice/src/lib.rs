//! Feasibility-region slicing over named-axis datacubes.
//!
//! Given a region described per axis (boxes, disks, polygons, corridors,
//! selections, spans, unions), decide exactly which discrete coordinates a
//! dataset holds inside it and return them as a pruned index tree carrying
//! fetched values.
//!
//! Layers, bottom-up
//! - `geom`: convex polytopes in canonical axis space and hyperplane slicing.
//! - `shapes`: user-facing regions resolved to polytopes.
//! - `axis`: axis registry and raw↔canonical transformations.
//! - `datacube`: the accessor boundary plus an in-memory grid backend.
//! - `tree`: the arena index tree handed back to callers.
//! - `engine`: the recursive slicer tying the layers together.
//!
//! API Policy
//! - Prefer the curated surface in [`api`] or the [`prelude`]; module paths may
//!   move while the engine evolves.

pub mod api;
pub mod axis;
pub mod config;
pub mod datacube;
pub mod engine;
pub mod error;
pub mod geom;
pub mod shapes;
pub mod tree;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, Result};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::axis::{AxisKind, AxisRegistry, Coord, CubePath};
    pub use crate::config::{AxisOptions, TransformSpec};
    pub use crate::datacube::{AxisValues, Datacube, GridCube};
    pub use crate::engine::{Request, Slicer, SlicerCfg};
    pub use crate::error::{Error, Result};
    pub use crate::shapes::Shape;
    pub use crate::tree::{IndexTree, NodeId};
}
