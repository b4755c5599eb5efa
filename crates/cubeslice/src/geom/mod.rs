//! Convex regions in canonical axis space (V-representation) and hyperplane slicing.
//!
//! Purpose
//! - Hold the per-request regions the slicer decomposes axis by axis: vertex
//!   hulls (boxes, polygons, path segments, selections, spans), axis-aligned
//!   ellipsoids (disks) and categorical labels.
//! - Provide the two operations the slicer needs: projection onto one axis
//!   (`extents`) and the cross-section at a fixed coordinate (`slice`).
//!
//! Why V-representation
//! - Slicing a vertex hull at `x_k = v` only needs pairwise interpolation of
//!   vertices on opposite sides of the plane; no facet enumeration.
//! - 2-D cross sections are reduced back to their hull so point counts stay
//!   bounded along deep paths; higher dimensions are only deduplicated.
//!
//! Conventions
//! - Points are `DVector<f64>` with one coordinate per entry of `axes`, in order.
//! - Every comparison against the slicing plane is widened by the axis tolerance.

mod cfg;
mod hull;
mod polytope;
mod slice;

pub use hull::{convex_hull_2d, is_convex_ring};
pub use polytope::{Body, ConvexPolytope};
pub use slice::Slice;
