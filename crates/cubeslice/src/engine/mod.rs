//! Slicing engine.
//!
//! Purpose
//! - Resolve a request (shapes over disjoint axis groups) against a datacube:
//!   decide which coordinate combinations lie inside the region, then fetch
//!   the values at those combinations.
//!
//! Why this design
//! - Depth-first over the registry's axis order restricted to the requested
//!   axes. At each level the pending polytopes spanning the axis are
//!   projected, the dataset's values in that projection are looked up, and
//!   each polytope is sliced at every found value; the sections ride along
//!   to the child. A level with no values prunes its branch.
//! - Unions expand to a tensor product of alternatives, each resolved into a
//!   private tree and merged; combinations are independent, so they can be
//!   resolved in parallel (`retrieve_par`).
//! - Fetching happens once, after the tree is complete, in batches.

mod request;
mod slicer;

pub use request::Request;
pub use slicer::{Slicer, SlicerCfg};
