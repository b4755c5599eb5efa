//! Outcome of cutting a polytope with an axis-aligned hyperplane.

use super::polytope::ConvexPolytope;

/// Result of [`ConvexPolytope::slice`].
#[derive(Clone, Debug, PartialEq)]
pub enum Slice {
    /// The plane meets the polytope and the sliced axis was its last one.
    Exhausted,
    /// The plane meets the polytope; the section spans the remaining axes.
    Section(ConvexPolytope),
    /// The plane misses the polytope (beyond tolerance).
    Empty,
}

impl Slice {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Slice::Empty)
    }
}
