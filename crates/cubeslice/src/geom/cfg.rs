//! Tolerance defaults for polytope bookkeeping (internal).
//!
//! Slicing itself uses the tolerance of the axis being resolved; these only
//! govern point housekeeping independent of any axis.

/// Points closer than this are merged after a cross-section.
pub(crate) const DEDUP_EPS: f64 = 1e-12;
/// Cross-product magnitude treated as collinear by the convexity check.
pub(crate) const TURN_EPS: f64 = 1e-12;
