//! Error taxonomy.
//!
//! - `ConfigError`: registry or request wiring is wrong; raised before slicing.
//! - `ValidationError`: shape parameters are malformed; raised by the shape layer.
//! - `AccessorError`: the datacube backend failed; propagated verbatim.
//!
//! A coordinate the dataset does not hold is not an error: the engine prunes
//! that branch and moves on.

use thiserror::Error;

/// Fatal configuration problems (axis registry, transformation specs, request wiring).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown axis `{0}`")]
    UnknownAxis(String),
    #[error("axis `{0}` is covered by more than one shape")]
    DuplicateAxis(String),
    #[error("axis `{axis}` is categorical and only accepts selections")]
    Unsliceable { axis: String },
    #[error("transformation `{kind}` on axis `{axis}`: {reason}")]
    InvalidTransformation {
        axis: String,
        kind: &'static str,
        reason: String,
    },
    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// Malformed shape parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{shape}: expected {expected} coordinates, got {got}")]
    DimensionMismatch {
        shape: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{shape}: no vertices or values given")]
    Empty { shape: &'static str },
    #[error("{shape}: non-finite coordinate")]
    NonFinite { shape: &'static str },
    #[error("{shape}: axes must be distinct")]
    RepeatedAxis { shape: &'static str },
    #[error("disk radius {0} is not positive")]
    NonPositiveRadius(f64),
    #[error("polygon needs exactly 2 axes, got {0}")]
    PolygonAxes(usize),
    #[error("polygon is not convex")]
    NonConvex,
    #[error("path base must be a box or polygon over the path axes")]
    UnsupportedPathBase,
    #[error("union operands cover different axes")]
    UnionAxesMismatch,
    #[error("{shape}: lower bound {lower} exceeds upper bound {upper} on non-cyclic axis `{axis}`")]
    InvertedBounds {
        shape: &'static str,
        axis: String,
        lower: f64,
        upper: f64,
    },
    #[error("value `{value}` is not usable on axis `{axis}`")]
    BadValue { axis: String, value: String },
}

/// Datacube backend failure.
#[derive(Debug, Error)]
pub enum AccessorError {
    #[error("axis `{0}` is not present in the datacube")]
    MissingAxis(String),
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl AccessorError {
    /// Wrap any backend error without altering it.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        AccessorError::Backend(err.into())
    }
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("accessor error: {0}")]
    Accessor(#[from] AccessorError),
}

pub type Result<T> = std::result::Result<T, Error>;
