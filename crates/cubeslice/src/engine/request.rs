//! `Request`: an ordered list of shapes over disjoint axes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::axis::{AxisRegistry, Transformation};
use crate::error::{ConfigError, Result};
use crate::geom::ConvexPolytope;
use crate::shapes::Shape;

/// Shapes to resolve together. JSON form is a plain array of shapes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Request {
    shapes: Vec<Shape>,
}

impl Request {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| ConfigError::Malformed(e.to_string()).into())
    }

    /// Append a shape (builder style).
    pub fn with(mut self, shape: Shape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Every axis the request constrains, in shape order.
    pub fn axes(&self) -> Vec<String> {
        self.shapes.iter().flat_map(Shape::axes).collect()
    }

    /// Shape parameters, axis coverage and wiring against `registry`.
    pub fn validate(&self, registry: &AxisRegistry) -> Result<()> {
        let mut covered = BTreeSet::new();
        for shape in &self.shapes {
            shape.validate()?;
            for axis in shape.axes() {
                registry.axis_or_err(&axis)?;
                if !covered.insert(axis.clone()) {
                    return Err(ConfigError::DuplicateAxis(axis).into());
                }
            }
        }
        for name in &covered {
            let Ok(ax) = registry.axis_or_err(name) else { continue };
            if !ax.is_mapper_inner() {
                continue;
            }
            if let Some(Transformation::Mapper(m)) = ax.structural() {
                if !covered.contains(m.outer_axis()) {
                    return Err(ConfigError::Malformed(format!(
                        "axis `{}` needs `{}` in the same request",
                        name,
                        m.outer_axis()
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Tensor product of every shape's alternatives, each resolved to polytopes.
    pub(crate) fn combinations(&self, registry: &AxisRegistry) -> Result<Vec<Vec<ConvexPolytope>>> {
        self.validate(registry)?;
        let mut combos: Vec<Vec<ConvexPolytope>> = vec![Vec::new()];
        for shape in &self.shapes {
            let alts: Vec<Vec<ConvexPolytope>> = shape
                .alternatives()
                .into_iter()
                .map(|alt| alt.to_polytopes(registry))
                .collect::<Result<_>>()?;
            combos = combos
                .iter()
                .flat_map(|base| {
                    alts.iter().map(move |alt| {
                        let mut c = base.clone();
                        c.extend(alt.iter().cloned());
                        c
                    })
                })
                .collect();
        }
        Ok(combos)
    }
}
