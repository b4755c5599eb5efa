//! `Slicer`: request → pruned, fetched index tree.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::axis::{round_to_tolerance, Axis, AxisKind, AxisRegistry, Coord, CoordKey};
use crate::config::AxisOptions;
use crate::datacube::Datacube;
use crate::error::{AccessorError, ConfigError, Result};
use crate::geom::{ConvexPolytope, Slice};
use crate::tree::{IndexTree, NodeId};

use super::request::Request;

/// Slicer knobs; `None` tolerances keep the per-kind defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlicerCfg {
    pub numeric_tolerance: Option<f64>,
    pub datetime_tolerance: Option<f64>,
    /// Use `Datacube::fetch_many` instead of one `fetch` per leaf.
    pub batch_fetch: bool,
    /// Leaves per fetch batch.
    pub fetch_batch_size: usize,
}

impl Default for SlicerCfg {
    fn default() -> Self {
        Self {
            numeric_tolerance: None,
            datetime_tolerance: None,
            batch_fetch: true,
            fetch_batch_size: 1024,
        }
    }
}

/// Slicing engine bound to one datacube and its axis registry.
///
/// `&D` is itself a `Datacube`, so a slicer can borrow its accessor.
#[derive(Debug)]
pub struct Slicer<D> {
    cube: D,
    registry: AxisRegistry,
    cfg: SlicerCfg,
}

impl<D: Datacube> Slicer<D> {
    pub fn new(cube: D, options: &AxisOptions) -> Result<Self> {
        Self::with_cfg(cube, options, SlicerCfg::default())
    }

    pub fn with_cfg(cube: D, options: &AxisOptions, cfg: SlicerCfg) -> Result<Self> {
        let mut registry = AxisRegistry::new(&cube, options)?;
        if let Some(tol) = cfg.numeric_tolerance {
            registry.set_tolerance(AxisKind::Numeric, tol)?;
        }
        if let Some(tol) = cfg.datetime_tolerance {
            registry.set_tolerance(AxisKind::Datetime, tol)?;
        }
        Ok(Self { cube, registry, cfg })
    }

    pub fn registry(&self) -> &AxisRegistry {
        &self.registry
    }

    pub fn cube(&self) -> &D {
        &self.cube
    }

    pub fn cfg(&self) -> SlicerCfg {
        self.cfg
    }

    /// Resolve `request` and fetch every surviving leaf.
    pub fn retrieve(&self, request: &Request) -> Result<IndexTree> {
        let combos = request.combinations(&self.registry)?;
        debug!(combinations = combos.len(), axes = ?request.axes(), "retrieve");
        let mut tree = IndexTree::new();
        for polytopes in &combos {
            let part = self.extract(polytopes)?;
            if combos.len() == 1 {
                tree = part;
            } else {
                tree.merge(&part);
            }
        }
        self.fetch_leaves(&mut tree)?;
        debug!(leaves = tree.leaf_count(), "retrieve done");
        Ok(tree)
    }

    /// Build the (unfetched) tree for one set of alternative polytopes.
    pub fn extract(&self, polytopes: &[ConvexPolytope]) -> Result<IndexTree> {
        let wanted: HashSet<&str> = polytopes.iter().flat_map(|p| p.axes().iter().map(String::as_str)).collect();
        let axes: Vec<&Axis> = self
            .registry
            .axes()
            .iter()
            .filter(|a| wanted.contains(a.name.as_str()))
            .collect();
        if axes.len() != wanted.len() {
            if let Some(missing) = wanted.iter().find(|w| self.registry.axis(w).is_none()) {
                return Err(ConfigError::UnknownAxis(missing.to_string()).into());
            }
        }
        let mut runner = Runner {
            cube: &self.cube,
            registry: &self.registry,
            axes,
            tree: IndexTree::new(),
        };
        let root = runner.tree.root();
        runner.descend(root, 0, polytopes.to_vec())?;
        Ok(runner.tree)
    }

    /// Fit every leaf path to raw coordinates and fetch it; leaves the
    /// datacube holds nothing for are removed.
    pub fn fetch_leaves(&self, tree: &mut IndexTree) -> Result<()> {
        let raw_count = self.registry.raw_axis_names().len();
        let leaves: Vec<NodeId> = tree.leaves().collect();
        let mut targets = Vec::with_capacity(leaves.len());
        let mut paths = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let (raw, _) = self.registry.adjust_path(&tree.flatten(leaf));
            if raw.len() != raw_count {
                trace!(have = raw.len(), want = raw_count, "incomplete raw path pruned");
                tree.remove_branch(leaf);
                continue;
            }
            targets.push(leaf);
            paths.push(raw);
        }
        let batch = self.cfg.fetch_batch_size.max(1);
        let mut missing = 0usize;
        for (ids, chunk) in targets.chunks(batch).zip(paths.chunks(batch)) {
            let values = if self.cfg.batch_fetch {
                self.cube.fetch_many(chunk)?
            } else {
                chunk.iter().map(|p| self.cube.fetch(p)).collect::<std::result::Result<Vec<_>, _>>()?
            };
            if values.len() != chunk.len() {
                return Err(AccessorError::backend(format!(
                    "fetch returned {} values for {} paths",
                    values.len(),
                    chunk.len()
                ))
                .into());
            }
            for (&id, value) in ids.iter().zip(values) {
                match value {
                    Some(v) => tree.set_result(id, v),
                    None => {
                        missing += 1;
                        tree.remove_branch(id);
                    }
                }
            }
        }
        if missing > 0 {
            warn!(missing, "paths not found in datacube were pruned");
        }
        Ok(())
    }
}

impl<D: Datacube + Sync> Slicer<D> {
    /// As [`Slicer::retrieve`], resolving union combinations in parallel.
    pub fn retrieve_par(&self, request: &Request) -> Result<IndexTree> {
        let combos = request.combinations(&self.registry)?;
        debug!(combinations = combos.len(), "retrieve (parallel)");
        let parts: Vec<IndexTree> = combos
            .par_iter()
            .map(|polytopes| self.extract(polytopes))
            .collect::<Result<_>>()?;
        let mut tree = IndexTree::new();
        for part in &parts {
            tree.merge(part);
        }
        self.fetch_leaves(&mut tree)?;
        Ok(tree)
    }
}

/// Values found on one axis, grouped by caller-frame key in discovery order.
#[derive(Default)]
struct Children {
    order: Vec<(Coord, Vec<ConvexPolytope>)>,
    index: HashMap<CoordKey, usize>,
}

impl Children {
    fn add(&mut self, value: Coord, section: Option<ConvexPolytope>) {
        let i = *self.index.entry(value.key()).or_insert_with(|| {
            self.order.push((value, Vec::new()));
            self.order.len() - 1
        });
        self.order[i].1.extend(section);
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// DFS runner carrying the accessor, the axes to resolve and the tree under construction.
struct Runner<'s, D: ?Sized> {
    cube: &'s D,
    registry: &'s AxisRegistry,
    axes: Vec<&'s Axis>,
    tree: IndexTree,
}

impl<'s, D: Datacube + ?Sized> Runner<'s, D> {
    fn descend(&mut self, node: NodeId, depth: usize, pending: Vec<ConvexPolytope>) -> Result<()> {
        let Some(&axis) = self.axes.get(depth) else {
            return Ok(());
        };
        let (active, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|p| p.spans(&axis.name));
        let children = if axis.is_categorical() {
            self.resolve_labels(axis, &active)?
        } else {
            self.resolve_values(node, axis, &active)?
        };
        if children.is_empty() {
            trace!(axis = %axis.name, depth, "no values, branch pruned");
            self.tree.remove_branch(node);
            return Ok(());
        }
        let next: Vec<(NodeId, Vec<ConvexPolytope>)> = children
            .order
            .into_iter()
            .map(|(value, sections)| {
                let id = self.tree.get_or_create_child(node, &axis.name, value);
                let mut pending = rest.clone();
                pending.extend(sections);
                (id, pending)
            })
            .collect();
        for (id, pending) in next {
            self.descend(id, depth + 1, pending)?;
        }
        Ok(())
    }

    fn resolve_labels(&self, axis: &Axis, active: &[ConvexPolytope]) -> Result<Children> {
        let mut children = Children::default();
        for poly in active {
            let Some(label) = poly.as_label() else {
                return Err(ConfigError::Unsliceable { axis: axis.name.clone() }.into());
            };
            if self.cube.has_value(&axis.name, label)? {
                children.add(label.clone(), None);
            } else {
                trace!(axis = %axis.name, value = %label, "value not in datacube");
            }
        }
        Ok(children)
    }

    fn resolve_values(&self, node: NodeId, axis: &Axis, active: &[ConvexPolytope]) -> Result<Children> {
        let tol = axis.tolerance;
        let first_val = if axis.is_mapper_inner() {
            self.registry.adjust_path(&self.tree.flatten(node)).1
        } else {
            None
        };
        let mut children = Children::default();
        for poly in active {
            let Some(k) = poly.axis_index(&axis.name) else {
                continue;
            };
            let Some((lo, hi)) = poly.extents(k) else {
                return Err(ConfigError::Unsliceable { axis: axis.name.clone() }.into());
            };
            let mut seen: HashSet<CoordKey> = HashSet::new();
            for sub in axis.remap_range(lo - tol, hi + tol) {
                let found = axis.find_values(self.cube, &sub, first_val)?;
                trace!(axis = %axis.name, lower = sub.lower, upper = sub.upper, found = found.len(), "lookup");
                for v in found {
                    let caller = round_to_tolerance(v + sub.offset, tol);
                    if axis.kind != AxisKind::Datetime && !seen.insert(Coord::Num(caller).key()) {
                        continue;
                    }
                    let value = axis.to_coord(caller);
                    match poly.slice(k, caller, tol) {
                        Slice::Empty => {}
                        Slice::Exhausted => children.add(value, None),
                        Slice::Section(s) => children.add(value, Some(s)),
                    }
                }
            }
        }
        Ok(children)
    }
}
