//! Index tree: the result of a retrieval.
//!
//! Purpose
//! - One level per requested axis; each root-to-leaf path is a coordinate
//!   combination the dataset holds inside the requested region, and each leaf
//!   carries the fetched value.
//!
//! Why this design
//! - Arena storage with parent links: paths are recovered by walking up from
//!   a leaf instead of copying a path dictionary per recursion level.
//! - Children are unique per `(axis, value)` and keep discovery order, so
//!   merging trees is a lock-step path union.
//! - Removal is logical (`alive = false`); ids stay stable for the caller.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::axis::{Coord, CoordKey, CubePath};

/// Stable handle to a node of an [`IndexTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug)]
struct Node {
    axis: Option<String>,
    value: Option<Coord>,
    result: Option<f64>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    index: HashMap<(String, CoordKey), NodeId>,
    alive: bool,
}

impl Node {
    fn new(axis: Option<String>, value: Option<Coord>, parent: Option<NodeId>) -> Self {
        Self {
            axis,
            value,
            result: None,
            parent,
            children: Vec::new(),
            index: HashMap::new(),
            alive: true,
        }
    }
}

/// Arena tree rooted at [`IndexTree::root`]; the root has no axis or value and is never removed.
#[derive(Clone, Debug)]
pub struct IndexTree {
    nodes: Vec<Node>,
}

impl Default for IndexTree {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexTree {
    pub fn new() -> Self {
        Self { nodes: vec![Node::new(None, None, None)] }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn axis(&self, id: NodeId) -> Option<&str> {
        self.node(id).axis.as_deref()
    }

    pub fn value(&self, id: NodeId) -> Option<&Coord> {
        self.node(id).value.as_ref()
    }

    pub fn result(&self, id: NodeId) -> Option<f64> {
        self.node(id).result
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Live children in discovery order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.alive)
    }

    pub fn find_child(&self, parent: NodeId, axis: &str, value: &Coord) -> Option<NodeId> {
        self.node(parent).index.get(&(axis.to_string(), value.key())).copied()
    }

    /// Child of `parent` for `(axis, value)`, created on first use.
    pub fn get_or_create_child(&mut self, parent: NodeId, axis: &str, value: Coord) -> NodeId {
        let key = (axis.to_string(), value.key());
        if let Some(&id) = self.nodes[parent.0].index.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(Some(axis.to_string()), Some(value), Some(parent)));
        let p = &mut self.nodes[parent.0];
        p.children.push(id);
        p.index.insert(key, id);
        id
    }

    pub fn set_result(&mut self, id: NodeId, value: f64) {
        self.nodes[id.0].result = Some(value);
    }

    /// Live non-root nodes without children, depth-first, left to right.
    /// Lazy; call again to restart.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            tree: self,
            stack: self.children(self.root()).iter().rev().copied().collect(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.alive).count()
    }

    /// True when no leaf survives.
    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut d = 0;
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            d += 1;
            cur = self.parent(p);
        }
        d
    }

    /// Axis → value path from the root down to `id`.
    pub fn flatten(&self, id: NodeId) -> CubePath {
        let mut chain = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.node(n);
            if let (Some(a), Some(v)) = (&node.axis, &node.value) {
                chain.push((a.clone(), v.clone()));
            }
            cur = node.parent;
        }
        chain.into_iter().rev().collect()
    }

    /// Remove `id` with its subtree; an ancestor left without children is
    /// removed too, up to (never including) the root.
    pub fn remove_branch(&mut self, id: NodeId) {
        if id == self.root() || !self.is_alive(id) {
            return;
        }
        self.kill_subtree(id);
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let key = match (&self.nodes[id.0].axis, &self.nodes[id.0].value) {
            (Some(a), Some(v)) => Some((a.clone(), v.key())),
            _ => None,
        };
        let p = &mut self.nodes[parent.0];
        p.children.retain(|&c| c != id);
        if let Some(key) = key {
            p.index.remove(&key);
        }
        if p.children.is_empty() {
            self.remove_branch(parent);
        }
    }

    fn kill_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let node = &mut self.nodes[n.0];
            node.alive = false;
            stack.extend(node.children.drain(..));
            node.index.clear();
        }
    }

    /// Path union with `other`: shared prefixes are reused, results of new leaves copied.
    pub fn merge(&mut self, other: &IndexTree) {
        let mut stack = vec![(other.root(), self.root())];
        while let Some((theirs, ours)) = stack.pop() {
            for &child in other.children(theirs) {
                let (Some(axis), Some(value)) = (other.axis(child), other.value(child)) else {
                    continue;
                };
                let mine = self.get_or_create_child(ours, axis, value.clone());
                if let Some(r) = other.result(child) {
                    if self.result(mine).is_none() {
                        self.set_result(mine, r);
                    }
                }
                stack.push((child, mine));
            }
        }
    }

    /// Indented rendering, one `axis=value` line per node, results after `->`.
    pub fn pretty(&self) -> String {
        let mut out = String::from("root\n");
        let mut stack: Vec<(NodeId, usize)> = self.children(self.root()).iter().rev().map(|&c| (c, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            let axis = self.axis(id).unwrap_or("?");
            let value = self.value(id).map(|v| v.to_string()).unwrap_or_default();
            let _ = match self.result(id) {
                Some(r) => writeln!(out, "{indent}{axis}={value} -> {r}"),
                None => writeln!(out, "{indent}{axis}={value}"),
            };
            stack.extend(self.children(id).iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }
}

/// Iterator returned by [`IndexTree::leaves`].
pub struct Leaves<'a> {
    tree: &'a IndexTree,
    stack: Vec<NodeId>,
}

impl Iterator for Leaves<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            let children = self.tree.children(id);
            if children.is_empty() {
                return Some(id);
            }
            self.stack.extend(children.iter().rev().copied());
        }
        None
    }
}
