// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arena snapshot of an object graph.

use crate::identity::{Identity, IdentityMap};
use crate::node::{node_key, NodeKey, ObjectNode};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Stable index of a node inside an [`ObjectGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

/// One captured node
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Identity of the captured object
    pub identity: Option<Identity>,
    /// Type name reported by the object
    pub type_name: &'static str,
    /// Child edges in declaration order; repeated indices are shared children
    pub children: Vec<NodeIndex>,
    /// Cross references by identity
    pub references: Vec<Identity>,
}

/// An arena of nodes captured from a live object tree
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    nodes: Vec<GraphNode>,
}

impl ObjectGraph {
    /// Capture everything reachable from `root`.
    ///
    /// Node 0 is the root. A node reachable through several paths is stored
    /// once and every path records an edge to the same index.
    pub fn capture(root: &dyn ObjectNode) -> Self {
        let mut graph = Self::default();
        let mut indices: HashMap<NodeKey, NodeIndex> = HashMap::new();
        let mut pending: Vec<(NodeIndex, &dyn ObjectNode)> = Vec::new();

        let root_index = graph.push(root);
        indices.insert(node_key(root), root_index);
        pending.push((root_index, root));

        while let Some((index, node)) = pending.pop() {
            let mut edges = Vec::new();
            for child in node.children() {
                let key = node_key(child);
                let child_index = match indices.get(&key) {
                    Some(existing) => *existing,
                    None => {
                        let new_index = graph.push(child);
                        indices.insert(key, new_index);
                        pending.push((new_index, child));
                        new_index
                    }
                };
                edges.push(child_index);
            }
            graph.nodes[index.0].children = edges;
        }

        tracing::trace!(nodes = graph.node_count(), "captured object graph");
        graph
    }

    fn push(&mut self, node: &dyn ObjectNode) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());
        self.nodes.push(GraphNode {
            identity: node.identity(),
            type_name: node.type_name(),
            children: Vec::new(),
            references: node.references(),
        });
        index
    }

    /// Root node index
    pub fn root(&self) -> Option<NodeIndex> {
        (!self.nodes.is_empty()).then_some(NodeIndex(0))
    }

    /// Get a node by index
    pub fn node(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.nodes.get(index.0)
    }

    /// Number of distinct nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of child edges, counting repeats
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// Distinct identities of all nodes
    pub fn identities(&self) -> IndexSet<Identity> {
        self.nodes.iter().filter_map(|n| n.identity).collect()
    }

    /// Depth-first search over the arena using a seen-index set
    pub fn search_all(&self, mut predicate: impl FnMut(&GraphNode) -> bool) -> Vec<NodeIndex> {
        let mut found = Vec::new();
        let Some(root) = self.root() else {
            return found;
        };

        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut seen[index.0], true) {
                continue;
            }
            let node = &self.nodes[index.0];
            if predicate(node) {
                found.push(index);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    /// Whether `other` has the same shape as `self` once identities are
    /// mapped through `map`.
    ///
    /// Compares node order, type names, child edges with multiplicity and
    /// cross references. Identities missing from `map` must be equal.
    pub fn is_isomorphic_under(&self, other: &ObjectGraph, map: &IdentityMap) -> bool {
        if self.nodes.len() != other.nodes.len() {
            return false;
        }

        self.nodes.iter().zip(other.nodes.iter()).all(|(a, b)| {
            a.type_name == b.type_name
                && a.children == b.children
                && a.identity.map(|id| map.map(id)) == b.identity
                && a.references.len() == b.references.len()
                && a.references
                    .iter()
                    .zip(b.references.iter())
                    .all(|(x, y)| map.map(*x) == *y)
        })
    }
}
