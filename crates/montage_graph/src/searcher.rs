// SPDX-License-Identifier: MIT OR Apache-2.0
//! Depth-first search over live object nodes.

use crate::identity::Identity;
use crate::node::{node_key, NodeKey, ObjectNode};
use indexmap::IndexSet;
use std::collections::HashSet;

/// Searches a node tree for objects matching a predicate
pub struct ObjectSearcher<'a, P> {
    root: &'a dyn ObjectNode,
    predicate: P,
}

impl<'a, P> ObjectSearcher<'a, P>
where
    P: FnMut(&dyn ObjectNode) -> bool,
{
    /// Create a searcher rooted at `root`
    pub fn new(root: &'a dyn ObjectNode, predicate: P) -> Self {
        Self { root, predicate }
    }

    /// First matching node in depth-first pre-order
    pub fn search(mut self) -> Option<&'a dyn ObjectNode> {
        let mut found = None;
        walk(self.root, |node| {
            if (self.predicate)(node) {
                found = Some(node);
                false
            } else {
                true
            }
        });
        found
    }

    /// All matching nodes in depth-first pre-order, each reported once
    pub fn search_all(mut self) -> Vec<&'a dyn ObjectNode> {
        let mut found = Vec::new();
        walk(self.root, |node| {
            if (self.predicate)(node) {
                found.push(node);
            }
            true
        });
        found
    }
}

/// Distinct identities reachable from `root`, in visit order
pub fn collect_identities(root: &dyn ObjectNode) -> IndexSet<Identity> {
    let mut identities = IndexSet::new();
    walk(root, |node| {
        if let Some(id) = node.identity() {
            identities.insert(id);
        }
        true
    });
    identities
}

/// Iterative pre-order walk; `visit` returns `false` to stop early.
///
/// A node reached through several paths is visited once.
pub(crate) fn walk<'a>(root: &'a dyn ObjectNode, mut visit: impl FnMut(&'a dyn ObjectNode) -> bool) {
    let mut visited: HashSet<NodeKey> = HashSet::new();
    let mut stack: Vec<&'a dyn ObjectNode> = vec![root];

    while let Some(node) = stack.pop() {
        if !visited.insert(node_key(node)) {
            continue;
        }

        if !visit(node) {
            return;
        }

        // Reverse so the first declared child is visited first
        let children = node.children();
        stack.extend(children.into_iter().rev());
    }
}
