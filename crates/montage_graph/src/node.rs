// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declared-property registry for object nodes.
//!
//! Each domain type lists its children once, as a static slice of
//! [`Accessor`]s, instead of being inspected at runtime.

use crate::identity::Identity;
use std::any::{Any, TypeId};

/// How an accessor relates a node to what it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// A single owned child object
    Property,
    /// An enumerable collection of children
    Collection,
    /// Back-reference to the owner; never traversed
    Parent,
}

/// A named child accessor for nodes of type `T`
pub struct Accessor<T: ?Sized> {
    /// Declared property name
    pub name: &'static str,
    /// Relation kind
    pub kind: AccessorKind,
    /// Returns the children reachable through this property
    pub get: fn(&T) -> Vec<&dyn ObjectNode>,
}

impl<T: ?Sized> Accessor<T> {
    /// Accessor for a single child
    pub const fn property(name: &'static str, get: fn(&T) -> Vec<&dyn ObjectNode>) -> Self {
        Self { name, kind: AccessorKind::Property, get }
    }

    /// Accessor for a collection of children
    pub const fn collection(name: &'static str, get: fn(&T) -> Vec<&dyn ObjectNode>) -> Self {
        Self { name, kind: AccessorKind::Collection, get }
    }

    /// Accessor for the owner back-reference
    pub const fn parent(name: &'static str, get: fn(&T) -> Vec<&dyn ObjectNode>) -> Self {
        Self { name, kind: AccessorKind::Parent, get }
    }
}

/// An object that can be reached during graph traversal
pub trait ObjectNode: Any {
    /// Type name used in arena snapshots
    fn type_name(&self) -> &'static str;

    /// Identity of this object, if it is persisted
    fn identity(&self) -> Option<Identity> {
        None
    }

    /// Child objects in declaration order, excluding parent references.
    ///
    /// Nodes without children are leaves.
    fn children(&self) -> Vec<&dyn ObjectNode> {
        Vec::new()
    }

    /// Identities of other objects this node refers to without owning them
    fn references(&self) -> Vec<Identity> {
        Vec::new()
    }

    /// Upcast for downcasting search results
    fn as_any(&self) -> &dyn Any;
}

/// Collect children through a static accessor list, skipping parent links.
pub fn declared_children<'a, T>(node: &'a T, accessors: &[Accessor<T>]) -> Vec<&'a dyn ObjectNode> {
    accessors
        .iter()
        .filter(|accessor| accessor.kind != AccessorKind::Parent)
        .flat_map(|accessor| (accessor.get)(node))
        .collect()
}

/// Reference-equality key for visited sets.
///
/// A child stored inline at offset zero shares its parent's address, so the
/// concrete type is part of the key.
pub(crate) type NodeKey = (usize, TypeId);

pub(crate) fn node_key(node: &dyn ObjectNode) -> NodeKey {
    let address = node as *const dyn ObjectNode as *const () as usize;
    (address, node.as_any().type_id())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    struct WithParent {
        owner: Folder,
        child: Item,
    }

    impl WithParent {
        const ACCESSORS: &'static [Accessor<WithParent>] = &[
            Accessor::parent("owner", |w| vec![&w.owner as &dyn ObjectNode]),
            Accessor::property("child", |w| vec![&w.child as &dyn ObjectNode]),
        ];
    }

    #[test]
    fn test_declared_children_in_order() {
        let tree = sample_tree();
        let children = tree.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].type_name(), "Item");
        assert_eq!(children[2].type_name(), "Folder");
    }

    #[test]
    fn test_parent_accessor_is_skipped() {
        let node = WithParent { owner: Folder::new(), child: Item::new("x") };
        let children = declared_children(&node, WithParent::ACCESSORS);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].identity(), Some(node.child.id.into()));
    }

    #[test]
    fn test_inline_child_has_distinct_key() {
        let wrapper = Wrapper::new("inner");
        let child = wrapper.children()[0];
        assert_ne!(node_key(&wrapper), node_key(child));
    }
}
