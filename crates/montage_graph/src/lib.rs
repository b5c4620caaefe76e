// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object graph framework for the Montage editor.
//!
//! Every persisted domain object carries an [`Identity`]. This crate knows how
//! to walk a tree of such objects without runtime reflection and how to clone
//! one with all identities replaced:
//! - Declared child accessors per type ([`ObjectNode`], [`Accessor`])
//! - Depth-first search with a visited set ([`ObjectSearcher`])
//! - Arena snapshots for shape comparison ([`ObjectGraph`])
//! - Identity-remapping clone ([`reborn`])
//!
//! ## Architecture
//!
//! Domain types own their children by value, so the live graph is a tree.
//! Cross references between objects are stored as identities and reported
//! through [`ObjectNode::references`]; reborn rewrites them together with the
//! identities they point at.

pub mod identity;
pub mod node;
pub mod searcher;
pub mod graph;
pub mod reborn;

pub use identity::{Identity, IdentityMap};
pub use node::{declared_children, Accessor, AccessorKind, ObjectNode};
pub use searcher::{collect_identities, ObjectSearcher};
pub use graph::{GraphNode, NodeIndex, ObjectGraph};
pub use reborn::{reborn, rewrite_identities, Reborn, RebornError};
