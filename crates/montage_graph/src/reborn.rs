// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identity-remapping deep clone.
//!
//! The object is serialized to a [`serde_json::Value`], every identity found
//! by the searcher is replaced with a fresh one wherever it appears as a
//! whole string value or object key, and the tree is deserialized again.
//! References to identities outside the cloned subtree are left alone.

use crate::identity::IdentityMap;
use crate::node::ObjectNode;
use crate::searcher::collect_identities;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while cloning with fresh identities
#[derive(Debug, Error)]
pub enum RebornError {
    /// The source object could not be serialized
    #[error("Failed to serialize object: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The rewritten tree could not be turned back into the object type
    #[error("Failed to deserialize rewritten object: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// A cloned object together with the identities it was given
#[derive(Debug, Clone)]
pub struct Reborn<T> {
    /// The independent copy
    pub value: T,
    /// Old identity to new identity
    pub map: IdentityMap,
}

/// Clone `root` so that every identity inside it is new.
///
/// The result is structurally equal to `root` apart from identities, and
/// internal references follow their targets to the new identities.
pub fn reborn<T>(root: &T) -> Result<Reborn<T>, RebornError>
where
    T: ObjectNode + Serialize + DeserializeOwned,
{
    let identities = collect_identities(root);
    let mut value = serde_json::to_value(root).map_err(RebornError::Serialize)?;

    let map = IdentityMap::fresh_for(identities);
    rewrite_identities(&mut value, &map);

    let value = serde_json::from_value(value).map_err(RebornError::Deserialize)?;
    tracing::debug!(type_name = root.type_name(), identities = map.len(), "reborn object");
    Ok(Reborn { value, map })
}

/// Replace identities inside a serialized tree according to `map`
pub fn rewrite_identities(value: &mut Value, map: &IdentityMap) {
    if map.is_empty() {
        return;
    }
    let lookup = map.by_canonical();
    rewrite(value, &lookup);
}

fn rewrite(value: &mut Value, lookup: &HashMap<String, String>) {
    match value {
        Value::String(text) => {
            if let Some(new) = lookup.get(text.as_str()) {
                *text = new.clone();
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite(item, lookup);
            }
        }
        Value::Object(fields) => {
            let mut rewritten = Map::with_capacity(fields.len());
            for (key, mut field) in std::mem::take(fields) {
                rewrite(&mut field, lookup);
                let key = lookup.get(key.as_str()).cloned().unwrap_or(key);
                rewritten.insert(key, field);
            }
            *fields = rewritten;
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ObjectGraph;
    use crate::identity::Identity;
    use crate::node::fixtures::*;
    use serde_json::json;

    #[test]
    fn test_reborn_gives_disjoint_identities() {
        let tree = sample_tree();
        let before = collect_identities(&tree);
        let copy = reborn(&tree).unwrap();
        let after = collect_identities(&copy.value);

        assert_eq!(before.len(), after.len());
        assert!(before.iter().all(|id| !after.contains(id)));
        assert_eq!(copy.map.len(), before.len());
    }

    #[test]
    fn test_reborn_remaps_inline_first_child() {
        let wrapper = Wrapper::new("inner");
        let copy = reborn(&wrapper).unwrap();
        assert_eq!(copy.map.len(), 2);
        assert_ne!(copy.value.id, wrapper.id);
        assert_ne!(copy.value.inner.id, wrapper.inner.id);
        assert_eq!(copy.value.inner.label, "inner");
    }

    #[test]
    fn test_reborn_preserves_shape() {
        let tree = sample_tree();
        let copy = reborn(&tree).unwrap();

        let original = ObjectGraph::capture(&tree);
        let cloned = ObjectGraph::capture(&copy.value);
        assert!(original.is_isomorphic_under(&cloned, &copy.map));

        let labels: Vec<_> = copy.value.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_reborn_remaps_internal_references() {
        let tree = sample_tree();
        let copy = reborn(&tree).unwrap();

        let a = &copy.value.items[0];
        let b = &copy.value.items[1];
        assert_eq!(b.linked, Some(a.id));
        assert_eq!(copy.value.subfolders[0].owner, Some(copy.value.id));
    }

    #[test]
    fn test_external_reference_left_alone() {
        let outside = ItemId::new();
        let mut tree = sample_tree();
        tree.items[0].linked = Some(outside);

        let copy = reborn(&tree).unwrap();
        assert_eq!(copy.value.items[0].linked, Some(outside));
    }

    #[test]
    fn test_reborn_twice_is_independent() {
        let tree = sample_tree();
        let snapshot = tree.clone();
        let first = reborn(&tree).unwrap();
        let second = reborn(&tree).unwrap();
        assert_ne!(first.value.id, second.value.id);
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn test_rewrite_keys_and_values() {
        let old = Identity::new();
        let map = IdentityMap::fresh_for([old]);
        let new = map.map(old).canonical();

        let mut value = json!({
            (old.canonical()): [old.canonical(), "unrelated", 3],
            "nested": { "id": old.canonical() },
        });
        rewrite_identities(&mut value, &map);

        assert_eq!(value[new.as_str()][0], json!(new));
        assert_eq!(value[new.as_str()][1], json!("unrelated"));
        assert_eq!(value["nested"]["id"], json!(new));
        assert!(value.get(old.canonical()).is_none());
    }
}
