// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identity values shared by every persisted object.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique identifier of a persisted object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub Uuid);

impl Identity {
    /// Create a new random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the canonical string form
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text).ok().map(Self)
    }

    /// Canonical string form, as written by the serializer
    pub fn canonical(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Define a typed identity newtype that converts into [`Identity`].
#[macro_export]
macro_rules! identity_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $crate::Identity);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self($crate::Identity::new())
            }

            /// The untyped identity
            pub fn identity(&self) -> $crate::Identity {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<$name> for $crate::Identity {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

/// Bijective mapping from old identities to freshly generated ones
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: IndexMap<Identity, Identity>,
}

impl IdentityMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh identity for every old identity.
    ///
    /// Duplicates in `old` are collapsed so the mapping stays one-to-one.
    pub fn fresh_for(old: impl IntoIterator<Item = Identity>) -> Self {
        let mut entries = IndexMap::new();
        for id in old {
            entries.entry(id).or_insert_with(Identity::new);
        }
        Self { entries }
    }

    /// Look up the replacement for an old identity
    pub fn get(&self, old: Identity) -> Option<Identity> {
        self.entries.get(&old).copied()
    }

    /// Map an identity, leaving unknown identities untouched
    pub fn map(&self, id: Identity) -> Identity {
        self.get(id).unwrap_or(id)
    }

    /// Number of mapped identities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(old, new)` pairs in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (Identity, Identity)> + '_ {
        self.entries.iter().map(|(old, new)| (*old, *new))
    }

    /// Mapping from new identities back to old ones
    pub fn invert(&self) -> Self {
        Self {
            entries: self.entries.iter().map(|(old, new)| (*new, *old)).collect(),
        }
    }

    /// Lookup by canonical string, used when rewriting serialized trees
    pub(crate) fn by_canonical(&self) -> std::collections::HashMap<String, String> {
        self.entries
            .iter()
            .map(|(old, new)| (old.canonical(), new.canonical()))
            .collect()
    }
}
