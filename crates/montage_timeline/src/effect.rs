// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effects: the addressable operations a clip applies.

use crate::property::Property;
use crate::value::AnimatedValue;
use indexmap::IndexMap;
use montage_graph::{declared_children, Accessor, Identity, ObjectNode};
use serde::{Deserialize, Serialize};
use std::any::Any;

montage_graph::identity_type!(
    /// Unique identifier for an effect
    EffectId
);

/// A named operation with animatable properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Unique effect ID
    pub id: EffectId,
    /// Effect name, e.g. "Transform"
    pub name: String,
    /// Whether the effect is applied
    pub enabled: bool,
    /// Properties keyed by name
    pub properties: IndexMap<String, Property>,
}

impl Effect {
    const ACCESSORS: &'static [Accessor<Effect>] = &[Accessor::collection("properties", |e| {
        e.properties.values().map(|p| p as &dyn ObjectNode).collect()
    })];

    /// Create an effect without properties
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EffectId::new(),
            name: name.into(),
            enabled: true,
            properties: IndexMap::new(),
        }
    }

    /// Add a static property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<AnimatedValue>) -> Self {
        let property = Property::new(name, value);
        self.properties.insert(property.name.clone(), property);
        self
    }

    /// Insert or replace a property
    pub fn insert_property(&mut self, property: Property) -> Option<Property> {
        self.properties.insert(property.name.clone(), property)
    }

    /// Get a property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Get a mutable property by name
    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }
}

impl ObjectNode for Effect {
    fn type_name(&self) -> &'static str {
        "Effect"
    }

    fn identity(&self) -> Option<Identity> {
        Some(self.id.into())
    }

    fn children(&self) -> Vec<&dyn ObjectNode> {
        declared_children(self, Self::ACCESSORS)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
