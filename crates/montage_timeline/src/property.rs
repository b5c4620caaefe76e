// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable properties and the property-access capability.

use crate::animation::Animation;
use crate::time::Time;
use crate::value::AnimatedValue;
use montage_graph::{declared_children, Accessor, Identity, ObjectNode};
use serde::{Deserialize, Serialize};
use std::any::Any;

montage_graph::identity_type!(
    /// Unique identifier for a property
    PropertyId
);

/// A named value that may be driven by an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Unique property ID
    pub id: PropertyId,
    /// Property name, unique within its effect
    pub name: String,
    /// Current static value
    pub value: AnimatedValue,
    /// Value restored by "reset"
    pub default: AnimatedValue,
    /// Animation overriding the static value
    #[serde(default)]
    pub animation: Option<Animation>,
}

impl Property {
    const ACCESSORS: &'static [Accessor<Property>] = &[Accessor::property("animation", |p| {
        p.animation.iter().map(|a| a as &dyn ObjectNode).collect()
    })];

    /// Create a static property whose default is its initial value
    pub fn new(name: impl Into<String>, value: impl Into<AnimatedValue>) -> Self {
        let value = value.into();
        Self {
            id: PropertyId::new(),
            name: name.into(),
            default: value.clone(),
            value,
            animation: None,
        }
    }

    /// Attach an animation
    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Whether an animation with at least one span drives this property
    pub fn is_animated(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| !a.is_empty())
    }

    /// Value at `time`; the animation sample when animated, else the static value.
    ///
    /// `time` must already be on the clock the animation uses.
    pub fn value_at(&self, time: Time) -> AnimatedValue {
        self.animation
            .as_ref()
            .and_then(|a| a.sample(time))
            .unwrap_or_else(|| self.value.clone())
    }
}

/// Read/write access to a property, as used by property editors.
///
/// `set_value` is a raw write. Edits that should be undoable go through the
/// command layer instead.
pub trait PropertyAccess {
    /// Current static value
    fn value(&self) -> &AnimatedValue;
    /// Default value
    fn default_value(&self) -> &AnimatedValue;
    /// Overwrite the static value, returning the old one
    fn set_value(&mut self, value: AnimatedValue) -> AnimatedValue;
    /// Attached animation
    fn animation(&self) -> Option<&Animation>;
    /// Attached animation, mutably
    fn animation_mut(&mut self) -> Option<&mut Animation>;
}

impl PropertyAccess for Property {
    fn value(&self) -> &AnimatedValue {
        &self.value
    }

    fn default_value(&self) -> &AnimatedValue {
        &self.default
    }

    fn set_value(&mut self, value: AnimatedValue) -> AnimatedValue {
        std::mem::replace(&mut self.value, value)
    }

    fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    fn animation_mut(&mut self) -> Option<&mut Animation> {
        self.animation.as_mut()
    }
}

impl ObjectNode for Property {
    fn type_name(&self) -> &'static str {
        "Property"
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
