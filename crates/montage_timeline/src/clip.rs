// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clips placed on the timeline.

use crate::effect::{Effect, EffectId};
use crate::property::Property;
use crate::scene::PlacementError;
use crate::time::{Time, TimeRange};
use crate::value::AnimatedValue;
use montage_graph::{declared_children, Accessor, Identity, ObjectNode};
use serde::{Deserialize, Serialize};
use std::any::Any;

montage_graph::identity_type!(
    /// Unique identifier for a clip
    ClipId
);

/// Where a clip sits on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Start time in the scene
    pub start: Time,
    /// Length, always positive once validated
    pub length: Time,
    /// Layer index
    pub layer: u32,
}

impl Placement {
    /// Create a placement
    pub fn new(start: Time, length: Time, layer: u32) -> Self {
        Self { start, length, layer }
    }

    /// Occupied time range
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.length)
    }

    /// Exclusive end time
    pub fn end(&self) -> Time {
        self.start + self.length
    }

    /// Check the scene-independent constraints
    pub fn validate(&self) -> Result<(), PlacementError> {
        if self.start.is_negative() {
            return Err(PlacementError::NegativeStart(self.start));
        }
        if !self.length.is_positive() {
            return Err(PlacementError::NonPositiveLength(self.length));
        }
        Ok(())
    }
}

/// A time-bounded unit of content on one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Display name
    pub name: String,
    /// Start time in the scene
    pub start: Time,
    /// Length in the scene
    pub length: Time,
    /// Layer index
    pub layer: u32,
    /// Local time at the clip's start (in-point)
    #[serde(default)]
    pub offset: Time,
    /// Effects in application order
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Clip {
    const ACCESSORS: &'static [Accessor<Clip>] = &[Accessor::collection("effects", |c| {
        c.effects.iter().map(|e| e as &dyn ObjectNode).collect()
    })];

    /// Create an empty clip
    pub fn new(name: impl Into<String>, start: Time, length: Time, layer: u32) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            start,
            length,
            layer,
            offset: Time::ZERO,
            effects: Vec::new(),
        }
    }

    /// Append an effect
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Occupied time range
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.length)
    }

    /// Exclusive end time
    pub fn end(&self) -> Time {
        self.start + self.length
    }

    /// Current placement
    pub fn placement(&self) -> Placement {
        Placement::new(self.start, self.length, self.layer)
    }

    /// Overwrite start, length and layer
    pub fn apply_placement(&mut self, placement: Placement) {
        self.start = placement.start;
        self.length = placement.length;
        self.layer = placement.layer;
    }

    /// Clip-local time for a scene time
    pub fn local_time(&self, scene_time: Time) -> Time {
        scene_time - self.start + self.offset
    }

    /// Get an effect by ID
    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Get a mutable effect by ID
    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        self.effects.iter_mut().find(|e| e.id == id)
    }

    /// Find a property by effect and name
    pub fn property(&self, effect: EffectId, name: &str) -> Option<&Property> {
        self.effect(effect)?.property(name)
    }

    /// Find a mutable property by effect and name
    pub fn property_mut(&mut self, effect: EffectId, name: &str) -> Option<&mut Property> {
        self.effect_mut(effect)?.property_mut(name)
    }

    /// Value of a property at a scene time.
    ///
    /// Animations on the global clock see `scene_time`, all others see
    /// clip-local time.
    pub fn sample(&self, effect: EffectId, name: &str, scene_time: Time) -> Option<AnimatedValue> {
        let property = self.property(effect, name)?;
        let time = match &property.animation {
            Some(animation) if animation.use_global_clock => scene_time,
            _ => self.local_time(scene_time),
        };
        Some(property.value_at(time))
    }
}

impl ObjectNode for Clip {
    fn type_name(&self) -> &'static str {
        "Clip"
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
