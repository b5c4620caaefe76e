// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undoable property and animation edits.
//!
//! Properties are addressed by [`PropertyPath`] rather than by reference so
//! a command stays valid while other commands reshape the scene around it.

use crate::commands::CommandError;
use crate::history::RecordableCommand;
use montage_timeline::{
    AnimatedValue, Animation, AnimationError, AnimationSpan, ClipId, EffectId, Easing, Property,
    PropertyAccess, Scene, Time, TimeRange,
};
use std::fmt;

/// Address of a property inside a scene
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    /// Owning clip
    pub clip: ClipId,
    /// Owning effect
    pub effect: EffectId,
    /// Property name within the effect
    pub property: String,
}

impl PropertyPath {
    /// Create a path
    pub fn new(clip: ClipId, effect: EffectId, property: impl Into<String>) -> Self {
        Self {
            clip,
            effect,
            property: property.into(),
        }
    }

    /// Resolve against a scene
    pub fn resolve<'a>(&self, scene: &'a Scene) -> Option<&'a Property> {
        scene.clip(self.clip)?.property(self.effect, &self.property)
    }

    /// Resolve mutably against a scene
    pub fn resolve_mut<'a>(&self, scene: &'a mut Scene) -> Option<&'a mut Property> {
        scene.clip_mut(self.clip)?.property_mut(self.effect, &self.property)
    }

    fn require<'a>(&self, scene: &'a Scene) -> Result<&'a Property, CommandError> {
        self.resolve(scene).ok_or_else(|| CommandError::PropertyNotFound(self.clone()))
    }

    fn require_animation<'a>(&self, scene: &'a Scene) -> Result<&'a Animation, CommandError> {
        self.require(scene)?
            .animation()
            .ok_or_else(|| CommandError::InvalidOperation(format!("Property {self} is not animated")))
    }

    /// Clip range repainted when the property changes
    fn clip_range(&self, scene: &Scene) -> Vec<TimeRange> {
        scene.clip(self.clip).map(|c| vec![c.range()]).unwrap_or_default()
    }

    fn edit(&self, scene: &mut Scene, f: impl FnOnce(&mut Property)) {
        match self.resolve_mut(scene) {
            Some(property) => f(property),
            None => tracing::warn!(path = %self, "property no longer in scene, edit skipped"),
        }
    }

    fn edit_animation(&self, scene: &mut Scene, f: impl FnOnce(&mut Animation) -> Result<(), AnimationError>) {
        let path = self;
        self.edit(scene, |property| match property.animation_mut() {
            Some(animation) => {
                if let Err(error) = f(animation) {
                    tracing::warn!(path = %path, %error, "animation edit skipped");
                }
            }
            None => tracing::warn!(path = %path, "animation no longer attached, edit skipped"),
        });
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.clip, self.effect, self.property)
    }
}

/// Set the static value of a property
#[derive(Debug, Clone)]
pub struct ChangeProperty {
    path: PropertyPath,
    old: AnimatedValue,
    new: AnimatedValue,
    ranges: Vec<TimeRange>,
}

impl ChangeProperty {
    /// Create the command; the value must keep the property's kind
    pub fn new(scene: &Scene, path: PropertyPath, value: AnimatedValue) -> Result<Self, CommandError> {
        let old = path.require(scene)?.value().clone();
        if old.kind() != value.kind() {
            return Err(CommandError::InvalidOperation(format!(
                "Property {path} holds {:?}, got {:?}",
                old.kind(),
                value.kind()
            )));
        }
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            old,
            new: value,
        })
    }
}

impl RecordableCommand<Scene> for ChangeProperty {
    fn description(&self) -> &str {
        "Change property"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let value = self.new.clone();
        self.path.edit(scene, |p| {
            p.set_value(value);
        });
    }

    fn undo(&mut self, scene: &mut Scene) {
        let value = self.old.clone();
        self.path.edit(scene, |p| {
            p.set_value(value);
        });
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Side of the anchor span a new span is inserted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertDirection {
    /// After the anchor
    Forward,
    /// Before the anchor
    Backward,
}

/// Insert a span next to an existing one, seeded from the property's value
#[derive(Debug, Clone)]
pub struct InsertSpan {
    path: PropertyPath,
    index: usize,
    span: AnimationSpan,
    ranges: Vec<TimeRange>,
}

impl InsertSpan {
    /// Create the command
    pub fn new(
        scene: &Scene,
        path: PropertyPath,
        anchor: usize,
        direction: InsertDirection,
    ) -> Result<Self, CommandError> {
        let property = path.require(scene)?;
        let animation = path.require_animation(scene)?;
        let (index, span) = match direction {
            InsertDirection::Forward => animation.new_forward_span(anchor, property.value())?,
            InsertDirection::Backward => animation.new_backward_span(anchor, property.value())?,
        };
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            index,
            span,
        })
    }

    /// Index the span is inserted at
    pub fn index(&self) -> usize {
        self.index
    }
}

impl RecordableCommand<Scene> for InsertSpan {
    fn description(&self) -> &str {
        "Insert animation span"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let (index, span) = (self.index, self.span.clone());
        self.path.edit_animation(scene, |a| a.insert_span(index, span));
    }

    fn undo(&mut self, scene: &mut Scene) {
        let index = self.index;
        self.path.edit_animation(scene, |a| a.remove_span(index).map(|_| ()));
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Remove a span
#[derive(Debug, Clone)]
pub struct RemoveSpan {
    path: PropertyPath,
    index: usize,
    span: AnimationSpan,
    ranges: Vec<TimeRange>,
}

impl RemoveSpan {
    /// Create the command
    pub fn new(scene: &Scene, path: PropertyPath, index: usize) -> Result<Self, CommandError> {
        let animation = path.require_animation(scene)?;
        let span = animation
            .span(index)
            .cloned()
            .ok_or(AnimationError::IndexOutOfRange { index, len: animation.len() })?;
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            index,
            span,
        })
    }
}

impl RecordableCommand<Scene> for RemoveSpan {
    fn description(&self) -> &str {
        "Remove animation span"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let index = self.index;
        self.path.edit_animation(scene, |a| a.remove_span(index).map(|_| ()));
    }

    fn undo(&mut self, scene: &mut Scene) {
        let (index, span) = (self.index, self.span.clone());
        self.path.edit_animation(scene, |a| a.insert_span(index, span));
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Reorder a span
#[derive(Debug, Clone)]
pub struct MoveSpan {
    path: PropertyPath,
    from: usize,
    to: usize,
    ranges: Vec<TimeRange>,
}

impl MoveSpan {
    /// Create the command
    pub fn new(scene: &Scene, path: PropertyPath, from: usize, to: usize) -> Result<Self, CommandError> {
        let len = path.require_animation(scene)?.len();
        for index in [from, to] {
            if index >= len {
                return Err(AnimationError::IndexOutOfRange { index, len }.into());
            }
        }
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            from,
            to,
        })
    }
}

impl RecordableCommand<Scene> for MoveSpan {
    fn description(&self) -> &str {
        "Move animation span"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let (from, to) = (self.from, self.to);
        self.path.edit_animation(scene, |a| a.move_span(from, to));
    }

    fn undo(&mut self, scene: &mut Scene) {
        let (from, to) = (self.from, self.to);
        self.path.edit_animation(scene, |a| a.move_span(to, from));
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Change the easing of a span
#[derive(Debug, Clone)]
pub struct SetEasing {
    path: PropertyPath,
    index: usize,
    old: Easing,
    new: Easing,
    ranges: Vec<TimeRange>,
}

impl SetEasing {
    /// Create the command
    pub fn new(scene: &Scene, path: PropertyPath, index: usize, easing: Easing) -> Result<Self, CommandError> {
        let animation = path.require_animation(scene)?;
        let old = animation
            .span(index)
            .map(|s| s.easing)
            .ok_or(AnimationError::IndexOutOfRange { index, len: animation.len() })?;
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            index,
            old,
            new: easing,
        })
    }
}

impl RecordableCommand<Scene> for SetEasing {
    fn description(&self) -> &str {
        "Set easing"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let (index, easing) = (self.index, self.new);
        self.path.edit_animation(scene, |a| a.set_easing(index, easing).map(|_| ()));
    }

    fn undo(&mut self, scene: &mut Scene) {
        let (index, easing) = (self.index, self.old);
        self.path.edit_animation(scene, |a| a.set_easing(index, easing).map(|_| ()));
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Change the duration of a span
#[derive(Debug, Clone)]
pub struct SetSpanDuration {
    path: PropertyPath,
    index: usize,
    old: Time,
    new: Time,
    ranges: Vec<TimeRange>,
}

impl SetSpanDuration {
    /// Create the command; the duration must be positive
    pub fn new(scene: &Scene, path: PropertyPath, index: usize, duration: Time) -> Result<Self, CommandError> {
        let animation = path.require_animation(scene)?;
        let old = animation
            .span(index)
            .map(AnimationSpan::duration)
            .ok_or(AnimationError::IndexOutOfRange { index, len: animation.len() })?;
        if !duration.is_positive() {
            return Err(AnimationError::NonPositiveDuration(duration).into());
        }
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            index,
            old,
            new: duration,
        })
    }
}

impl RecordableCommand<Scene> for SetSpanDuration {
    fn description(&self) -> &str {
        "Set span duration"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let (index, duration) = (self.index, self.new);
        self.path.edit_animation(scene, |a| a.set_duration(index, duration).map(|_| ()));
    }

    fn undo(&mut self, scene: &mut Scene) {
        let (index, duration) = (self.index, self.old);
        self.path.edit_animation(scene, |a| a.set_duration(index, duration).map(|_| ()));
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Change the start and end values of a span
#[derive(Debug, Clone)]
pub struct SetSpanValues {
    path: PropertyPath,
    index: usize,
    old: (AnimatedValue, AnimatedValue),
    new: (AnimatedValue, AnimatedValue),
    ranges: Vec<TimeRange>,
}

impl SetSpanValues {
    /// Create the command
    pub fn new(
        scene: &Scene,
        path: PropertyPath,
        index: usize,
        previous: AnimatedValue,
        next: AnimatedValue,
    ) -> Result<Self, CommandError> {
        let animation = path.require_animation(scene)?;
        let old = animation
            .span(index)
            .map(|s| (s.previous.clone(), s.next.clone()))
            .ok_or(AnimationError::IndexOutOfRange { index, len: animation.len() })?;
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            index,
            old,
            new: (previous, next),
        })
    }
}

impl RecordableCommand<Scene> for SetSpanValues {
    fn description(&self) -> &str {
        "Set span values"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let index = self.index;
        let (previous, next) = self.new.clone();
        self.path.edit_animation(scene, |a| a.set_values(index, previous, next).map(|_| ()));
    }

    fn undo(&mut self, scene: &mut Scene) {
        let index = self.index;
        let (previous, next) = self.old.clone();
        self.path.edit_animation(scene, |a| a.set_values(index, previous, next).map(|_| ()));
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Attach or detach a property's animation.
///
/// Attaching creates one span holding the current value. Detaching keeps
/// the removed animation so undo can put it back unchanged.
#[derive(Debug, Clone)]
pub struct ToggleAnimation {
    path: PropertyPath,
    /// Whatever is not currently attached to the property
    stored: Option<Animation>,
    attaching: bool,
    ranges: Vec<TimeRange>,
}

impl ToggleAnimation {
    /// Create the command
    pub fn new(scene: &Scene, path: PropertyPath) -> Result<Self, CommandError> {
        let property = path.require(scene)?;
        let (stored, attaching) = match property.animation() {
            Some(_) => (None, false),
            None => {
                let seed = Animation::new();
                let (_, span) = seed.new_forward_span(0, property.value())?;
                (Some(Animation::with_spans([span])), true)
            }
        };
        Ok(Self {
            ranges: path.clip_range(scene),
            path,
            stored,
            attaching,
        })
    }

    fn swap(&mut self, scene: &mut Scene) {
        let stored = &mut self.stored;
        self.path.edit(scene, |property| std::mem::swap(&mut property.animation, stored));
    }
}

impl RecordableCommand<Scene> for ToggleAnimation {
    fn description(&self) -> &str {
        if self.attaching {
            "Animate property"
        } else {
            "Remove animation"
        }
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.swap(scene);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.swap(scene);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}
