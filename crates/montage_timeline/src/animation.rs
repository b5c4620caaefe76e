// SPDX-License-Identifier: MIT OR Apache-2.0
//! Span-based keyframe animation of a single property.
//!
//! An [`Animation`] is a list of back-to-back [`AnimationSpan`]s. Each span
//! moves from `previous` to `next` over its duration, shaped by its easing.

use crate::easing::{Easing, EasingFunction};
use crate::time::Time;
use crate::value::{AnimatedValue, Interpolator, LinearInterpolator};
use montage_graph::{declared_children, Accessor, Identity, ObjectNode};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

montage_graph::identity_type!(
    /// Unique identifier for an animation
    AnimationId
);
montage_graph::identity_type!(
    /// Unique identifier for an animation span
    SpanId
);

/// Duration of a span inserted next to nothing
pub const DEFAULT_SPAN_DURATION: Time = Time::from_secs(1);

/// Errors from animation edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// Span durations must be positive
    #[error("Span duration must be positive, got {0}")]
    NonPositiveDuration(Time),
    /// Span index does not exist
    #[error("Span index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of spans
        len: usize,
    },
}

/// One timed segment of an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpanRecord")]
pub struct AnimationSpan {
    /// Unique span ID
    pub id: SpanId,
    /// Value at the start of the span
    pub previous: AnimatedValue,
    /// Value at the end of the span
    pub next: AnimatedValue,
    /// Length of the span, always positive
    duration: Time,
    /// Progress shaping
    pub easing: Easing,
}

#[derive(Deserialize)]
struct SpanRecord {
    id: SpanId,
    previous: AnimatedValue,
    next: AnimatedValue,
    duration: Time,
    easing: Easing,
}

impl TryFrom<SpanRecord> for AnimationSpan {
    type Error = AnimationError;

    fn try_from(record: SpanRecord) -> Result<Self, Self::Error> {
        let mut span = AnimationSpan::new(record.previous, record.next, record.duration, record.easing)?;
        span.id = record.id;
        Ok(span)
    }
}

impl AnimationSpan {
    /// Create a span, rejecting non-positive durations
    pub fn new(
        previous: impl Into<AnimatedValue>,
        next: impl Into<AnimatedValue>,
        duration: Time,
        easing: Easing,
    ) -> Result<Self, AnimationError> {
        if !duration.is_positive() {
            return Err(AnimationError::NonPositiveDuration(duration));
        }
        Ok(Self {
            id: SpanId::new(),
            previous: previous.into(),
            next: next.into(),
            duration,
            easing,
        })
    }

    /// Length of the span
    pub fn duration(&self) -> Time {
        self.duration
    }

    /// Value at `local` time inside the span
    fn sample_with(&self, local: Time, interpolator: &dyn Interpolator) -> AnimatedValue {
        let progress = local.ratio(self.duration);
        interpolator.interpolate(&self.previous, &self.next, self.easing.ease(progress))
    }
}

/// Ordered spans animating one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Unique animation ID
    pub id: AnimationId,
    /// Sample with scene time instead of clip-local time
    #[serde(default)]
    pub use_global_clock: bool,
    spans: Vec<AnimationSpan>,
}

impl Animation {
    const ACCESSORS: &'static [Accessor<Animation>] = &[Accessor::collection("spans", |a| {
        a.spans.iter().map(|s| s as &dyn ObjectNode).collect()
    })];

    /// Create an empty animation
    pub fn new() -> Self {
        Self {
            id: AnimationId::new(),
            use_global_clock: false,
            spans: Vec::new(),
        }
    }

    /// Create an animation from spans
    pub fn with_spans(spans: impl IntoIterator<Item = AnimationSpan>) -> Self {
        Self {
            spans: spans.into_iter().collect(),
            ..Self::new()
        }
    }

    /// Spans in order
    pub fn spans(&self) -> &[AnimationSpan] {
        &self.spans
    }

    /// Span at `index`
    pub fn span(&self, index: usize) -> Option<&AnimationSpan> {
        self.spans.get(index)
    }

    /// Number of spans
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether there are no spans
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Position of the span with `id`
    pub fn index_of(&self, id: SpanId) -> Option<usize> {
        self.spans.iter().position(|s| s.id == id)
    }

    /// Sum of all span durations
    pub fn total_duration(&self) -> Time {
        self.spans.iter().fold(Time::ZERO, |acc, s| acc + s.duration)
    }

    /// Time at which span `index` begins
    pub fn span_start(&self, index: usize) -> Option<Time> {
        if index >= self.spans.len() {
            return None;
        }
        Some(self.spans[..index].iter().fold(Time::ZERO, |acc, s| acc + s.duration))
    }

    /// Index of the span covering `time`, if any
    pub fn span_index_at(&self, time: Time) -> Option<usize> {
        if time.is_negative() {
            return None;
        }
        let mut elapsed = Time::ZERO;
        for (index, span) in self.spans.iter().enumerate() {
            if time < elapsed + span.duration {
                return Some(index);
            }
            elapsed += span.duration;
        }
        None
    }

    /// Value at `time` using the default interpolation
    pub fn sample(&self, time: Time) -> Option<AnimatedValue> {
        self.sample_with(time, &LinearInterpolator)
    }

    /// Value at `time` using a caller-supplied interpolator.
    ///
    /// Before the first span this is the first span's `previous`; at or after
    /// the end it is the last span's `next`. `None` when there are no spans.
    pub fn sample_with(&self, time: Time, interpolator: &dyn Interpolator) -> Option<AnimatedValue> {
        let first = self.spans.first()?;
        if time.is_negative() {
            return Some(first.previous.clone());
        }

        let mut elapsed = Time::ZERO;
        for span in &self.spans {
            let end = elapsed + span.duration;
            if time < end {
                return Some(span.sample_with(time - elapsed, interpolator));
            }
            elapsed = end;
        }

        self.spans.last().map(|s| s.next.clone())
    }

    fn check_index(&self, index: usize, len: usize) -> Result<(), AnimationError> {
        if index < len {
            Ok(())
        } else {
            Err(AnimationError::IndexOutOfRange { index, len: self.spans.len() })
        }
    }

    /// Insert a span at `index` (`index <= len`)
    pub fn insert_span(&mut self, index: usize, span: AnimationSpan) -> Result<(), AnimationError> {
        self.check_index(index, self.spans.len() + 1)?;
        self.spans.insert(index, span);
        Ok(())
    }

    /// Remove and return the span at `index`
    pub fn remove_span(&mut self, index: usize) -> Result<AnimationSpan, AnimationError> {
        self.check_index(index, self.spans.len())?;
        Ok(self.spans.remove(index))
    }

    /// Move the span at `from` so it ends up at `to`
    pub fn move_span(&mut self, from: usize, to: usize) -> Result<(), AnimationError> {
        self.check_index(from, self.spans.len())?;
        self.check_index(to, self.spans.len())?;
        let span = self.spans.remove(from);
        self.spans.insert(to, span);
        Ok(())
    }

    /// Replace a span's easing, returning the old one
    pub fn set_easing(&mut self, index: usize, easing: Easing) -> Result<Easing, AnimationError> {
        self.check_index(index, self.spans.len())?;
        Ok(std::mem::replace(&mut self.spans[index].easing, easing))
    }

    /// Replace a span's duration, returning the old one
    pub fn set_duration(&mut self, index: usize, duration: Time) -> Result<Time, AnimationError> {
        self.check_index(index, self.spans.len())?;
        if !duration.is_positive() {
            return Err(AnimationError::NonPositiveDuration(duration));
        }
        Ok(std::mem::replace(&mut self.spans[index].duration, duration))
    }

    /// Replace a span's boundary values, returning the old pair
    pub fn set_values(
        &mut self,
        index: usize,
        previous: AnimatedValue,
        next: AnimatedValue,
    ) -> Result<(AnimatedValue, AnimatedValue), AnimationError> {
        self.check_index(index, self.spans.len())?;
        let span = &mut self.spans[index];
        let old_previous = std::mem::replace(&mut span.previous, previous);
        let old_next = std::mem::replace(&mut span.next, next);
        Ok((old_previous, old_next))
    }

    /// Span to insert after `anchor`, plus its insertion index.
    ///
    /// Both ends start at `seed`; easing and duration are copied from the
    /// anchor span. On an empty animation the span goes first with
    /// [`DEFAULT_SPAN_DURATION`].
    pub fn new_forward_span(&self, anchor: usize, seed: &AnimatedValue) -> Result<(usize, AnimationSpan), AnimationError> {
        if self.spans.is_empty() {
            return Ok((0, seeded_span(seed, None)));
        }
        self.check_index(anchor, self.spans.len())?;
        Ok((anchor + 1, seeded_span(seed, Some(&self.spans[anchor]))))
    }

    /// Span to insert before `anchor`, plus its insertion index
    pub fn new_backward_span(&self, anchor: usize, seed: &AnimatedValue) -> Result<(usize, AnimationSpan), AnimationError> {
        if self.spans.is_empty() {
            return Ok((0, seeded_span(seed, None)));
        }
        self.check_index(anchor, self.spans.len())?;
        Ok((anchor, seeded_span(seed, Some(&self.spans[anchor]))))
    }
}

fn seeded_span(seed: &AnimatedValue, neighbour: Option<&AnimationSpan>) -> AnimationSpan {
    let (duration, easing) = neighbour
        .map(|n| (n.duration, n.easing))
        .unwrap_or((DEFAULT_SPAN_DURATION, Easing::Linear));
    AnimationSpan {
        id: SpanId::new(),
        previous: seed.clone(),
        next: seed.clone(),
        duration,
        easing,
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectNode for AnimationSpan {
    fn type_name(&self) -> &'static str {
        "AnimationSpan"
    }

    fn identity(&self) -> Option<Identity> {
        Some(self.id.into())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ObjectNode for Animation {
    fn type_name(&self) -> &'static str {
        "Animation"
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
