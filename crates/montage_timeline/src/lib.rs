// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline model for the Montage editor.
//!
//! This crate provides the editable scene model:
//! - Tick-based time and pixel/time conversion
//! - Easing curves and cubic Bézier evaluation
//! - Span-based property animation
//! - Clips on layers with a no-overlap invariant
//! - Pointer-drag editing with neighbour snapping
//!
//! ## Architecture
//!
//! Every persisted type implements [`montage_graph::ObjectNode`] so scenes
//! and clips can be searched and cloned with fresh identities. Nothing here
//! records history; mutations that must be undoable are wrapped by the
//! editor's command layer.

pub mod time;
pub mod easing;
pub mod curve;
pub mod value;
pub mod animation;
pub mod property;
pub mod effect;
pub mod clip;
pub mod scene;
pub mod edit;

pub use time::{
    floor_to_rate, round_to_rate, to_pixels, to_time, Time, TimeRange, TimelineOptions,
    LAYER_HEIGHT, MIN_SCALE, SECOND_WIDTH,
};
pub use easing::{Easing, EasingFunction, SplineEasing};
pub use curve::BezierCurveCubic;
pub use value::{AnimatedValue, DiscreteInterpolator, Interpolator, LinearInterpolator, ValueKind};
pub use animation::{Animation, AnimationError, AnimationId, AnimationSpan, SpanId, DEFAULT_SPAN_DURATION};
pub use property::{Property, PropertyAccess, PropertyId};
pub use effect::{Effect, EffectId};
pub use clip::{Clip, ClipId, Placement};
pub use scene::{ClipGroup, GroupId, PlacementError, Scene, SceneId, DEFAULT_FRAME_RATE};
pub use edit::{
    DragOperation, HitZone, Modifiers, PlacementProposal, PointerEvent, TimelineEditController,
    DEFAULT_EDGE_HIT_WIDTH, DEFAULT_SNAP_THRESHOLD,
};
