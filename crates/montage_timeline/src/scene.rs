// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene: the ordered clip collection and its placement invariant.

use crate::clip::{Clip, ClipId, Placement};
use crate::time::{Time, TimeRange, TimelineOptions};
use indexmap::IndexMap;
use montage_graph::{declared_children, Accessor, Identity, ObjectNode};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

montage_graph::identity_type!(
    /// Unique identifier for a scene
    SceneId
);
montage_graph::identity_type!(
    /// Unique identifier for a clip group
    GroupId
);

/// Default frame rate of new scenes
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Why a clip placement was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Length is zero or negative
    #[error("Clip length must be positive, got {0}")]
    NonPositiveLength(Time),
    /// Start lies before zero
    #[error("Clip start must not be negative, got {0}")]
    NegativeStart(Time),
    /// Layer index beyond the scene's layer count
    #[error("Layer {layer} is out of range (max {max})")]
    LayerOutOfRange {
        /// Requested layer
        layer: u32,
        /// Number of layers in the scene
        max: u32,
    },
    /// The range intersects another clip on the same layer
    #[error("Clip would overlap clip {other}")]
    Overlap {
        /// The clip in the way
        other: ClipId,
    },
    /// No clip with this ID is in the scene
    #[error("Clip not found: {0}")]
    UnknownClip(ClipId),
}

/// A set of clips that are selected and moved together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipGroup {
    /// Unique group ID
    pub id: GroupId,
    /// Member clips
    pub members: Vec<ClipId>,
}

impl ClipGroup {
    /// Create a group
    pub fn new(members: impl IntoIterator<Item = ClipId>) -> Self {
        Self {
            id: GroupId::new(),
            members: members.into_iter().collect(),
        }
    }
}

/// A timeline of clips on layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique scene ID
    pub id: SceneId,
    /// Scene name
    pub name: String,
    /// Frames per second
    pub frame_rate: u32,
    /// Scene duration
    duration: Time,
    /// Timeline view state
    #[serde(default)]
    pub options: TimelineOptions,
    /// Clips in insertion order
    clips: IndexMap<ClipId, Clip>,
    /// Clip groups
    #[serde(default)]
    groups: Vec<ClipGroup>,
}

impl Scene {
    const ACCESSORS: &'static [Accessor<Scene>] = &[
        Accessor::collection("clips", |s| s.clips.values().map(|c| c as &dyn ObjectNode).collect()),
        Accessor::collection("groups", |s| s.groups.iter().map(|g| g as &dyn ObjectNode).collect()),
    ];

    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SceneId::new(),
            name: name.into(),
            frame_rate: DEFAULT_FRAME_RATE,
            duration: Time::from_secs(60),
            options: TimelineOptions::default(),
            clips: IndexMap::new(),
            groups: Vec::new(),
        }
    }

    /// Set the frame rate
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate.max(1);
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Time) -> Self {
        self.duration = duration;
        self
    }

    /// Scene duration
    pub fn duration(&self) -> Time {
        self.duration
    }

    /// Length of one frame
    pub fn frame(&self) -> Time {
        Time::from_frames(1, self.frame_rate)
    }

    /// Get a clip
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(&id)
    }

    /// All clips in order
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.clips.values()
    }

    /// Clip IDs in order
    pub fn clip_ids(&self) -> Vec<ClipId> {
        self.clips.keys().copied().collect()
    }

    /// Number of clips
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Position of a clip in the collection
    pub fn clip_index(&self, id: ClipId) -> Option<usize> {
        self.clips.get_index_of(&id)
    }

    /// Clips on a layer, sorted by start
    pub fn clips_on_layer(&self, layer: u32) -> Vec<&Clip> {
        let mut clips: Vec<_> = self.clips.values().filter(|c| c.layer == layer).collect();
        clips.sort_by_key(|c| c.start);
        clips
    }

    /// Clips on `layer` that cover `time`
    pub fn clips_at(&self, layer: u32, time: Time) -> Vec<&Clip> {
        self.clips
            .values()
            .filter(|c| c.layer == layer && c.range().contains(time))
            .collect()
    }

    /// Nearest clip ending at or before `id` starts, on the same layer
    pub fn clip_before(&self, id: ClipId) -> Option<&Clip> {
        let clip = self.clip(id)?;
        self.clips
            .values()
            .filter(|c| c.id != id && c.layer == clip.layer && c.end() <= clip.start)
            .max_by_key(|c| c.end())
    }

    /// Nearest clip starting at or after `id` ends, on the same layer
    pub fn clip_after(&self, id: ClipId) -> Option<&Clip> {
        let clip = self.clip(id)?;
        self.clips
            .values()
            .filter(|c| c.id != id && c.layer == clip.layer && c.start >= clip.end())
            .min_by_key(|c| c.start)
    }

    /// Both neighbours of a clip on its layer
    pub fn neighbours(&self, id: ClipId) -> (Option<&Clip>, Option<&Clip>) {
        (self.clip_before(id), self.clip_after(id))
    }

    /// First clip on `layer` intersecting `range`, skipping `ignore`
    pub fn is_overlapping(&self, range: TimeRange, layer: u32, ignore: &[ClipId]) -> Option<ClipId> {
        self.clips
            .values()
            .find(|c| c.layer == layer && !ignore.contains(&c.id) && c.range().intersects(&range))
            .map(|c| c.id)
    }

    /// Check that clip `id` may be placed at `placement`.
    ///
    /// `id` itself is ignored when looking for overlaps, so the same check
    /// serves moves of existing clips and additions of new ones.
    pub fn validate_placement(&self, id: ClipId, placement: &Placement) -> Result<(), PlacementError> {
        self.validate_placement_ignoring(placement, &[id])
    }

    /// Check a placement against the scene, skipping the clips in `ignore`
    pub fn validate_placement_ignoring(&self, placement: &Placement, ignore: &[ClipId]) -> Result<(), PlacementError> {
        placement.validate()?;
        if placement.layer >= self.options.max_layer_count {
            return Err(PlacementError::LayerOutOfRange {
                layer: placement.layer,
                max: self.options.max_layer_count,
            });
        }
        match self.is_overlapping(placement.range(), placement.layer, ignore) {
            Some(other) => Err(PlacementError::Overlap { other }),
            None => Ok(()),
        }
    }

    /// Check every clip, e.g. after loading a document
    pub fn validate(&self) -> Result<(), PlacementError> {
        for clip in self.clips.values() {
            self.validate_placement(clip.id, &clip.placement())?;
        }
        Ok(())
    }

    /// Highest layer with a clip
    pub fn max_layer_in_use(&self) -> Option<u32> {
        self.clips.values().map(|c| c.layer).max()
    }

    /// End of the last clip
    pub fn content_end(&self) -> Time {
        self.clips.values().map(Clip::end).max().unwrap_or(Time::ZERO)
    }

    /// Clip groups
    pub fn groups(&self) -> &[ClipGroup] {
        &self.groups
    }

    /// The group containing a clip
    pub fn group_of(&self, id: ClipId) -> Option<&ClipGroup> {
        self.groups.iter().find(|g| g.members.contains(&id))
    }

    /// Insert a clip at `index` in the collection (clamped to the end).
    ///
    /// Does not validate; callers check the placement first.
    pub fn insert_clip(&mut self, index: usize, clip: Clip) {
        let index = index.min(self.clips.len());
        self.clips.shift_insert(index, clip.id, clip);
    }

    /// Append a clip after validating its placement
    pub fn add_clip(&mut self, clip: Clip) -> Result<ClipId, PlacementError> {
        self.validate_placement(clip.id, &clip.placement())?;
        let id = clip.id;
        self.clips.insert(id, clip);
        Ok(id)
    }

    /// Remove a clip, returning its former index
    pub fn take_clip(&mut self, id: ClipId) -> Option<(usize, Clip)> {
        self.clips.shift_remove_full(&id).map(|(index, _, clip)| (index, clip))
    }

    /// Get a mutable clip.
    ///
    /// Placement fields must only change through a validated edit.
    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.get_mut(&id)
    }

    /// Replace the duration, returning the old one
    pub fn set_duration(&mut self, duration: Time) -> Time {
        std::mem::replace(&mut self.duration, duration)
    }

    /// Replace all groups, returning the old ones
    pub fn set_groups(&mut self, groups: Vec<ClipGroup>) -> Vec<ClipGroup> {
        std::mem::replace(&mut self.groups, groups)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled Scene")
    }
}

impl ObjectNode for ClipGroup {
    fn type_name(&self) -> &'static str {
        "ClipGroup"
    }

    fn identity(&self) -> Option<Identity> {
        Some(self.id.into())
    }

    fn references(&self) -> Vec<Identity> {
        self.members.iter().map(|id| Identity::from(*id)).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ObjectNode for Scene {
    fn type_name(&self) -> &'static str {
        "Scene"
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
