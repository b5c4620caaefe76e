// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undoable scene commands.
//!
//! Every constructor validates against the scene it is given and fails with
//! a [`CommandError`] instead of producing a command that could leave the
//! scene half-edited. Once built, `apply`, `undo` and `redo` cannot fail; a
//! clip that disappeared in between is logged and skipped.

use crate::history::{CompositeCommand, RecordableCommand};
use crate::property_commands::PropertyPath;
use montage_graph::{reborn, RebornError};
use montage_timeline::{
    round_to_rate, AnimationError, Clip, ClipGroup, ClipId, GroupId, Placement, PlacementError,
    Scene, Time, TimeRange,
};

/// Error type for command construction
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The requested geometry breaks a placement rule
    #[error("Invalid placement: {0}")]
    Placement(#[from] PlacementError),

    /// The requested animation edit is invalid
    #[error("Invalid animation edit: {0}")]
    Animation(#[from] AnimationError),

    /// Copying a clip with fresh identities failed
    #[error("Failed to copy clip: {0}")]
    Reborn(#[from] RebornError),

    /// Clip not found
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    /// Group not found
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// Property not found
    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyPath),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Grows the scene to fit its content, remembering the old duration
#[derive(Debug, Clone, Copy, Default)]
struct DurationExtension {
    enabled: bool,
    previous: Option<Time>,
}

impl DurationExtension {
    fn apply(&mut self, scene: &mut Scene) {
        if !self.enabled {
            return;
        }
        let end = scene.content_end();
        if end > scene.duration() {
            self.previous = Some(scene.set_duration(end));
            tracing::debug!(duration = %end, "scene duration extended");
        }
    }

    fn undo(&mut self, scene: &mut Scene) {
        if let Some(previous) = self.previous.take() {
            scene.set_duration(previous);
        }
    }
}

fn existing_clip(scene: &Scene, id: ClipId) -> Result<&Clip, CommandError> {
    scene.clip(id).ok_or(CommandError::ClipNotFound(id))
}

/// Unchecked placement change used as a building block by the move commands
#[derive(Debug, Clone, Copy)]
struct SetPlacement {
    clip: ClipId,
    from: Placement,
    to: Placement,
}

impl SetPlacement {
    fn write(&self, scene: &mut Scene, placement: Placement) {
        match scene.clip_mut(self.clip) {
            Some(clip) => clip.apply_placement(placement),
            None => tracing::warn!(clip = %self.clip, "clip no longer in scene, placement skipped"),
        }
    }
}

impl RecordableCommand<Scene> for SetPlacement {
    fn description(&self) -> &str {
        "Set clip placement"
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.write(scene, self.to);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.write(scene, self.from);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        vec![self.from.range(), self.to.range()]
    }
}

/// Add a clip to the scene
#[derive(Debug, Clone)]
pub struct AddClip {
    id: ClipId,
    placement: Placement,
    /// The clip while it is not in the scene
    clip: Option<Clip>,
    extension: DurationExtension,
}

impl AddClip {
    /// Create the command after checking the clip's placement
    pub fn new(scene: &Scene, clip: Clip) -> Result<Self, CommandError> {
        if scene.clip(clip.id).is_some() {
            return Err(CommandError::InvalidOperation(format!(
                "Clip {} is already in the scene",
                clip.id
            )));
        }
        let placement = clip.placement();
        scene.validate_placement(clip.id, &placement)?;

        Ok(Self {
            id: clip.id,
            placement,
            clip: Some(clip),
            extension: DurationExtension::default(),
        })
    }

    /// Grow the scene duration when the clip ends past it
    pub fn with_auto_extend(mut self, enabled: bool) -> Self {
        self.extension.enabled = enabled;
        self
    }

    /// ID of the added clip
    pub fn clip_id(&self) -> ClipId {
        self.id
    }
}

impl RecordableCommand<Scene> for AddClip {
    fn description(&self) -> &str {
        "Add clip"
    }

    fn apply(&mut self, scene: &mut Scene) {
        if let Some(clip) = self.clip.take() {
            scene.insert_clip(scene.clip_count(), clip);
        }
        self.extension.apply(scene);
    }

    fn undo(&mut self, scene: &mut Scene) {
        match scene.take_clip(self.id) {
            Some((_, clip)) => self.clip = Some(clip),
            None => tracing::warn!(clip = %self.id, "added clip no longer in scene"),
        }
        self.extension.undo(scene);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        vec![self.placement.range()]
    }
}

/// Remove a clip; undo puts it back at its old position.
///
/// The clip also leaves its group. A group left with fewer than two members
/// is dissolved.
#[derive(Debug, Clone)]
pub struct RemoveClip {
    id: ClipId,
    range: TimeRange,
    removed: Option<(usize, Clip)>,
    previous_groups: Option<Vec<ClipGroup>>,
}

impl RemoveClip {
    /// Create the command for an existing clip
    pub fn new(scene: &Scene, id: ClipId) -> Result<Self, CommandError> {
        let clip = existing_clip(scene, id)?;
        Ok(Self {
            id,
            range: clip.range(),
            removed: None,
            previous_groups: None,
        })
    }
}

impl RecordableCommand<Scene> for RemoveClip {
    fn description(&self) -> &str {
        "Remove clip"
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.removed = scene.take_clip(self.id);
        if self.removed.is_none() {
            tracing::warn!(clip = %self.id, "clip already removed");
            return;
        }

        if scene.group_of(self.id).is_some() {
            let groups = scene
                .groups()
                .iter()
                .cloned()
                .filter_map(|mut group| {
                    group.members.retain(|member| *member != self.id);
                    (group.members.len() >= 2).then_some(group)
                })
                .collect();
            self.previous_groups = Some(scene.set_groups(groups));
        }
    }

    fn undo(&mut self, scene: &mut Scene) {
        if let Some((index, clip)) = self.removed.take() {
            scene.insert_clip(index, clip);
        }
        if let Some(groups) = self.previous_groups.take() {
            scene.set_groups(groups);
        }
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        vec![self.range]
    }
}

/// Commit a new start, length and layer for one clip
#[derive(Debug, Clone)]
pub struct MoveClip {
    change: SetPlacement,
    extension: DurationExtension,
}

impl MoveClip {
    /// Create the command, rejecting placements that break the layer rules
    pub fn new(scene: &Scene, id: ClipId, to: Placement) -> Result<Self, CommandError> {
        let clip = existing_clip(scene, id)?;
        scene.validate_placement(id, &to)?;
        Ok(Self {
            change: SetPlacement {
                clip: id,
                from: clip.placement(),
                to,
            },
            extension: DurationExtension::default(),
        })
    }

    /// Grow the scene duration when the clip ends past it
    pub fn with_auto_extend(mut self, enabled: bool) -> Self {
        self.extension.enabled = enabled;
        self
    }

    /// Moved clip
    pub fn clip_id(&self) -> ClipId {
        self.change.clip
    }
}

impl RecordableCommand<Scene> for MoveClip {
    fn description(&self) -> &str {
        if self.change.from.length == self.change.to.length {
            "Move clip"
        } else {
            "Resize clip"
        }
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.change.apply(scene);
        self.extension.apply(scene);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.change.undo(scene);
        self.extension.undo(scene);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.change.affected_ranges()
    }
}

/// Move several clips by the same time and layer delta as one edit
#[derive(Debug)]
pub struct MoveClips {
    changes: CompositeCommand<Scene>,
    extension: DurationExtension,
}

impl MoveClips {
    /// Create the command.
    ///
    /// The moved clips are ignored when checking for overlaps, since they
    /// keep their relative arrangement.
    pub fn new(scene: &Scene, ids: &[ClipId], delta: Time, layer_delta: i64) -> Result<Self, CommandError> {
        let mut unique: Vec<ClipId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        if unique.is_empty() {
            return Err(CommandError::InvalidOperation("No clips to move".to_string()));
        }

        let mut changes = CompositeCommand::new("Move clips");
        for &id in &unique {
            let clip = existing_clip(scene, id)?;
            let layer = u32::try_from(i64::from(clip.layer) + layer_delta).map_err(|_| {
                CommandError::InvalidOperation(format!("Clip {id} would leave the layer range"))
            })?;
            let to = Placement::new(clip.start + delta, clip.length, layer);
            scene.validate_placement_ignoring(&to, &unique)?;
            changes.push(SetPlacement {
                clip: id,
                from: clip.placement(),
                to,
            });
        }

        Ok(Self {
            changes,
            extension: DurationExtension::default(),
        })
    }

    /// Grow the scene duration when a clip ends past it
    pub fn with_auto_extend(mut self, enabled: bool) -> Self {
        self.extension.enabled = enabled;
        self
    }
}

impl RecordableCommand<Scene> for MoveClips {
    fn description(&self) -> &str {
        self.changes.description()
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.changes.apply(scene);
        self.extension.apply(scene);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.changes.undo(scene);
        self.extension.undo(scene);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.changes.affected_ranges()
    }
}

/// Layer a clip ends up on when layer `from` is moved to position `to`
fn reordered_layer(layer: u32, from: u32, to: u32) -> u32 {
    if layer == from {
        to
    } else if from < to && layer > from && layer <= to {
        layer - 1
    } else if from > to && layer >= to && layer < from {
        layer + 1
    } else {
        layer
    }
}

/// Move a whole layer to another position, shifting the layers in between
#[derive(Debug)]
pub struct MoveLayer {
    changes: CompositeCommand<Scene>,
}

impl MoveLayer {
    /// Create the command
    pub fn new(scene: &Scene, from: u32, to: u32) -> Result<Self, CommandError> {
        let max = scene.options.max_layer_count;
        for layer in [from, to] {
            if layer >= max {
                return Err(PlacementError::LayerOutOfRange { layer, max }.into());
            }
        }
        if from == to {
            return Err(CommandError::InvalidOperation(format!("Layer {from} is already in place")));
        }

        let mut changes = CompositeCommand::new("Move layer");
        for clip in scene.clips() {
            let layer = reordered_layer(clip.layer, from, to);
            if layer != clip.layer {
                let from = clip.placement();
                changes.push(SetPlacement {
                    clip: clip.id,
                    from,
                    to: Placement { layer, ..from },
                });
            }
        }
        Ok(Self { changes })
    }
}

impl RecordableCommand<Scene> for MoveLayer {
    fn description(&self) -> &str {
        self.changes.description()
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.changes.apply(scene);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.changes.undo(scene);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.changes.affected_ranges()
    }
}

/// Cut a clip in two at a frame boundary.
///
/// The back half is a copy with fresh identities whose in-point offset
/// continues where the front half stops.
#[derive(Debug, Clone)]
pub struct SplitClip {
    front: SetPlacement,
    back_id: ClipId,
    back: Option<Clip>,
    index: usize,
}

impl SplitClip {
    /// Create the command; `at` is rounded to the scene frame rate
    pub fn new(scene: &Scene, id: ClipId, at: Time) -> Result<Self, CommandError> {
        let clip = existing_clip(scene, id)?;
        let at = round_to_rate(at, scene.frame_rate);
        let frame = scene.frame();
        if at - clip.start < frame || clip.end() - at < frame {
            return Err(CommandError::InvalidOperation(format!(
                "Splitting clip {id} at {at} must leave at least one frame on each side"
            )));
        }

        let mut back = reborn(clip)?.value;
        back.start = at;
        back.length = clip.end() - at;
        back.offset = clip.offset + (at - clip.start);

        let from = clip.placement();
        let index = scene.clip_index(id).map_or(scene.clip_count(), |i| i + 1);
        Ok(Self {
            front: SetPlacement {
                clip: id,
                from,
                to: Placement::new(clip.start, at - clip.start, clip.layer),
            },
            back_id: back.id,
            back: Some(back),
            index,
        })
    }

    /// ID of the new clip holding the back half
    pub fn back_id(&self) -> ClipId {
        self.back_id
    }
}

impl RecordableCommand<Scene> for SplitClip {
    fn description(&self) -> &str {
        "Split clip"
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.front.apply(scene);
        if let Some(back) = self.back.take() {
            scene.insert_clip(self.index, back);
        }
    }

    fn undo(&mut self, scene: &mut Scene) {
        match scene.take_clip(self.back_id) {
            Some((_, back)) => self.back = Some(back),
            None => tracing::warn!(clip = %self.back_id, "split half no longer in scene"),
        }
        self.front.undo(scene);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        vec![self.front.from.range()]
    }
}

/// Add a copy of a clip with fresh identities
#[derive(Debug, Clone)]
pub struct DuplicateClip {
    source: ClipId,
    add: AddClip,
}

impl DuplicateClip {
    /// Create the command placing the copy at `placement`
    pub fn new(scene: &Scene, id: ClipId, placement: Placement) -> Result<Self, CommandError> {
        let mut copy = reborn(existing_clip(scene, id)?)?.value;
        copy.apply_placement(placement);
        Ok(Self {
            source: id,
            add: AddClip::new(scene, copy)?,
        })
    }

    /// Create the command placing the copy directly after the source
    pub fn after_source(scene: &Scene, id: ClipId) -> Result<Self, CommandError> {
        let clip = existing_clip(scene, id)?;
        let placement = Placement::new(clip.end(), clip.length, clip.layer);
        Self::new(scene, id, placement)
    }

    /// Grow the scene duration when the copy ends past it
    pub fn with_auto_extend(mut self, enabled: bool) -> Self {
        self.add = self.add.with_auto_extend(enabled);
        self
    }

    /// Clip that was copied
    pub fn source_id(&self) -> ClipId {
        self.source
    }

    /// ID of the copy
    pub fn copy_id(&self) -> ClipId {
        self.add.clip_id()
    }
}

impl RecordableCommand<Scene> for DuplicateClip {
    fn description(&self) -> &str {
        "Duplicate clip"
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.add.apply(scene);
    }

    fn undo(&mut self, scene: &mut Scene) {
        self.add.undo(scene);
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.add.affected_ranges()
    }
}

/// Group clips so they are selected together.
///
/// A clip belongs to at most one group; grouping takes it out of its old
/// group, and groups left with fewer than two members dissolve.
#[derive(Debug, Clone)]
pub struct GroupClips {
    group: ClipGroup,
    ranges: Vec<TimeRange>,
    previous: Option<Vec<ClipGroup>>,
}

impl GroupClips {
    /// Create the command
    pub fn new(scene: &Scene, ids: &[ClipId]) -> Result<Self, CommandError> {
        let mut members: Vec<ClipId> = Vec::with_capacity(ids.len());
        let mut ranges = Vec::with_capacity(ids.len());
        for &id in ids {
            let clip = existing_clip(scene, id)?;
            if !members.contains(&id) {
                members.push(id);
                ranges.push(clip.range());
            }
        }
        if members.len() < 2 {
            return Err(CommandError::InvalidOperation(
                "A group needs at least two clips".to_string(),
            ));
        }
        Ok(Self {
            group: ClipGroup::new(members),
            ranges,
            previous: None,
        })
    }

    /// ID of the new group
    pub fn group_id(&self) -> GroupId {
        self.group.id
    }
}

impl RecordableCommand<Scene> for GroupClips {
    fn description(&self) -> &str {
        "Group clips"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let mut groups: Vec<ClipGroup> = scene
            .groups()
            .iter()
            .cloned()
            .map(|mut group| {
                group.members.retain(|m| !self.group.members.contains(m));
                group
            })
            .filter(|group| group.members.len() >= 2)
            .collect();
        groups.push(self.group.clone());
        self.previous = Some(scene.set_groups(groups));
    }

    fn undo(&mut self, scene: &mut Scene) {
        if let Some(previous) = self.previous.take() {
            scene.set_groups(previous);
        }
    }

    fn affected_ranges(&self) -> Vec<TimeRange> {
        self.ranges.clone()
    }
}

/// Dissolve a group
#[derive(Debug, Clone)]
pub struct UngroupClips {
    group: GroupId,
    previous: Option<Vec<ClipGroup>>,
}

impl UngroupClips {
    /// Create the command for an existing group
    pub fn new(scene: &Scene, group: GroupId) -> Result<Self, CommandError> {
        if !scene.groups().iter().any(|g| g.id == group) {
            return Err(CommandError::GroupNotFound(group));
        }
        Ok(Self { group, previous: None })
    }
}

impl RecordableCommand<Scene> for UngroupClips {
    fn description(&self) -> &str {
        "Ungroup clips"
    }

    fn apply(&mut self, scene: &mut Scene) {
        let groups = scene.groups().iter().filter(|g| g.id != self.group).cloned().collect();
        self.previous = Some(scene.set_groups(groups));
    }

    fn undo(&mut self, scene: &mut Scene) {
        if let Some(previous) = self.previous.take() {
            scene.set_groups(previous);
        }
    }
}

/// Change the scene name
#[derive(Debug, Clone)]
pub struct RenameScene {
    name: String,
}

impl RenameScene {
    /// Create the command; the name must not be blank
    pub fn new(name: impl Into<String>) -> Result<Self, CommandError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CommandError::InvalidOperation("Scene name is empty".to_string()));
        }
        Ok(Self { name })
    }
}

impl RecordableCommand<Scene> for RenameScene {
    fn description(&self) -> &str {
        "Rename scene"
    }

    fn apply(&mut self, scene: &mut Scene) {
        std::mem::swap(&mut scene.name, &mut self.name);
    }

    fn undo(&mut self, scene: &mut Scene) {
        std::mem::swap(&mut scene.name, &mut self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::CommandRecorder;
    use montage_graph::collect_identities;
    use montage_timeline::Effect;

    fn secs(s: i64) -> Time {
        Time::from_secs(s)
    }

    /// Clips A `[0,4)` and B `[4,8)` on layer 0, C `[2,6)` on layer 1
    fn sample_scene() -> (Scene, ClipId, ClipId, ClipId) {
        let mut scene = Scene::new("Test").with_duration(secs(20));
        let a = scene
            .add_clip(
                Clip::new("A", secs(0), secs(4), 0)
                    .with_effect(Effect::new("Opacity").with_property("opacity", 1.0)),
            )
            .unwrap();
        let b = scene.add_clip(Clip::new("B", secs(4), secs(4), 0)).unwrap();
        let c = scene.add_clip(Clip::new("C", secs(2), secs(4), 1)).unwrap();
        (scene, a, b, c)
    }

    /// Runs do, undo and redo and checks both round trips
    fn assert_round_trip(scene: &mut Scene, command: impl RecordableCommand<Scene> + 'static) {
        let before = scene.clone();
        let before_order = scene.clip_ids();
        let mut recorder = CommandRecorder::new();

        recorder.do_and_record(Box::new(command), scene);
        let after = scene.clone();
        let after_order = scene.clip_ids();

        recorder.undo(scene);
        assert_eq!(*scene, before);
        assert_eq!(scene.clip_ids(), before_order);

        recorder.redo(scene);
        assert_eq!(*scene, after);
        assert_eq!(scene.clip_ids(), after_order);
    }

    #[test]
    fn test_add_clip_undo() {
        let (mut scene, a, b, c) = sample_scene();
        let mut recorder = CommandRecorder::new();

        let clip = Clip::new("New", secs(10), secs(20), 1);
        let command = AddClip::new(&scene, clip).unwrap();
        let added = command.clip_id();
        recorder.do_and_record(Box::new(command), &mut scene);
        assert_eq!(scene.clip_count(), 4);
        assert!(scene.clip(added).is_some());

        recorder.undo(&mut scene);
        assert_eq!(scene.clip_ids(), vec![a, b, c]);
        assert!(scene.clip(added).is_none());
    }

    #[test]
    fn test_add_clip_rejects_overlap() {
        let (scene, a, b, _) = sample_scene();
        let result = AddClip::new(&scene, Clip::new("X", secs(3), secs(2), 0));
        assert!(matches!(
            result,
            Err(CommandError::Placement(PlacementError::Overlap { other })) if other == a
        ));

        let existing = scene.clip(b).unwrap().clone();
        assert!(matches!(AddClip::new(&scene, existing), Err(CommandError::InvalidOperation(_))));
    }

    #[test]
    fn test_remove_clip_restores_position() {
        let (mut scene, a, b, c) = sample_scene();
        scene.set_groups(vec![ClipGroup::new([a, b])]);
        let command = RemoveClip::new(&scene, b).unwrap();
        assert_round_trip(&mut scene, command);

        // Redone: b is gone and its two-clip group is dissolved
        assert_eq!(scene.clip_ids(), vec![a, c]);
        assert!(scene.groups().is_empty());
        assert!(scene.group_of(a).is_none());
        assert!(matches!(RemoveClip::new(&scene, b), Err(CommandError::ClipNotFound(id)) if id == b));
    }

    #[test]
    fn test_remove_clip_leaves_group() {
        let (mut scene, a, b, c) = sample_scene();
        let group = ClipGroup::new([a, b, c]);
        let group_id = group.id;
        scene.set_groups(vec![group]);

        let mut command = RemoveClip::new(&scene, b).unwrap();
        command.apply(&mut scene);
        assert_eq!(scene.groups()[0].members, vec![a, c]);
        assert!(scene.group_of(b).is_none());

        command.undo(&mut scene);
        assert_eq!(scene.groups()[0].id, group_id);
        assert_eq!(scene.groups()[0].members, vec![a, b, c]);
    }

    #[test]
    fn test_move_clip() {
        let (mut scene, _, b, _) = sample_scene();
        let to = Placement::new(secs(9), secs(3), 2);
        let command = MoveClip::new(&scene, b, to).unwrap();
        assert_eq!(command.description(), "Resize clip");
        assert_eq!(command.affected_ranges().len(), 2);
        assert_round_trip(&mut scene, command);
        assert_eq!(scene.clip(b).unwrap().placement(), to);
    }

    #[test]
    fn test_move_clip_rejects_overlap() {
        let (scene, a, b, _) = sample_scene();
        let before = scene.clone();
        let result = MoveClip::new(&scene, b, Placement::new(secs(3), secs(4), 0));
        assert!(matches!(
            result,
            Err(CommandError::Placement(PlacementError::Overlap { other })) if other == a
        ));
        assert_eq!(scene, before);
    }

    #[test]
    fn test_move_clips_together() {
        let (mut scene, a, b, c) = sample_scene();

        // A and B shift as one unit, so A may take B's old spot
        let command = MoveClips::new(&scene, &[a, b, a], secs(2), 0).unwrap();
        assert_round_trip(&mut scene, command);
        assert_eq!(scene.clip(a).unwrap().start, secs(2));
        assert_eq!(scene.clip(b).unwrap().start, secs(6));

        // Moving A alone onto layer 1 hits C
        let result = MoveClips::new(&scene, &[a], Time::ZERO, 1);
        assert!(matches!(
            result,
            Err(CommandError::Placement(PlacementError::Overlap { other })) if other == c
        ));
        assert!(matches!(MoveClips::new(&scene, &[a], Time::ZERO, -1), Err(CommandError::InvalidOperation(_))));
        assert!(matches!(MoveClips::new(&scene, &[], secs(1), 0), Err(CommandError::InvalidOperation(_))));
    }

    #[test]
    fn test_move_layer() {
        let (mut scene, a, b, c) = sample_scene();
        let d = scene.add_clip(Clip::new("D", secs(0), secs(1), 2)).unwrap();

        let mut recorder = CommandRecorder::new();
        let command = MoveLayer::new(&scene, 0, 2).unwrap();
        recorder.do_and_record(Box::new(command), &mut scene);
        assert_eq!(recorder.stats().undo_count, 1);

        let layer = |scene: &Scene, id| scene.clip(id).unwrap().layer;
        assert_eq!((layer(&scene, a), layer(&scene, b)), (2, 2));
        assert_eq!(layer(&scene, c), 0);
        assert_eq!(layer(&scene, d), 1);
        assert!(scene.validate().is_ok());

        recorder.undo(&mut scene);
        assert_eq!((layer(&scene, a), layer(&scene, c), layer(&scene, d)), (0, 1, 2));
    }

    #[test]
    fn test_move_layer_bounds() {
        let (scene, ..) = sample_scene();
        let max = scene.options.max_layer_count;
        assert!(matches!(
            MoveLayer::new(&scene, 0, max),
            Err(CommandError::Placement(PlacementError::LayerOutOfRange { .. }))
        ));
        assert!(matches!(MoveLayer::new(&scene, 1, 1), Err(CommandError::InvalidOperation(_))));
        assert_eq!(reordered_layer(5, 3, 1), 5);
        assert_eq!(reordered_layer(1, 3, 1), 2);
    }

    #[test]
    fn test_split_clip() {
        let (mut scene, a, b, _) = sample_scene();
        let command = SplitClip::new(&scene, a, secs(1)).unwrap();
        let back = command.back_id();
        assert_round_trip(&mut scene, command);

        let front = scene.clip(a).unwrap();
        assert_eq!((front.start, front.length), (secs(0), secs(1)));
        let back_clip = scene.clip(back).unwrap();
        assert_eq!((back_clip.start, back_clip.length, back_clip.offset), (secs(1), secs(3), secs(1)));
        assert_eq!(scene.clip_index(back), Some(1));
        assert_eq!(scene.clip_index(b), Some(2));

        // The back half shares no identities with the front half
        let front_ids = collect_identities(scene.clip(a).unwrap());
        let back_ids = collect_identities(scene.clip(back).unwrap());
        assert_eq!(front_ids.len(), back_ids.len());
        assert!(front_ids.iter().all(|id| !back_ids.contains(id)));
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_split_needs_a_frame_each_side() {
        let (scene, a, ..) = sample_scene();
        let frame = scene.frame();
        assert!(matches!(SplitClip::new(&scene, a, Time::ZERO), Err(CommandError::InvalidOperation(_))));
        assert!(matches!(SplitClip::new(&scene, a, secs(4)), Err(CommandError::InvalidOperation(_))));
        assert!(SplitClip::new(&scene, a, frame).is_ok());
        assert!(SplitClip::new(&scene, a, secs(4) - frame).is_ok());
    }

    #[test]
    fn test_duplicate_clip() {
        let (mut scene, a, b, _) = sample_scene();
        assert!(matches!(
            DuplicateClip::after_source(&scene, a),
            Err(CommandError::Placement(PlacementError::Overlap { other })) if other == b
        ));

        let command = DuplicateClip::new(&scene, a, Placement::new(secs(10), secs(4), 0)).unwrap();
        let copy = command.copy_id();
        assert_eq!(command.source_id(), a);
        assert_round_trip(&mut scene, command);

        let original = scene.clip(a).unwrap();
        let duplicate = scene.clip(copy).unwrap();
        assert_ne!(original.effects[0].id, duplicate.effects[0].id);
        assert_eq!(original.effects[0].properties.len(), duplicate.effects[0].properties.len());
        assert_eq!(duplicate.start, secs(10));
    }

    #[test]
    fn test_group_and_ungroup() {
        let (mut scene, a, b, c) = sample_scene();
        scene.set_groups(vec![ClipGroup::new([a, b])]);

        let command = GroupClips::new(&scene, &[b, c]).unwrap();
        let group = command.group_id();
        assert_round_trip(&mut scene, command);
        // A was left alone in its old group, which dissolved
        assert_eq!(scene.groups().len(), 1);
        assert_eq!(scene.group_of(b).map(|g| g.id), Some(group));
        assert!(scene.group_of(a).is_none());

        let command = UngroupClips::new(&scene, group).unwrap();
        assert_round_trip(&mut scene, command);
        assert!(scene.groups().is_empty());

        assert!(matches!(GroupClips::new(&scene, &[a, a]), Err(CommandError::InvalidOperation(_))));
        assert!(matches!(UngroupClips::new(&scene, group), Err(CommandError::GroupNotFound(_))));
    }

    #[test]
    fn test_rename_scene() {
        let (mut scene, ..) = sample_scene();
        assert_round_trip(&mut scene, RenameScene::new("Intro").unwrap());
        assert_eq!(scene.name, "Intro");
        assert!(matches!(RenameScene::new("  "), Err(CommandError::InvalidOperation(_))));
    }

    #[test]
    fn test_auto_extend_duration() {
        let (mut scene, ..) = sample_scene();
        let mut recorder = CommandRecorder::new();

        let command = AddClip::new(&scene, Clip::new("Late", secs(18), secs(7), 3))
            .unwrap()
            .with_auto_extend(true);
        recorder.do_and_record(Box::new(command), &mut scene);
        assert_eq!(scene.duration(), secs(25));

        recorder.undo(&mut scene);
        assert_eq!(scene.duration(), secs(20));

        let command = AddClip::new(&scene, Clip::new("Late", secs(18), secs(7), 3)).unwrap();
        recorder.do_and_record(Box::new(command), &mut scene);
        assert_eq!(scene.duration(), secs(20));
    }

    #[test]
    fn test_commits_never_overlap() {
        let (mut scene, a, b, c) = sample_scene();
        let mut recorder = CommandRecorder::new();
        let attempts = [
            (a, Placement::new(secs(1), secs(4), 0)),
            (b, Placement::new(secs(0), secs(2), 1)),
            (c, Placement::new(secs(4), secs(4), 0)),
            (c, Placement::new(secs(8), secs(4), 0)),
            (a, Placement::new(secs(10), secs(4), 0)),
            (b, Placement::new(secs(11), secs(1), 0)),
            (b, Placement::new(secs(3), secs(5), 1)),
        ];

        let mut committed = 0;
        for (id, placement) in attempts {
            if let Ok(command) = MoveClip::new(&scene, id, placement) {
                recorder.do_and_record(Box::new(command), &mut scene);
                committed += 1;
            }
            assert!(scene.validate().is_ok());
        }
        assert!(committed > 0 && committed < attempts.len());
    }
}
