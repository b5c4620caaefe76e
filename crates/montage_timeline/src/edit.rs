// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer-drag editing of clip placement.
//!
//! The controller turns pointer events into a transient preview placement
//! and, on release, a [`PlacementProposal`]. It never mutates the scene;
//! committing a proposal is the caller's job.

use crate::clip::{Clip, ClipId, Placement};
use crate::scene::Scene;
use crate::time::{round_to_rate, Time, LAYER_HEIGHT};
use glam::DVec2;

/// Default snap distance in pixels
pub const DEFAULT_SNAP_THRESHOLD: f64 = 10.0;
/// Default width of the resize handles at either end of a clip, in pixels
pub const DEFAULT_EDGE_HIT_WIDTH: f64 = 10.0;

/// Modifier keys relevant to timeline editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Suppress snapping to neighbouring clips
    pub disable_snap: bool,
}

/// A pointer event in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    /// Pointer position relative to the timeline's top-left corner
    pub position: DVec2,
    /// Held modifiers
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Event at a position without modifiers
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    /// Same event with snapping disabled
    pub fn without_snap(mut self) -> Self {
        self.modifiers.disable_snap = true;
        self
    }
}

/// Part of a clip under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    /// Middle of the clip; drags move it
    Body,
    /// Left resize handle
    LeftEdge,
    /// Right resize handle
    RightEdge,
}

/// Drag operation state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragOperation {
    /// Not dragging
    #[default]
    Idle,
    /// Moving a clip in time and across layers
    Body {
        /// Dragged clip
        clip: ClipId,
        /// Pointer time minus clip start at pointer-down
        grab_offset: Time,
        /// Placement at pointer-down
        original: Placement,
        /// Current preview
        preview: Placement,
    },
    /// Moving the start while the end stays fixed
    LeftEdge {
        /// Dragged clip
        clip: ClipId,
        /// Pointer time minus clip start at pointer-down
        grab_offset: Time,
        /// Placement at pointer-down
        original: Placement,
        /// Current preview
        preview: Placement,
    },
    /// Moving the end while the start stays fixed
    RightEdge {
        /// Dragged clip
        clip: ClipId,
        /// Pointer time minus clip end at pointer-down
        grab_offset: Time,
        /// Placement at pointer-down
        original: Placement,
        /// Current preview
        preview: Placement,
    },
}

impl DragOperation {
    /// Dragged clip, original placement and preview
    fn parts(&self) -> Option<(ClipId, Placement, Placement)> {
        match *self {
            Self::Idle => None,
            Self::Body { clip, original, preview, .. }
            | Self::LeftEdge { clip, original, preview, .. }
            | Self::RightEdge { clip, original, preview, .. } => Some((clip, original, preview)),
        }
    }

    fn set_preview(&mut self, placement: Placement) {
        match self {
            Self::Idle => {}
            Self::Body { preview, .. } | Self::LeftEdge { preview, .. } | Self::RightEdge { preview, .. } => {
                *preview = placement;
            }
        }
    }
}

/// Final geometry of a finished drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementProposal {
    /// Dragged clip
    pub clip: ClipId,
    /// Placement before the drag
    pub original: Placement,
    /// Placement after the drag, rounded to the frame rate
    pub proposed: Placement,
}

impl PlacementProposal {
    /// Whether the drag changed anything
    pub fn is_change(&self) -> bool {
        self.original != self.proposed
    }
}

/// Interprets pointer gestures on the timeline
#[derive(Debug, Clone)]
pub struct TimelineEditController {
    /// Snap distance in pixels
    pub snap_threshold: f64,
    /// Resize handle width in pixels
    pub edge_hit_width: f64,
    operation: DragOperation,
}

impl Default for TimelineEditController {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineEditController {
    /// Create an idle controller with default thresholds
    pub fn new() -> Self {
        Self {
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            edge_hit_width: DEFAULT_EDGE_HIT_WIDTH,
            operation: DragOperation::Idle,
        }
    }

    /// Set the snap distance
    pub fn with_snap_threshold(mut self, pixels: f64) -> Self {
        self.snap_threshold = pixels;
        self
    }

    /// Current drag state
    pub fn operation(&self) -> &DragOperation {
        &self.operation
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.operation != DragOperation::Idle
    }

    /// Clip and placement to draw for the drag in progress
    pub fn preview(&self) -> Option<(ClipId, Placement)> {
        self.operation.parts().map(|(clip, _, preview)| (clip, preview))
    }

    /// Which part of `clip` is under a content-space position
    pub fn hit_test(&self, scene: &Scene, clip: &Clip, content: DVec2) -> Option<HitZone> {
        let options = &scene.options;
        let top = options.layer_to_pixel(clip.layer);
        if content.y < top || content.y >= top + LAYER_HEIGHT {
            return None;
        }

        let left = options.time_to_pixel(clip.start);
        let right = options.time_to_pixel(clip.end());
        if content.x < left || content.x >= right {
            return None;
        }

        if content.x - left < self.edge_hit_width {
            Some(HitZone::LeftEdge)
        } else if right - content.x <= self.edge_hit_width {
            Some(HitZone::RightEdge)
        } else {
            Some(HitZone::Body)
        }
    }

    /// Clip and zone under a screen position
    pub fn clip_at(&self, scene: &Scene, position: DVec2) -> Option<(ClipId, HitZone)> {
        let content = scene.options.screen_to_content(position);
        let layer = scene.options.pixel_to_layer(content.y);
        scene
            .clips()
            .filter(|c| c.layer == layer)
            .find_map(|c| self.hit_test(scene, c, content).map(|zone| (c.id, zone)))
    }

    /// Start a drag if the pointer is over a clip.
    ///
    /// Ignored while another drag is active.
    pub fn pointer_down(&mut self, scene: &Scene, event: &PointerEvent) -> Option<HitZone> {
        if self.is_dragging() {
            return None;
        }

        let (id, zone) = self.clip_at(scene, event.position)?;
        let clip = scene.clip(id)?;
        let pointer_time = self.pointer_time(scene, event);
        let original = clip.placement();

        self.operation = match zone {
            HitZone::Body => DragOperation::Body {
                clip: id,
                grab_offset: pointer_time - clip.start,
                original,
                preview: original,
            },
            HitZone::LeftEdge => DragOperation::LeftEdge {
                clip: id,
                grab_offset: pointer_time - clip.start,
                original,
                preview: original,
            },
            HitZone::RightEdge => DragOperation::RightEdge {
                clip: id,
                grab_offset: pointer_time - clip.end(),
                original,
                preview: original,
            },
        };
        tracing::trace!(clip = %id, ?zone, "drag started");
        Some(zone)
    }

    /// Update the preview. The scene is not touched.
    pub fn pointer_move(&mut self, scene: &Scene, event: &PointerEvent) -> Option<Placement> {
        let placement = self.compute(scene, event)?;
        self.operation.set_preview(placement);
        Some(placement)
    }

    /// Finish the drag and return the frame-rounded result
    pub fn pointer_up(&mut self, scene: &Scene, event: &PointerEvent) -> Option<PlacementProposal> {
        let placement = self.compute(scene, event);
        let operation = std::mem::take(&mut self.operation);
        let (clip, original, _) = operation.parts()?;
        let placement = placement?;

        // Only the edge under the pointer is rounded; the other stays put.
        let rate = scene.frame_rate;
        let min_length = scene.frame().min(original.length);
        let proposed = match operation {
            DragOperation::LeftEdge { .. } => {
                let end = original.end();
                let start = round_to_rate(placement.start, rate)
                    .min(end - min_length)
                    .max(Time::ZERO);
                Placement::new(start, end - start, original.layer)
            }
            DragOperation::RightEdge { .. } => {
                let end = round_to_rate(placement.end(), rate).max(original.start + min_length);
                Placement::new(original.start, end - original.start, original.layer)
            }
            _ => {
                let start = round_to_rate(placement.start, rate).max(Time::ZERO);
                Placement::new(start, original.length, placement.layer)
            }
        };

        tracing::trace!(clip = %clip, ?proposed, "drag finished");
        Some(PlacementProposal { clip, original, proposed })
    }

    /// Abandon the drag without a proposal
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            tracing::trace!("drag cancelled");
        }
        self.operation = DragOperation::Idle;
    }

    fn pointer_time(&self, scene: &Scene, event: &PointerEvent) -> Time {
        let content = scene.options.screen_to_content(event.position);
        scene.options.pixel_to_time(content.x)
    }

    fn compute(&self, scene: &Scene, event: &PointerEvent) -> Option<Placement> {
        let pointer_time = self.pointer_time(scene, event);
        let snap = !event.modifiers.disable_snap;

        match self.operation {
            DragOperation::Idle => None,
            DragOperation::Body { clip, grab_offset, original, .. } => {
                let content = scene.options.screen_to_content(event.position);
                let mut start = (pointer_time - grab_offset).max(Time::ZERO);
                if snap {
                    start = self.snap(scene, clip, start);
                }
                let layer = scene.options.pixel_to_layer(content.y);
                Some(Placement::new(start.max(Time::ZERO), original.length, layer))
            }
            DragOperation::LeftEdge { clip, grab_offset, original, .. } => {
                let end = original.end();
                let mut start = pointer_time - grab_offset;
                if snap {
                    start = self.snap(scene, clip, start);
                }

                let floor = scene.clip_before(clip).map_or(Time::ZERO, Clip::end);
                let min_length = scene.frame().min(original.length);
                let start = start.max(floor).min(end - min_length).max(Time::ZERO);
                Some(Placement::new(start, end - start, original.layer))
            }
            DragOperation::RightEdge { clip, grab_offset, original, .. } => {
                let mut end = pointer_time - grab_offset;
                if snap {
                    end = self.snap(scene, clip, end);
                }

                let min_length = scene.frame().min(original.length);
                let mut end = end.max(original.start + min_length);
                if let Some(next) = scene.clip_after(clip) {
                    end = end.min(next.start);
                }
                Some(Placement::new(original.start, end - original.start, original.layer))
            }
        }
    }

    /// Snap `time` to the first other clip edge within the threshold.
    ///
    /// Clips are checked in scene order; for each, its end is tried before
    /// its start.
    fn snap(&self, scene: &Scene, dragged: ClipId, time: Time) -> Time {
        let threshold = scene.options.pixel_to_time(self.snap_threshold);
        for other in scene.clips().filter(|c| c.id != dragged) {
            for edge in [other.end(), other.start] {
                if (time - edge).abs() <= threshold {
                    return edge;
                }
            }
        }
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::to_pixels;

    fn frames(n: i64) -> Time {
        Time::from_frames(n, 30)
    }

    fn x(time: Time) -> f64 {
        to_pixels(time, 1.0)
    }

    /// Two touching clips on layer 0: [0, 150) and [150, 300) frames at 30 fps
    fn scene() -> (Scene, ClipId, ClipId) {
        let mut scene = Scene::new("Edit");
        let a = scene.add_clip(Clip::new("A", frames(0), frames(150), 0)).unwrap();
        let b = scene.add_clip(Clip::new("B", frames(150), frames(150), 0)).unwrap();
        (scene, a, b)
    }

    fn controller() -> TimelineEditController {
        // 30 px at scale 1 is 6 frames at 30 fps
        TimelineEditController::new().with_snap_threshold(30.0)
    }

    #[test]
    fn test_hit_zones() {
        let (scene, a, _) = scene();
        let ctl = controller();
        assert_eq!(ctl.clip_at(&scene, DVec2::new(2.0, 10.0)), Some((a, HitZone::LeftEdge)));
        assert_eq!(ctl.clip_at(&scene, DVec2::new(300.0, 10.0)), Some((a, HitZone::Body)));
        assert_eq!(ctl.clip_at(&scene, DVec2::new(745.0, 10.0)), Some((a, HitZone::RightEdge)));
        assert_eq!(ctl.clip_at(&scene, DVec2::new(300.0, 30.0)), None);
    }

    #[test]
    fn test_body_drag_snaps_to_neighbour_end() {
        let (scene, _, b) = scene();
        let mut ctl = controller();

        let down = PointerEvent::at(x(frames(210)), 12.5);
        assert_eq!(ctl.pointer_down(&scene, &down), Some(HitZone::Body));

        // Five frames to the left
        let up = PointerEvent::at(x(frames(205)), 12.5);
        let proposal = ctl.pointer_up(&scene, &up).unwrap();
        assert_eq!(proposal.clip, b);
        assert_eq!(proposal.proposed.start, frames(150));
        assert!(!proposal.is_change());
        assert!(scene.validate_placement(b, &proposal.proposed).is_ok());
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_body_drag_without_snap_overlaps() {
        let (scene, _, b) = scene();
        let mut ctl = controller();

        ctl.pointer_down(&scene, &PointerEvent::at(x(frames(210)), 12.5));
        let up = PointerEvent::at(x(frames(205)), 12.5).without_snap();
        let proposal = ctl.pointer_up(&scene, &up).unwrap();
        assert_eq!(proposal.proposed.start, frames(145));
        assert!(matches!(
            scene.validate_placement(b, &proposal.proposed),
            Err(crate::scene::PlacementError::Overlap { .. })
        ));
    }

    #[test]
    fn test_body_drag_changes_layer_and_clamps() {
        let (scene, _, b) = scene();
        let mut ctl = controller();

        ctl.pointer_down(&scene, &PointerEvent::at(x(frames(210)), 12.5));
        let preview = ctl
            .pointer_move(&scene, &PointerEvent::at(x(frames(10)), 60.0).without_snap())
            .unwrap();
        assert_eq!(preview.start, Time::ZERO);
        assert_eq!(preview.layer, 2);
        assert_eq!(ctl.preview(), Some((b, preview)));

        // The scene is untouched by previews
        assert_eq!(scene.clip(b).unwrap().start, frames(150));
    }

    #[test]
    fn test_left_edge_limited_by_previous_clip() {
        let (scene, _, b) = scene();
        let mut ctl = controller();

        let down = PointerEvent::at(x(frames(150)) + 2.0, 12.5);
        assert_eq!(ctl.pointer_down(&scene, &down), Some(HitZone::LeftEdge));
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(x(frames(100)), 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.clip, b);
        assert_eq!(proposal.proposed.start, frames(150));
        assert_eq!(proposal.proposed.end(), frames(300));
    }

    #[test]
    fn test_left_edge_keeps_right_edge_fixed() {
        let (scene, _, _) = scene();
        let mut ctl = controller();

        ctl.pointer_down(&scene, &PointerEvent::at(x(frames(150)) + 2.0, 12.5));
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(x(frames(200)) + 2.0, 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.proposed.start, frames(200));
        assert_eq!(proposal.proposed.length, frames(100));
    }

    #[test]
    fn test_left_edge_tie_keeps_odd_end() {
        let mut scene = Scene::new("Ties").with_frame_rate(10);
        let a = scene.add_clip(Clip::new("A", Time::ZERO, Time::from_frames(31, 10), 0)).unwrap();
        let mut ctl = controller();

        assert_eq!(ctl.pointer_down(&scene, &PointerEvent::at(0.0, 12.5)), Some(HitZone::LeftEdge));
        // Half a frame at 10 fps rounds back to zero
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(7.5, 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.clip, a);
        assert_eq!(proposal.proposed.start, Time::ZERO);
        assert_eq!(proposal.proposed.end(), Time::from_frames(31, 10));
    }

    #[test]
    fn test_off_frame_clip_keeps_fixed_edges() {
        let length = Time::from_seconds(3.05);
        let mut scene = Scene::new("Off frame").with_frame_rate(10);
        scene.add_clip(Clip::new("A", Time::ZERO, length, 0)).unwrap();
        let mut ctl = controller();

        // Body drag by 0.52 s lands on 0.5 s without resizing
        ctl.pointer_down(&scene, &PointerEvent::at(150.0, 12.5));
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(228.0, 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.proposed.start, Time::from_seconds(0.5));
        assert_eq!(proposal.proposed.length, length);

        // Right edge drag leaves the start alone and rounds the end
        let end = x(length);
        assert_eq!(ctl.pointer_down(&scene, &PointerEvent::at(end - 2.0, 12.5)), Some(HitZone::RightEdge));
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(end - 2.0 - 40.0, 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.proposed.start, Time::ZERO);
        assert_eq!(proposal.proposed.end(), Time::from_seconds(2.8));
    }

    #[test]
    fn test_left_edge_keeps_positive_length() {
        let (scene, _, _) = scene();
        let mut ctl = controller();

        ctl.pointer_down(&scene, &PointerEvent::at(x(frames(150)) + 2.0, 12.5));
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(x(frames(400)), 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.proposed.length, frames(1));
        assert_eq!(proposal.proposed.end(), frames(300));
    }

    #[test]
    fn test_right_edge_limited_by_next_clip() {
        let (scene, a, _) = scene();
        let mut ctl = controller();

        let down = PointerEvent::at(x(frames(150)) - 2.0, 12.5);
        assert_eq!(ctl.pointer_down(&scene, &down), Some(HitZone::RightEdge));
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(x(frames(250)), 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.clip, a);
        assert_eq!(proposal.proposed.start, Time::ZERO);
        assert_eq!(proposal.proposed.length, frames(150));
    }

    #[test]
    fn test_right_edge_shrinks() {
        let (scene, _, _) = scene();
        let mut ctl = controller();

        ctl.pointer_down(&scene, &PointerEvent::at(x(frames(150)) - 2.0, 12.5));
        let proposal = ctl
            .pointer_up(&scene, &PointerEvent::at(x(frames(90)) - 2.0, 12.5).without_snap())
            .unwrap();
        assert_eq!(proposal.proposed.length, frames(90));
    }

    #[test]
    fn test_cancel_discards_drag() {
        let (scene, _, _) = scene();
        let mut ctl = controller();

        ctl.pointer_down(&scene, &PointerEvent::at(x(frames(210)), 12.5));
        ctl.pointer_move(&scene, &PointerEvent::at(x(frames(260)), 12.5));
        ctl.cancel();
        assert!(!ctl.is_dragging());
        assert!(ctl.pointer_up(&scene, &PointerEvent::at(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_pointer_down_on_empty_space() {
        let (scene, _, _) = scene();
        let mut ctl = controller();
        assert_eq!(ctl.pointer_down(&scene, &PointerEvent::at(x(frames(400)), 12.5)), None);
        assert!(!ctl.is_dragging());
    }
}
