// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: one open scene with its history and gesture state.
//!
//! All undoable edits go through [`EditorSession::execute`] or one of the
//! convenience wrappers around it. Every applied, undone or redone command
//! is announced to subscribers as a [`ChangeEvent`] so views can repaint the
//! affected time ranges.

use crate::commands::{
    AddClip, CommandError, DuplicateClip, GroupClips, MoveClip, MoveClips, MoveLayer, RemoveClip,
    RenameScene, SplitClip, UngroupClips,
};
use crate::history::{CommandRecorder, HistoryStats, RecordableCommand};
use crate::property_commands::{ChangeProperty, PropertyPath};
use crate::settings::EditorSettings;
use crate::template::{ClipTemplate, TemplateError};
use montage_graph::{reborn, RebornError};
use montage_timeline::{
    AnimatedValue, Clip, ClipId, GroupId, HitZone, Placement, PlacementError, PlacementProposal,
    PointerEvent, Scene, Time, TimeRange, TimelineEditController, TimelineOptions,
};
use std::path::{Path, PathBuf};

/// Errors from session-level operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// File could not be read or written
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid scene document
    #[error("Failed to parse scene: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Scene could not be serialized
    #[error("Failed to serialize scene: {0}")]
    Serialize(#[from] ron::Error),

    /// Loaded scene breaks a placement rule
    #[error("Scene is invalid: {0}")]
    InvalidScene(#[from] PlacementError),

    /// Identity remapping failed
    #[error("Failed to copy scene: {0}")]
    Reborn(#[from] RebornError),

    /// Template could not be used
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// An edit was rejected
    #[error("Edit rejected: {0}")]
    Command(#[from] CommandError),

    /// Save requested before the scene has a path
    #[error("No scene path set")]
    NoPath,
}

/// What caused a change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A new command was applied
    Executed,
    /// A command was undone
    Undone,
    /// A command was redone
    Redone,
    /// The whole scene was replaced
    SceneReplaced,
}

/// Notification sent to subscribers after the scene changed
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// What happened
    pub kind: ChangeKind,
    /// Description of the command or operation
    pub description: String,
    /// Time ranges to repaint
    pub affected: Vec<TimeRange>,
}

/// Handle returned by [`EditorSession::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ChangeEvent) + Send>;

/// An open scene and everything needed to edit it
pub struct EditorSession {
    scene: Scene,
    recorder: CommandRecorder<Scene>,
    settings: EditorSettings,
    controller: TimelineEditController,
    dirty: bool,
    path: Option<PathBuf>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl EditorSession {
    /// Create a session with an empty scene built from `settings`
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            scene: empty_scene(&settings),
            recorder: CommandRecorder::with_max_depth(settings.history_depth),
            controller: settings.edit_controller(),
            settings,
            dirty: false,
            path: None,
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    /// The open scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Timeline view state; not part of the undo history
    pub fn view_mut(&mut self) -> &mut TimelineOptions {
        &mut self.scene.options
    }

    /// Active settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Replace the settings and reconfigure history depth and gestures
    pub fn apply_settings(&mut self, settings: EditorSettings) {
        self.recorder.set_max_depth(settings.history_depth);
        self.controller.cancel();
        self.controller = settings.edit_controller();
        self.settings = settings;
    }

    /// Gesture state
    pub fn controller(&self) -> &TimelineEditController {
        &self.controller
    }

    /// Check if scene has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Path the scene was loaded from or saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.recorder.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.recorder.can_redo()
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.recorder.undo_description()
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.recorder.redo_description()
    }

    /// Get history statistics
    pub fn history_stats(&self) -> HistoryStats {
        self.recorder.stats()
    }

    /// Register a change listener
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a change listener
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: ChangeEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Apply a command and record it for undo
    pub fn execute(&mut self, command: impl RecordableCommand<Scene> + 'static) {
        let event = ChangeEvent {
            kind: ChangeKind::Executed,
            description: command.description().to_string(),
            affected: command.affected_ranges(),
        };
        self.recorder.do_and_record(Box::new(command), &mut self.scene);
        self.dirty = true;
        self.emit(event);
    }

    /// Undo the last command; false when there was nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(command) = self.recorder.undo(&mut self.scene) else {
            return false;
        };
        let event = ChangeEvent {
            kind: ChangeKind::Undone,
            description: command.description().to_string(),
            affected: command.affected_ranges(),
        };
        self.dirty = true;
        self.emit(event);
        true
    }

    /// Redo the last undone command; false when there was nothing to redo
    pub fn redo(&mut self) -> bool {
        let Some(command) = self.recorder.redo(&mut self.scene) else {
            return false;
        };
        let event = ChangeEvent {
            kind: ChangeKind::Redone,
            description: command.description().to_string(),
            affected: command.affected_ranges(),
        };
        self.dirty = true;
        self.emit(event);
        true
    }

    /// Gather the following edits into one undo entry; false if a
    /// transaction is already open
    pub fn begin_transaction(&mut self) -> bool {
        self.recorder.begin_transaction()
    }

    /// Whether a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.recorder.in_transaction()
    }

    /// Close the open transaction as a single undo entry.
    ///
    /// False when no transaction was open or nothing was recorded in it.
    pub fn commit(&mut self, description: impl Into<String>) -> bool {
        self.recorder.commit(description).is_some()
    }

    /// Undo every edit made since the transaction opened
    pub fn rollback(&mut self) -> bool {
        let Some(undone) = self.recorder.rollback(&mut self.scene) else {
            return false;
        };
        if !undone.is_empty() {
            self.emit(ChangeEvent {
                kind: ChangeKind::Undone,
                description: undone.description().to_string(),
                affected: undone.affected_ranges(),
            });
        }
        true
    }

    /// Run `f` as one undo entry, rolling everything back if it fails
    pub fn execute_in_transaction<R, E>(
        &mut self,
        description: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<R, E>,
    ) -> Result<R, E> {
        if !self.begin_transaction() {
            return f(self);
        }

        match f(self) {
            Ok(result) => {
                self.commit(description);
                Ok(result)
            }
            Err(e) => {
                self.rollback();
                Err(e)
            }
        }
    }

    fn auto_extend(&self) -> bool {
        self.settings.auto_adjust_scene_duration
    }

    /// Add a clip
    pub fn add_clip(&mut self, clip: Clip) -> Result<ClipId, CommandError> {
        let command = AddClip::new(&self.scene, clip)?.with_auto_extend(self.auto_extend());
        let id = command.clip_id();
        self.execute(command);
        Ok(id)
    }

    /// Remove a clip
    pub fn remove_clip(&mut self, id: ClipId) -> Result<(), CommandError> {
        let command = RemoveClip::new(&self.scene, id)?;
        self.execute(command);
        Ok(())
    }

    /// Commit a new placement for a clip
    pub fn move_clip(&mut self, id: ClipId, placement: Placement) -> Result<(), CommandError> {
        let command = MoveClip::new(&self.scene, id, placement)?.with_auto_extend(self.auto_extend());
        self.execute(command);
        Ok(())
    }

    /// Move several clips by the same offsets
    pub fn move_clips(&mut self, ids: &[ClipId], delta: Time, layer_delta: i64) -> Result<(), CommandError> {
        let command = MoveClips::new(&self.scene, ids, delta, layer_delta)?.with_auto_extend(self.auto_extend());
        self.execute(command);
        Ok(())
    }

    /// Move a whole layer
    pub fn move_layer(&mut self, from: u32, to: u32) -> Result<(), CommandError> {
        let command = MoveLayer::new(&self.scene, from, to)?;
        self.execute(command);
        Ok(())
    }

    /// Split a clip, returning the ID of the back half
    pub fn split_clip(&mut self, id: ClipId, at: Time) -> Result<ClipId, CommandError> {
        let command = SplitClip::new(&self.scene, id, at)?;
        let back = command.back_id();
        self.execute(command);
        Ok(back)
    }

    /// Duplicate a clip right after itself, returning the copy's ID
    pub fn duplicate_clip(&mut self, id: ClipId) -> Result<ClipId, CommandError> {
        let command = DuplicateClip::after_source(&self.scene, id)?.with_auto_extend(self.auto_extend());
        let copy = command.copy_id();
        self.execute(command);
        Ok(copy)
    }

    /// Group clips
    pub fn group_clips(&mut self, ids: &[ClipId]) -> Result<GroupId, CommandError> {
        let command = GroupClips::new(&self.scene, ids)?;
        let group = command.group_id();
        self.execute(command);
        Ok(group)
    }

    /// Dissolve a group
    pub fn ungroup_clips(&mut self, group: GroupId) -> Result<(), CommandError> {
        let command = UngroupClips::new(&self.scene, group)?;
        self.execute(command);
        Ok(())
    }

    /// Set a property's static value, as a property editor does
    pub fn set_property(&mut self, path: PropertyPath, value: AnimatedValue) -> Result<(), CommandError> {
        let command = ChangeProperty::new(&self.scene, path, value)?;
        self.execute(command);
        Ok(())
    }

    /// Rename the scene
    pub fn rename_scene(&mut self, name: impl Into<String>) -> Result<(), CommandError> {
        let command = RenameScene::new(name)?;
        self.execute(command);
        Ok(())
    }

    /// Add a new instance of a template
    pub fn insert_template(
        &mut self,
        template: &ClipTemplate,
        start: Time,
        layer: u32,
    ) -> Result<ClipId, SessionError> {
        let clip = template.instantiate(start, layer)?;
        Ok(self.add_clip(clip)?)
    }

    /// Detached copy of a clip with fresh identities
    pub fn reborn_clip(&self, id: ClipId) -> Result<Clip, CommandError> {
        let clip = self.scene.clip(id).ok_or(CommandError::ClipNotFound(id))?;
        Ok(reborn(clip)?.value)
    }

    /// Give every object in the scene a fresh identity.
    ///
    /// Not undoable; clears the history. Returns the number of remapped
    /// identities.
    pub fn reborn_scene(&mut self) -> Result<usize, SessionError> {
        let copy = reborn(&self.scene)?;
        let path = self.path.take();
        self.replace_scene(copy.value, path, "Reborn scene");
        self.dirty = true;
        Ok(copy.map.len())
    }

    /// Start a drag
    pub fn pointer_down(&mut self, event: &PointerEvent) -> Option<HitZone> {
        self.controller.pointer_down(&self.scene, event)
    }

    /// Update the drag preview; the scene is not touched
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Option<Placement> {
        self.controller.pointer_move(&self.scene, event)
    }

    /// Finish a drag, committing the result as one move command.
    ///
    /// A drag that changes nothing records nothing. A rejected placement
    /// leaves the clip where it was before the drag.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> Result<Option<PlacementProposal>, CommandError> {
        let Some(proposal) = self.controller.pointer_up(&self.scene, event) else {
            return Ok(None);
        };
        if !proposal.is_change() {
            return Ok(None);
        }

        match MoveClip::new(&self.scene, proposal.clip, proposal.proposed) {
            Ok(command) => {
                self.execute(command.with_auto_extend(self.auto_extend()));
                Ok(Some(proposal))
            }
            Err(error) => {
                tracing::warn!(clip = %proposal.clip, %error, "drag rejected");
                Err(error)
            }
        }
    }

    /// Abandon a drag
    pub fn pointer_cancel(&mut self) {
        self.controller.cancel();
    }

    /// Drag preview, if a drag is active
    pub fn preview(&self) -> Option<(ClipId, Placement)> {
        self.controller.preview()
    }

    fn replace_scene(&mut self, scene: Scene, path: Option<PathBuf>, description: &str) {
        self.controller.cancel();
        self.recorder.clear();
        self.scene = scene;
        self.path = path;
        self.dirty = false;

        let affected = vec![TimeRange::new(Time::ZERO, self.scene.duration())];
        self.emit(ChangeEvent {
            kind: ChangeKind::SceneReplaced,
            description: description.to_string(),
            affected,
        });
    }

    /// Create a new scene
    pub fn new_scene(&mut self) {
        self.replace_scene(empty_scene(&self.settings), None, "New scene");
        tracing::info!("Created new scene");
    }

    /// Close the scene, discarding history
    pub fn close(&mut self) {
        self.replace_scene(empty_scene(&self.settings), None, "Close scene");
        tracing::info!("Closed scene");
    }

    /// Save the current scene to its path
    pub fn save(&mut self) -> Result<(), SessionError> {
        let path = self.path.clone().ok_or(SessionError::NoPath)?;
        self.save_to_path(&path)
    }

    /// Save the current scene to a specific path
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), SessionError> {
        let ron_str = ron::ser::to_string_pretty(&self.scene, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, ron_str)?;

        self.path = Some(path.to_path_buf());
        self.dirty = false;
        self.settings.add_recent_file(path.to_path_buf());

        tracing::info!("Saved scene to {:?}", path);
        Ok(())
    }

    /// Load a scene from a file, rejecting documents that break placement rules
    pub fn load_from_path(&mut self, path: &Path) -> Result<(), SessionError> {
        let content = std::fs::read_to_string(path)?;
        let scene: Scene = ron::from_str(&content)?;
        scene.validate()?;

        self.replace_scene(scene, Some(path.to_path_buf()), "Load scene");
        self.settings.add_recent_file(path.to_path_buf());

        tracing::info!("Loaded scene from {:?}", path);
        Ok(())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

fn empty_scene(settings: &EditorSettings) -> Scene {
    Scene::default()
        .with_frame_rate(settings.default_frame_rate)
        .with_duration(settings.default_scene_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_timeline::{to_pixels, Effect};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn frames(n: i64) -> Time {
        Time::from_frames(n, 30)
    }

    /// Two touching clips on layer 0: [0, 150) and [150, 300) frames
    fn session() -> (EditorSession, ClipId, ClipId) {
        let settings = EditorSettings {
            snap_threshold: 30.0,
            ..Default::default()
        };
        let mut session = EditorSession::new(settings);
        let a = session
            .add_clip(
                Clip::new("A", frames(0), frames(150), 0)
                    .with_effect(Effect::new("Opacity").with_property("opacity", 1.0)),
            )
            .unwrap();
        let b = session.add_clip(Clip::new("B", frames(150), frames(150), 0)).unwrap();
        (session, a, b)
    }

    fn record_events(session: &mut EditorSession) -> Arc<Mutex<Vec<ChangeEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    fn x(time: Time) -> f64 {
        to_pixels(time, 1.0)
    }

    #[test]
    fn test_events_follow_history() {
        let (mut session, _, b) = session();
        let events = record_events(&mut session);

        session.remove_clip(b).unwrap();
        assert!(session.undo());
        assert!(session.redo());
        assert!(!session.redo());

        let events = events.lock().unwrap();
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Executed, ChangeKind::Undone, ChangeKind::Redone]);
        assert!(events.iter().all(|e| e.description == "Remove clip"));
        assert_eq!(events[0].affected, vec![TimeRange::new(frames(150), frames(150))]);
    }

    #[test]
    fn test_transaction_undoes_as_one() {
        let (mut session, a, b) = session();
        let result: Result<(), CommandError> = session.execute_in_transaction("Shift both", |s| {
            s.move_clip(b, Placement::new(frames(300), frames(150), 0))?;
            s.move_clip(a, Placement::new(frames(150), frames(150), 0))?;
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(session.undo_description(), Some("Shift both"));
        assert_eq!(session.history_stats().undo_count, 3);

        assert!(session.undo());
        assert_eq!(session.scene().clip(a).unwrap().start, frames(0));
        assert_eq!(session.scene().clip(b).unwrap().start, frames(150));
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let (mut session, a, b) = session();
        let events = record_events(&mut session);

        let result = session.execute_in_transaction("Broken", |s| {
            s.move_clip(b, Placement::new(frames(300), frames(150), 0))?;
            // Collides with A
            s.move_clip(b, Placement::new(frames(100), frames(150), 0))
        });
        assert!(matches!(result, Err(CommandError::Placement(_))));
        assert!(!session.in_transaction());
        assert_eq!(session.scene().clip(b).unwrap().start, frames(150));
        assert_eq!(session.scene().clip(a).unwrap().start, frames(0));
        assert_eq!(session.history_stats().undo_count, 2);

        let kinds: Vec<ChangeKind> = events.lock().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Executed, ChangeKind::Undone]);
    }

    #[test]
    fn test_empty_transaction_commits_nothing() {
        let (mut session, _, _) = session();
        assert!(session.begin_transaction());
        assert!(!session.undo());
        assert!(!session.commit("Nothing"));
        assert_eq!(session.history_stats().undo_count, 2);
        assert!(!session.rollback());
    }

    #[test]
    fn test_unsubscribe() {
        let (mut session, a, _) = session();
        let events = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&events);
        let id = session.subscribe(move |_| *sink.lock().unwrap() += 1);

        session.remove_clip(a).unwrap();
        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.undo();
        assert_eq!(*events.lock().unwrap(), 1);
    }

    #[test]
    fn test_drag_snaps_back_without_recording() {
        let (mut session, _, b) = session();
        assert!(session.undo_description().is_some());
        let before = session.history_stats().undo_count;

        let down = PointerEvent::at(x(frames(160)), 10.0);
        assert_eq!(session.pointer_down(&down), Some(HitZone::Body));

        // Five frames left lands within the snap distance of A's end
        let up = PointerEvent::at(x(frames(155)), 10.0);
        let preview = session.pointer_move(&up).unwrap();
        assert_eq!(preview.start, frames(150));
        assert_eq!(session.pointer_up(&up).unwrap(), None);

        assert_eq!(session.scene().clip(b).unwrap().start, frames(150));
        assert_eq!(session.history_stats().undo_count, before);
        assert!(!session.controller().is_dragging());
    }

    #[test]
    fn test_rejected_drag_keeps_geometry() {
        let (mut session, a, b) = session();
        let events = record_events(&mut session);

        session.pointer_down(&PointerEvent::at(x(frames(160)), 10.0));
        let up = PointerEvent::at(x(frames(155)), 10.0).without_snap();
        let result = session.pointer_up(&up);
        assert!(matches!(
            result,
            Err(CommandError::Placement(PlacementError::Overlap { other })) if other == a
        ));

        assert_eq!(session.scene().clip(b).unwrap().start, frames(150));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drag_commits_one_command() {
        let (mut session, _, b) = session();
        let before = session.scene().clone();

        session.pointer_down(&PointerEvent::at(x(frames(160)), 10.0));
        session.pointer_move(&PointerEvent::at(x(frames(175)), 20.0));
        let up = PointerEvent::at(x(frames(190)), 35.0);
        let proposal = session.pointer_up(&up).unwrap().unwrap();
        assert_eq!(proposal.proposed, Placement::new(frames(180), frames(150), 1));
        assert_eq!(session.scene().clip(b).unwrap().placement(), proposal.proposed);
        assert_eq!(session.undo_description(), Some("Move clip"));

        session.undo();
        assert_eq!(session.scene(), &before);
    }

    #[test]
    fn test_cancelled_drag() {
        let (mut session, _, b) = session();
        session.pointer_down(&PointerEvent::at(x(frames(160)), 10.0));
        session.pointer_move(&PointerEvent::at(x(frames(250)), 10.0));
        assert!(session.preview().is_some());
        session.pointer_cancel();
        assert!(session.preview().is_none());
        assert_eq!(session.scene().clip(b).unwrap().start, frames(150));
    }

    #[test]
    fn test_set_property() {
        let (mut session, a, _) = session();
        let effect = session.scene().clip(a).unwrap().effects[0].id;
        let path = PropertyPath::new(a, effect, "opacity");

        session.set_property(path.clone(), AnimatedValue::Scalar(0.25)).unwrap();
        assert_eq!(path.resolve(session.scene()).unwrap().value, AnimatedValue::Scalar(0.25));
        session.undo();
        assert_eq!(path.resolve(session.scene()).unwrap().value, AnimatedValue::Scalar(1.0));
    }

    #[test]
    fn test_clip_edits() {
        let (mut session, a, b) = session();
        let back = session.split_clip(a, frames(30)).unwrap();
        assert_eq!(session.scene().clip(back).unwrap().offset, frames(30));

        let copy = session.duplicate_clip(b).unwrap();
        assert_eq!(session.scene().clip(copy).unwrap().start, frames(300));

        let group = session.group_clips(&[b, copy]).unwrap();
        session.move_clips(&[b, copy], frames(0), 1).unwrap();
        session.ungroup_clips(group).unwrap();
        session.move_layer(1, 3).unwrap();
        assert_eq!(session.scene().clip(copy).unwrap().layer, 3);
        assert!(session.scene().validate().is_ok());

        while session.undo() {}
        assert_eq!(session.scene().clip_count(), 0);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_auto_extend_from_settings() {
        let (mut session, ..) = session();
        let duration = session.scene().duration();
        session.add_clip(Clip::new("Tail", duration, Time::from_secs(5), 2)).unwrap();
        assert_eq!(session.scene().duration(), duration + Time::from_secs(5));
        session.undo();
        assert_eq!(session.scene().duration(), duration);

        session.apply_settings(EditorSettings {
            auto_adjust_scene_duration: false,
            ..session.settings().clone()
        });
        session.add_clip(Clip::new("Tail", duration, Time::from_secs(5), 2)).unwrap();
        assert_eq!(session.scene().duration(), duration);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.ron");
        let (mut session, ..) = session();
        assert!(matches!(session.save(), Err(SessionError::NoPath)));

        session.save_to_path(&path).unwrap();
        assert!(!session.is_dirty());
        assert_eq!(session.settings().recent_files[0], path);

        let mut loaded = EditorSession::default();
        let events = record_events(&mut loaded);
        loaded.load_from_path(&path).unwrap();
        assert_eq!(loaded.scene(), session.scene());
        assert_eq!(loaded.scene().clip_ids(), session.scene().clip_ids());
        assert_eq!(loaded.path(), Some(path.as_path()));
        assert!(!loaded.can_undo());
        assert_eq!(events.lock().unwrap()[0].kind, ChangeKind::SceneReplaced);
    }

    #[test]
    fn test_load_rejects_overlaps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.ron");

        let mut scene = Scene::new("Broken");
        scene.insert_clip(0, Clip::new("A", frames(0), frames(10), 0));
        scene.insert_clip(1, Clip::new("B", frames(5), frames(10), 0));
        std::fs::write(&path, ron::ser::to_string(&scene).unwrap()).unwrap();

        let mut session = EditorSession::default();
        let result = session.load_from_path(&path);
        assert!(matches!(result, Err(SessionError::InvalidScene(PlacementError::Overlap { .. }))));
        assert_eq!(session.scene().clip_count(), 0);
    }

    #[test]
    fn test_reborn_scene_and_clip() {
        let (mut session, a, b) = session();
        let copy = session.reborn_clip(a).unwrap();
        assert_ne!(copy.id, a);
        assert_eq!(copy.name, "A");

        let remapped = session.reborn_scene().unwrap();
        assert!(remapped >= 5);
        assert!(session.scene().clip(a).is_none());
        assert!(session.scene().clip(b).is_none());
        assert_eq!(session.scene().clip_count(), 2);
        assert!(session.is_dirty());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_insert_template() {
        let (mut session, a, _) = session();
        let template = ClipTemplate::from_clip("Fade", session.scene().clip(a).unwrap()).unwrap();
        let id = session.insert_template(&template, frames(300), 0).unwrap();
        assert_eq!(session.scene().clip(id).unwrap().start, frames(300));
        assert!(matches!(
            session.insert_template(&template, frames(0), 0),
            Err(SessionError::Command(CommandError::Placement(_)))
        ));
    }

    #[test]
    fn test_close_clears_history() {
        let (mut session, ..) = session();
        session.close();
        assert!(!session.can_undo());
        assert_eq!(session.scene().clip_count(), 0);
        assert!(!session.is_dirty());
        assert_eq!(session.scene().frame_rate, session.settings().default_frame_rate);
    }
}
