// SPDX-License-Identifier: MIT OR Apache-2.0
//! Montage editor core.
//!
//! Features:
//! - Undo/redo history with bounded depth and composite commands
//! - Scene commands for clips, layers and groups
//! - Property and animation span commands
//! - Editing sessions with change notification and pointer-drag commits
//! - Reusable clip templates
//! - RON settings and scene documents
//!
//! ## Architecture
//!
//! [`EditorSession`] owns one [`montage_timeline::Scene`] and one
//! [`CommandRecorder`]. Every mutation goes through a command built against
//! the current scene; construction validates, execution cannot fail. Drag
//! gestures are resolved by the timeline edit controller and committed here
//! as a single [`MoveClip`].

pub mod history;
pub mod commands;
pub mod property_commands;
pub mod settings;
pub mod template;
pub mod session;

pub use history::{CommandRecorder, CompositeCommand, HistoryStats, RecordableCommand, MAX_HISTORY};
pub use commands::{
    AddClip, CommandError, DuplicateClip, GroupClips, MoveClip, MoveClips, MoveLayer, RemoveClip,
    RenameScene, SplitClip, UngroupClips,
};
pub use property_commands::{
    ChangeProperty, InsertDirection, InsertSpan, MoveSpan, PropertyPath, RemoveSpan, SetEasing,
    SetSpanDuration, SetSpanValues, ToggleAnimation,
};
pub use settings::{EditorSettings, SettingsError, SETTINGS_FILE_NAME, SETTINGS_FORMAT_VERSION};
pub use template::{ClipTemplate, TemplateError, TemplateId};
pub use session::{ChangeEvent, ChangeKind, EditorSession, ListenerId, SessionError};
