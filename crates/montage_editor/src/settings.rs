// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings stored as a RON file.

use crate::history::MAX_HISTORY;
use montage_timeline::{
    Time, TimelineEditController, DEFAULT_EDGE_HIT_WIDTH, DEFAULT_FRAME_RATE, DEFAULT_SNAP_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "montage.ron";

/// Maximum number of remembered recent files
const MAX_RECENT_FILES: usize = 10;

/// Errors while reading or writing settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for the settings type
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer editor
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// User-facing editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Format version
    pub version: u32,
    /// Undo history depth
    pub history_depth: usize,
    /// Snap distance in pixels
    pub snap_threshold: f64,
    /// Resize handle width in pixels
    pub edge_hit_width: f64,
    /// Grow the scene when an edit places content past its end
    pub auto_adjust_scene_duration: bool,
    /// Frame rate of new scenes
    pub default_frame_rate: u32,
    /// Duration of new scenes
    pub default_scene_duration: Time,
    /// Recently opened scene files, newest first
    pub recent_files: Vec<PathBuf>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            history_depth: MAX_HISTORY,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            edge_hit_width: DEFAULT_EDGE_HIT_WIDTH,
            auto_adjust_scene_duration: true,
            default_frame_rate: DEFAULT_FRAME_RATE,
            default_scene_duration: Time::from_secs(60),
            recent_files: Vec::new(),
        }
    }
}

impl EditorSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: EditorSettings = ron::from_str(&content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings from `path` if it exists, else the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the settings file path for a directory
    pub fn settings_file_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE_NAME)
    }

    /// Remember a file as most recently used
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Edit controller configured from these settings
    pub fn edit_controller(&self) -> TimelineEditController {
        let mut controller = TimelineEditController::new().with_snap_threshold(self.snap_threshold);
        controller.edge_hit_width = self.edge_hit_width;
        controller
    }
}
