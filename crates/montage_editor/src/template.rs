// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip templates.
//!
//! A template is a detached copy of a clip that can be stored on disk and
//! instantiated any number of times. Detaching and instantiating both give
//! the clip fresh identities, so instances never collide with each other or
//! with the clip the template was made from.

use montage_graph::{reborn, RebornError};
use montage_timeline::{Clip, Time};
use serde::{Deserialize, Serialize};
use std::path::Path;

montage_graph::identity_type!(
    /// Unique identifier for a template
    TemplateId
);

/// Errors while creating, storing or instantiating templates
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Identity remapping failed
    #[error("Failed to copy template clip: {0}")]
    Reborn(#[from] RebornError),

    /// File could not be read or written
    #[error("Template I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a valid template
    #[error("Failed to parse template: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Template could not be serialized
    #[error("Failed to serialize template: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer editor
    #[error("Template version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// A reusable clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipTemplate {
    /// Unique template ID
    pub id: TemplateId,
    /// Template name
    pub name: String,
    /// Format version
    pub version: u32,
    /// Template content, starting at time zero on layer zero
    pub clip: Clip,
}

impl ClipTemplate {
    /// Current format version
    pub const FORMAT_VERSION: u32 = 1;

    /// Detach a copy of `clip` as a template
    pub fn from_clip(name: impl Into<String>, clip: &Clip) -> Result<Self, TemplateError> {
        let mut detached = reborn(clip)?.value;
        detached.start = Time::ZERO;
        detached.layer = 0;

        let template = Self {
            id: TemplateId::new(),
            name: name.into(),
            version: Self::FORMAT_VERSION,
            clip: detached,
        };
        tracing::debug!(template = %template.id, name = %template.name, "created clip template");
        Ok(template)
    }

    /// Create a new clip from the template at `start` on `layer`.
    ///
    /// The result is not validated against any scene.
    pub fn instantiate(&self, start: Time, layer: u32) -> Result<Clip, TemplateError> {
        let mut clip = reborn(&self.clip)?.value;
        clip.start = start;
        clip.layer = layer;
        Ok(clip)
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, TemplateError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON
    pub fn from_ron(s: &str) -> Result<Self, TemplateError> {
        let template: ClipTemplate = ron::from_str(s)?;
        if template.version > Self::FORMAT_VERSION {
            return Err(TemplateError::UnsupportedVersion {
                found: template.version,
                supported: Self::FORMAT_VERSION,
            });
        }
        Ok(template)
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> Result<(), TemplateError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved template to {:?}", path);
        Ok(())
    }

    /// Load from file
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_graph::collect_identities;
    use montage_timeline::{Animation, AnimationSpan, Easing, Effect, Property};
    use tempfile::TempDir;

    fn animated_clip() -> Clip {
        let span = AnimationSpan::new(0.0, 1.0, Time::from_secs(1), Easing::SineInOut).unwrap();
        let mut effect = Effect::new("Opacity");
        effect.insert_property(Property::new("opacity", 0.0).with_animation(Animation::with_spans([span])));
        Clip::new("Fade In", Time::from_secs(5), Time::from_secs(2), 3).with_effect(effect)
    }

    #[test]
    fn test_template_is_detached() {
        let clip = animated_clip();
        let template = ClipTemplate::from_clip("Fade", &clip).unwrap();
        assert_eq!(template.version, ClipTemplate::FORMAT_VERSION);
        assert_eq!((template.clip.start, template.clip.layer), (Time::ZERO, 0));
        assert_eq!(template.clip.length, clip.length);

        let original = collect_identities(&clip);
        let detached = collect_identities(&template.clip);
        assert_eq!(original.len(), detached.len());
        assert!(detached.iter().all(|id| !original.contains(id)));
    }

    #[test]
    fn test_instances_are_independent() {
        let template = ClipTemplate::from_clip("Fade", &animated_clip()).unwrap();
        let first = template.instantiate(Time::from_secs(1), 2).unwrap();
        let second = template.instantiate(Time::from_secs(1), 2).unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.effects[0].id, second.effects[0].id);
        assert_eq!((first.start, first.layer), (Time::from_secs(1), 2));

        let effect = first.effects[0].id;
        assert_eq!(
            first.sample(effect, "opacity", Time::from_seconds(1.5)),
            template.clip.sample(template.clip.effects[0].id, "opacity", Time::from_seconds(0.5))
        );
    }

    #[test]
    fn test_template_serialization() {
        let template = ClipTemplate::from_clip("Serialization Test", &animated_clip()).unwrap();
        let ron = template.to_ron().unwrap();
        let loaded = ClipTemplate::from_ron(&ron).unwrap();
        assert_eq!(loaded, template);
    }

    #[test]
    fn test_template_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fade.template.ron");
        let template = ClipTemplate::from_clip("Fade", &animated_clip()).unwrap();
        template.save(&path).unwrap();
        assert_eq!(ClipTemplate::load(&path).unwrap(), template);

        let mut future = template.clone();
        future.version = ClipTemplate::FORMAT_VERSION + 1;
        let ron = ron::ser::to_string(&future).unwrap();
        assert!(matches!(
            ClipTemplate::from_ron(&ron),
            Err(TemplateError::UnsupportedVersion { .. })
        ));
    }
}
