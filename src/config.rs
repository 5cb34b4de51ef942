// Pose Recorder 🚀 AGPL-3.0 License

//! Session configuration.
//!
//! This module defines the [`SessionConfig`] struct, which is passed into the
//! session driver at startup and controls where recordings are stored, which pose
//! model topology is expected, and when capture stops.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RecorderError, Result};
use crate::topology::SUPPORTED_MODELS;

/// Configuration for a recording or comparison session.
///
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use pose_recorder::SessionConfig;
///
/// let config = SessionConfig::new()
///     .with_recordings_root("data/recordings")
///     .with_min_confidence(0.3)
///     .with_max_frames(300);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding one subdirectory per action or subject.
    pub recordings_root: PathBuf,
    /// Pose model topology the keypoints follow.
    pub pose_model: String,
    /// Minimum keypoint confidence (0.0 to 1.0) for a joint to contribute to an angle.
    pub min_confidence: f32,
    /// Stop capturing after this many frames. `None` runs until the source ends.
    pub max_frames: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recordings_root: PathBuf::from("recordings"),
            pose_model: "BODY_25".to_string(),
            min_confidence: 0.1,
            max_frames: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::ConfigError`] if the file cannot be read, parsed, or
    /// fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RecorderError::ConfigError(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| RecorderError::ConfigError(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_MODELS.contains(&self.pose_model.as_str()) {
            return Err(RecorderError::ConfigError(format!(
                "unsupported pose model '{}'. Must be one of: {}",
                self.pose_model,
                SUPPORTED_MODELS.join(", ")
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(RecorderError::ConfigError(format!(
                "min_confidence must be between 0.0 and 1.0, got {}",
                self.min_confidence
            )));
        }
        if self.max_frames == Some(0) {
            return Err(RecorderError::ConfigError(
                "max_frames must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the recordings root directory.
    #[must_use]
    pub fn with_recordings_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.recordings_root = root.into();
        self
    }

    /// Set the pose model name.
    #[must_use]
    pub fn with_pose_model<S: Into<String>>(mut self, model: S) -> Self {
        self.pose_model = model.into();
        self
    }

    /// Set the minimum keypoint confidence.
    #[must_use]
    pub const fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = threshold;
        self
    }

    /// Stop capture after `max` frames.
    #[must_use]
    pub const fn with_max_frames(mut self, max: usize) -> Self {
        self.max_frames = Some(max);
        self
    }

    /// Directory a recording for `folder` is saved into.
    #[must_use]
    pub fn action_dir(&self, folder: &str) -> PathBuf {
        self.recordings_root.join(folder)
    }
}
