// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer settings.
//!
//! Settings are stored as pretty-printed RON next to the host's other
//! configuration. Missing fields fall back to their defaults so older files
//! keep loading.

use crate::keyframe::EaseType;
use crate::sequence::DEFAULT_KEYFRAME_DURATION_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file name
pub const CONFIG_FILE_NAME: &str = "keyframe_camera.ron";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for these settings
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),
}

/// Operator settings for the camera sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Gap between appended keyframes (milliseconds)
    pub default_keyframe_duration_ms: u64,
    /// Easing assigned to newly captured keyframes
    pub default_ease: EaseType,
    /// Whether playback restarts after the final keyframe
    pub looping: bool,
    /// Directory holding saved sequences
    pub sequences_dir: PathBuf,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            default_keyframe_duration_ms: DEFAULT_KEYFRAME_DURATION_MS,
            default_ease: EaseType::Sine,
            looping: true,
            sequences_dir: PathBuf::from("sequences"),
        }
    }
}

impl SequencerConfig {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save settings as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
