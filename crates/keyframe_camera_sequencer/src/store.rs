// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saved sequences on disk.

use crate::codec::{self, CodecError};
use crate::sequence::Sequence;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of saved sequence files
pub const SEQUENCE_EXTENSION: &str = "txt";

/// Errors from saving or loading sequences
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid sequence
    #[error("Invalid sequence file {path}: {source}")]
    Codec {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: CodecError,
    },
}

/// Directory of saved sequence files
#[derive(Debug, Clone)]
pub struct SequenceStore {
    dir: PathBuf,
}

impl SequenceStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the sequences
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| self.io_error(&self.dir, source))
    }

    /// Path of a named sequence; the extension is added when missing
    pub fn path_for(&self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        if path.extension().is_some_and(|ext| ext == SEQUENCE_EXTENSION) {
            path
        } else {
            self.dir.join(format!("{name}.{SEQUENCE_EXTENSION}"))
        }
    }

    /// Save a sequence under `name`, replacing any existing file
    pub fn save(&self, sequence: &Sequence, name: &str) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;
        let path = self.path_for(name);
        std::fs::write(&path, codec::serialize(sequence))
            .map_err(|source| self.io_error(&path, source))?;
        tracing::info!("Sequence saved: {}", path.display());
        Ok(path)
    }

    /// Save a sequence under a name derived from the local time
    pub fn save_timestamped(&self, sequence: &Sequence) -> Result<PathBuf, StoreError> {
        self.save(sequence, &timestamp_name())
    }

    /// Load a named sequence
    pub fn load(&self, name: &str, default_duration: u64) -> Result<Sequence, StoreError> {
        let path = self.path_for(name);
        let text = std::fs::read_to_string(&path).map_err(|source| self.io_error(&path, source))?;
        let sequence = codec::deserialize(&text, default_duration).map_err(|source| {
            StoreError::Codec {
                path: path.clone(),
                source,
            }
        })?;
        tracing::info!(
            "Sequence loaded: {} ({} keyframes)",
            path.display(),
            sequence.len()
        );
        Ok(sequence)
    }

    /// Names of saved sequences, sorted
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|source| self.io_error(&self.dir, source))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|source| self.io_error(&self.dir, source))?.path();
            if !path.is_file() || !path.extension().is_some_and(|ext| ext == SEQUENCE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// `yyyy-MM-dd_HH-mm-ss` in local time
pub fn timestamp_name() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::{EaseType, Keyframe, Pose};

    fn sample() -> Sequence {
        let mut sequence = Sequence::new(2000);
        sequence.add(Keyframe::new(Pose::new([1.0, 2.0, 3.0], 4.0, 5.0, 6), EaseType::Cubic));
        sequence.add(Keyframe::new(Pose::new([7.0, 8.0, 9.0], 10.0, 11.0, 12), EaseType::Expo));
        sequence
    }

    #[test]
    fn test_save_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = SequenceStore::new(dir.path().join("sequences"));
        assert!(store.list().unwrap().is_empty());

        let path = store.save(&sample(), "flyover").unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("flyover.txt"));
        std::fs::write(store.dir().join("notes.md"), "not a sequence").unwrap();

        assert_eq!(store.list().unwrap(), vec!["flyover.txt".to_string()]);

        let loaded = store.load("flyover.txt", 2000).unwrap();
        assert_eq!(loaded.timestamps(), &[0, 2000]);
        assert_eq!(loaded.get(1).map(|kf| kf.ease), Some(EaseType::Expo));
    }

    #[test]
    fn test_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = SequenceStore::new(dir.path());
        let path = store.save_timestamped(&sample()).unwrap();
        let name = path.file_stem().and_then(|n| n.to_str()).unwrap().to_string();
        assert_eq!(name.len(), "2024-01-01_00-00-00".len());
        assert_eq!(name.as_bytes()[10], b'_');
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = SequenceStore::new(dir.path());

        assert!(matches!(store.load("missing", 2000), Err(StoreError::Io { .. })));

        std::fs::write(store.path_for("broken"), "0,1,2,3,4,5,6,NOPE\n").unwrap();
        assert!(matches!(store.load("broken", 2000), Err(StoreError::Codec { .. })));
    }
}
