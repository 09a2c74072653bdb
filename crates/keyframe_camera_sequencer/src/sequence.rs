// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered keyframe sequence with derived timestamps.
//!
//! Each keyframe starts at a cumulative timestamp (milliseconds from the start
//! of the sequence). The duration of a keyframe is the gap to the next
//! timestamp; the final keyframe is a terminal pose with no duration.
//!
//! Invariants kept by every mutation:
//! - `timestamps[0] == 0` when the sequence is non-empty
//! - timestamps are non-decreasing and index-aligned with keyframes
//! - the last timestamp is the total duration

use crate::keyframe::{EaseType, Keyframe, KeyframeId, Pose};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default gap between appended keyframes (milliseconds)
pub const DEFAULT_KEYFRAME_DURATION_MS: u64 = 3000;

/// World-tile anchor used to re-project focal points into a shifted region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationAnchor {
    /// Tile X of the region origin when keyframes were captured
    pub tile_x: i32,
    /// Tile Z of the region origin when keyframes were captured
    pub tile_z: i32,
    /// Whether playback should translate focal points relative to the anchor
    pub preserve: bool,
}

/// A camera sequence
#[derive(Debug, Clone)]
pub struct Sequence {
    /// Keyframes in playback order, keyed by identity
    keyframes: IndexMap<KeyframeId, Keyframe>,
    /// Start time of each keyframe, aligned with `keyframes`
    timestamps: Vec<u64>,
    /// Gap used when appending keyframes
    default_duration: u64,
    /// Location preservation state
    pub anchor: LocationAnchor,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new(default_duration: u64) -> Self {
        Self {
            keyframes: IndexMap::new(),
            timestamps: Vec::new(),
            default_duration,
            anchor: LocationAnchor::default(),
        }
    }

    /// Gap used when appending keyframes
    pub fn default_duration(&self) -> u64 {
        self.default_duration
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the sequence has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframe at an index
    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get_index(index).map(|(_, kf)| kf)
    }

    /// Keyframe by ID
    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.get(&id)
    }

    /// Index of a keyframe
    pub fn index_of(&self, id: KeyframeId) -> Option<usize> {
        self.keyframes.get_index_of(&id)
    }

    /// Whether the keyframe belongs to this sequence
    pub fn contains(&self, id: KeyframeId) -> bool {
        self.keyframes.contains_key(&id)
    }

    /// Keyframe following `id`, if any
    pub fn next(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.index_of(id).and_then(|index| self.get(index + 1))
    }

    /// Whether `index` is the final keyframe
    pub fn is_last_index(&self, index: usize) -> bool {
        index + 1 == self.len()
    }

    /// Whether `id` is the final keyframe
    pub fn is_last(&self, id: KeyframeId) -> bool {
        self.index_of(id).is_some_and(|index| self.is_last_index(index))
    }

    /// Start time of the keyframe at `index`
    pub fn timestamp(&self, index: usize) -> Option<u64> {
        self.timestamps.get(index).copied()
    }

    /// Start time of a keyframe
    pub fn timestamp_of(&self, id: KeyframeId) -> Option<u64> {
        self.index_of(id).and_then(|index| self.timestamp(index))
    }

    /// All start times, aligned with keyframe order
    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }

    /// Keyframes in playback order
    pub fn iter(&self) -> impl Iterator<Item = &Keyframe> {
        self.keyframes.values()
    }

    /// `(start time, keyframe)` pairs in playback order
    pub fn entries(&self) -> impl Iterator<Item = (u64, &Keyframe)> {
        self.timestamps.iter().copied().zip(self.keyframes.values())
    }

    /// Total duration (start time of the last keyframe)
    pub fn duration(&self) -> u64 {
        self.timestamps.last().copied().unwrap_or(0)
    }

    /// Duration of the segment leaving the keyframe at `index`
    pub fn duration_at(&self, index: usize) -> u64 {
        match (self.timestamps.get(index), self.timestamps.get(index + 1)) {
            (Some(start), Some(end)) => end - start,
            _ => 0,
        }
    }

    /// Duration of the segment leaving `id`; 0 for the last keyframe
    pub fn keyframe_duration(&self, id: KeyframeId) -> u64 {
        self.index_of(id).map_or(0, |index| self.duration_at(index))
    }

    /// Append a keyframe one default duration after the current end
    pub fn add(&mut self, keyframe: Keyframe) -> KeyframeId {
        let timestamp = if self.is_empty() {
            0
        } else {
            self.duration().saturating_add(self.default_duration)
        };
        self.push(keyframe, timestamp)
    }

    /// Append a keyframe at an explicit start time
    ///
    /// Returns `None` without touching the sequence when `timestamp` would
    /// break ordering: the first keyframe must start at 0 and later ones no
    /// earlier than their predecessor.
    pub fn add_at(&mut self, keyframe: Keyframe, timestamp: u64) -> Option<KeyframeId> {
        let in_order = self
            .timestamps
            .last()
            .map_or(timestamp == 0, |last| timestamp >= *last);
        in_order.then(|| self.push(keyframe, timestamp))
    }

    fn push(&mut self, keyframe: Keyframe, timestamp: u64) -> KeyframeId {
        let id = keyframe.id();
        self.keyframes.insert(id, keyframe);
        self.timestamps.push(timestamp);
        tracing::debug!("Added keyframe {id} at {timestamp}ms");
        id
    }

    /// Append a copy of a member keyframe under a new identity
    pub fn duplicate(&mut self, id: KeyframeId) -> Option<KeyframeId> {
        let copy = self.keyframe(id)?.duplicate();
        Some(self.add(copy))
    }

    /// Replace a member's pose, keeping its identity and ease
    pub fn overwrite(&mut self, id: KeyframeId, pose: Pose) -> bool {
        match self.keyframes.get_mut(&id) {
            Some(keyframe) => {
                keyframe.set_pose(pose);
                tracing::debug!("Overwrote keyframe {id}");
                true
            }
            None => false,
        }
    }

    /// Change the easing of the segment leaving `id`
    pub fn set_ease(&mut self, id: KeyframeId, ease: EaseType) -> bool {
        match self.keyframes.get_mut(&id) {
            Some(keyframe) => {
                keyframe.ease = ease;
                true
            }
            None => false,
        }
    }

    /// Remove a keyframe, collapsing the time its outgoing segment occupied
    pub fn remove(&mut self, id: KeyframeId) -> Option<Keyframe> {
        let index = self.index_of(id)?;
        let duration = self.duration_at(index);

        for timestamp in &mut self.timestamps[index + 1..] {
            *timestamp -= duration;
        }
        self.timestamps.remove(index);

        let removed = self.keyframes.shift_remove_index(index).map(|(_, kf)| kf);
        tracing::debug!("Removed keyframe {id} ({duration}ms segment)");
        removed
    }

    /// Exchange the order of two keyframes, preserving outgoing durations
    ///
    /// When one of them is the final keyframe, the keyframe leaving the
    /// terminal slot inherits the outgoing duration of the one entering it,
    /// so the total duration never changes.
    pub fn swap(&mut self, a: KeyframeId, b: KeyframeId) {
        if a == b {
            return;
        }
        let (Some(index_a), Some(index_b)) = (self.index_of(a), self.index_of(b)) else {
            return;
        };

        let mut durations: Vec<u64> = (0..self.len()).map(|i| self.duration_at(i)).collect();
        if !self.is_last_index(index_a) && !self.is_last_index(index_b) {
            durations.swap(index_a, index_b);
        }

        self.keyframes.swap_indices(index_a, index_b);
        self.rebuild_timestamps(&durations);
        tracing::debug!("Swapped keyframes at {index_a} and {index_b}");
    }

    /// Move a keyframe one slot earlier
    pub fn move_up(&mut self, id: KeyframeId) -> bool {
        let Some(index) = self.index_of(id).filter(|index| *index > 0) else {
            return false;
        };
        let Some(previous) = self.get(index - 1).map(Keyframe::id) else {
            return false;
        };
        self.swap(previous, id);
        true
    }

    /// Move a keyframe one slot later
    pub fn move_down(&mut self, id: KeyframeId) -> bool {
        let Some(next) = self.next(id).map(Keyframe::id) else {
            return false;
        };
        self.swap(id, next);
        true
    }

    /// Change the duration of the segment leaving `id`
    ///
    /// Every later keyframe shifts by the difference; the keyframe's own
    /// start time does not move. Returns `false` and leaves the timeline
    /// untouched for a non-member, the final keyframe, or a duration that
    /// would push the end of the sequence past `u64::MAX`.
    pub fn set_keyframe_duration(&mut self, id: KeyframeId, duration: u64) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if self.is_last_index(index) {
            return false;
        }
        let old = self.duration_at(index);
        if (self.duration() - old).checked_add(duration).is_none() {
            tracing::warn!("Keyframe {id} duration {duration}ms overflows the timeline");
            return false;
        }

        for timestamp in &mut self.timestamps[index + 1..] {
            *timestamp = *timestamp - old + duration;
        }
        tracing::debug!("Keyframe {id} duration {old}ms -> {duration}ms");
        true
    }

    /// Local progress through the segment leaving `id` at `elapsed` ms
    ///
    /// `None` for the final keyframe or a non-member. A zero-length segment
    /// is reported as complete.
    pub fn progress(&self, id: KeyframeId, elapsed: u64) -> Option<f64> {
        let index = self.index_of(id)?;
        self.progress_at(index, elapsed)
    }

    /// Local progress through the segment leaving the keyframe at `index`
    pub fn progress_at(&self, index: usize, elapsed: u64) -> Option<f64> {
        if self.is_last_index(index) {
            return None;
        }
        let start = self.timestamp(index)?;
        let duration = self.duration_at(index);
        if duration == 0 {
            return Some(1.0);
        }
        Some((elapsed as f64 - start as f64) / duration as f64)
    }

    /// Rebuild every timestamp as a running sum of `durations`
    fn rebuild_timestamps(&mut self, durations: &[u64]) {
        let mut time = 0;
        for (timestamp, duration) in self.timestamps.iter_mut().zip(durations) {
            *timestamp = time;
            time = time.saturating_add(*duration);
        }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(DEFAULT_KEYFRAME_DURATION_MS)
    }
}
