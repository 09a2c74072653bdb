// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wall-clock playback of a camera sequence.
//!
//! The controller keeps only transient transport state. The sequence is
//! passed in on every call, so edits made between ticks are picked up on the
//! next frame.

use crate::clock::{Clock, MonotonicClock};
use crate::ease::EasingEngine;
use crate::host::{CameraHost, CameraMode, WorldRegion, LOCAL_UNITS_PER_TILE};
use crate::keyframe::Pose;
use crate::sequence::{LocationAnchor, Sequence};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused mid-sequence
    Paused,
}

impl PlaybackState {
    /// Playing or paused
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}

/// Transport events raised by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback started from the first keyframe
    Started,
    /// Playback was paused
    Paused,
    /// Playback resumed after a pause
    Resumed,
    /// Playback stopped
    Stopped,
    /// Playback wrapped back to the first keyframe
    Looped,
    /// The active segment changed
    KeyframeChanged(usize),
}

/// Playback controller for camera sequences
pub struct PlaybackController<C: Clock = MonotonicClock> {
    clock: C,
    state: PlaybackState,
    /// Whether playback restarts after the final keyframe
    pub looping: bool,
    start_time: u64,
    pause_start_time: u64,
    total_pause_time: u64,
    current_index: usize,
    relocation_warned: bool,
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController<MonotonicClock> {
    /// Create a controller driven by the wall clock
    pub fn new(looping: bool) -> Self {
        Self::with_clock(MonotonicClock::new(), looping)
    }
}

impl<C: Clock> PlaybackController<C> {
    /// Create a controller driven by `clock`
    pub fn with_clock(clock: C, looping: bool) -> Self {
        Self {
            clock,
            state: PlaybackState::Stopped,
            looping,
            start_time: 0,
            pause_start_time: 0,
            total_pause_time: 0,
            current_index: 0,
            relocation_warned: false,
            pending_events: Vec::new(),
        }
    }

    /// Current transport state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Playing or paused
    pub fn is_playing(&self) -> bool {
        self.state.is_active()
    }

    /// Paused mid-sequence
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    /// Index of the keyframe the active segment starts at
    pub fn current_keyframe_index(&self) -> usize {
        self.current_index
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Milliseconds of playback, excluding pauses
    ///
    /// Zero when stopped, frozen while paused, never negative.
    pub fn elapsed(&self) -> u64 {
        let now = match self.state {
            PlaybackState::Stopped => return 0,
            PlaybackState::Paused => self.pause_start_time,
            PlaybackState::Playing => self.clock.now_ms(),
        };
        now.saturating_sub(self.start_time)
            .saturating_sub(self.total_pause_time)
    }

    /// Start playback from the first keyframe
    ///
    /// Needs at least two keyframes and does nothing while already playing
    /// or paused.
    pub fn play(&mut self, sequence: &Sequence, host: &mut dyn CameraHost) -> bool {
        if sequence.len() < 2 || self.state.is_active() {
            return false;
        }

        if host.camera_mode() != CameraMode::Free {
            host.set_camera_mode(CameraMode::Free);
        }

        self.restart();
        self.relocation_warned = false;
        self.state = PlaybackState::Playing;
        self.pending_events.push(PlaybackEvent::Started);
        tracing::info!(
            "Playing sequence: {} keyframes, {}ms",
            sequence.len(),
            sequence.duration()
        );
        true
    }

    /// Pause, or resume if paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            PlaybackState::Stopped => false,
            PlaybackState::Paused => {
                let paused_for = self.clock.now_ms().saturating_sub(self.pause_start_time);
                self.total_pause_time += paused_for;
                self.state = PlaybackState::Playing;
                self.pending_events.push(PlaybackEvent::Resumed);
                tracing::info!("Resumed playback after {paused_for}ms");
                true
            }
            PlaybackState::Playing => {
                self.pause_start_time = self.clock.now_ms();
                self.state = PlaybackState::Paused;
                self.pending_events.push(PlaybackEvent::Paused);
                tracing::info!("Paused playback at {}ms", self.elapsed());
                true
            }
        }
    }

    /// Stop playback
    ///
    /// The current index is kept so the last shown keyframe stays selected.
    pub fn stop(&mut self) {
        let was_active = self.state.is_active();
        self.state = PlaybackState::Stopped;
        self.start_time = 0;
        self.pause_start_time = 0;
        self.total_pause_time = 0;

        if was_active {
            self.pending_events.push(PlaybackEvent::Stopped);
            tracing::info!("Stopped playback at keyframe {}", self.current_index);
        }
    }

    /// Stop and forget the current position
    pub fn rewind(&mut self) {
        self.stop();
        self.current_index = 0;
    }

    /// Advance playback and move the camera
    ///
    /// Returns the pose applied this frame, if any.
    pub fn tick(&mut self, sequence: &Sequence, host: &mut dyn CameraHost) -> Option<Pose> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        if !host.is_logged_in() {
            return None;
        }

        if host.camera_mode() != CameraMode::Free {
            tracing::info!("Camera left free mode, stopping playback");
            self.stop();
            return None;
        }

        if sequence.len() < 2 {
            self.stop();
            return None;
        }

        if self.current_index + 1 >= sequence.len() {
            if self.looping {
                self.restart();
                self.pending_events.push(PlaybackEvent::Looped);
                self.pending_events.push(PlaybackEvent::KeyframeChanged(0));
            } else {
                self.stop();
                return None;
            }
        }

        let elapsed = self.elapsed();
        while !sequence.is_last_index(self.current_index)
            && sequence
                .timestamp(self.current_index + 1)
                .is_some_and(|next_start| elapsed >= next_start)
        {
            self.current_index += 1;
            self.pending_events
                .push(PlaybackEvent::KeyframeChanged(self.current_index));
        }

        let current = sequence.get(self.current_index)?;
        let pose = match sequence.progress_at(self.current_index, elapsed) {
            Some(t) => EasingEngine::interpolate(
                current,
                sequence.get(self.current_index + 1),
                t.clamp(0.0, 1.0),
            ),
            None => *current.pose(),
        };

        Some(self.apply(sequence, host, pose))
    }

    /// Apply a pose to the host, honouring location preservation
    ///
    /// Returns the pose actually applied.
    pub fn apply(&mut self, sequence: &Sequence, host: &mut dyn CameraHost, pose: Pose) -> Pose {
        let mut pose = pose;

        if sequence.anchor.preserve {
            match relocate(&pose, &sequence.anchor, &host.world_region()) {
                Some(relocated) => pose = relocated,
                None => {
                    if !self.relocation_warned {
                        tracing::warn!("Failed to preserve location: out of bounds");
                        self.relocation_warned = true;
                    }
                }
            }
        }

        host.set_pose(&pose);
        pose
    }

    fn restart(&mut self) {
        self.start_time = self.clock.now_ms();
        self.pause_start_time = 0;
        self.total_pause_time = 0;
        self.current_index = 0;
    }
}

/// Translate a pose's focal X/Z from the anchor region into `region`
///
/// Returns `None` when the translated point falls outside the loaded region.
pub fn relocate(pose: &Pose, anchor: &LocationAnchor, region: &WorldRegion) -> Option<Pose> {
    let offset_x = f64::from(anchor.tile_x - region.base_x);
    let offset_z = f64::from(anchor.tile_z - region.base_z);

    let tile_x = pose.focal_x / LOCAL_UNITS_PER_TILE + offset_x;
    let tile_z = pose.focal_z / LOCAL_UNITS_PER_TILE + offset_z;

    if !region.contains_local(tile_x, tile_z) {
        return None;
    }

    Some(Pose {
        focal_x: tile_x * LOCAL_UNITS_PER_TILE,
        focal_z: tile_z * LOCAL_UNITS_PER_TILE,
        ..*pose
    })
}
