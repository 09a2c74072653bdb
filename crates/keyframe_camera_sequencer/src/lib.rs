// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe camera sequencer.
//!
//! This crate drives a host camera through a sequence of captured poses:
//! - Keyframes with per-segment easing
//! - Timeline editing with derived timestamps
//! - Wall-clock playback with pause, stop and loop
//! - Text persistence of sequences
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - [`Sequence`] as the single source of truth for keyframes and timing
//! - [`EasingEngine`] for curve evaluation and pose interpolation
//! - [`PlaybackController`] mapping elapsed time to a pose each frame
//! - [`CameraHost`] and [`Clock`] as the seams to the host client
//! - [`CameraSession`] owning all of the above for UI and frame callbacks

pub mod clock;
pub mod codec;
pub mod config;
pub mod ease;
pub mod host;
pub mod keyframe;
pub mod playback;
pub mod sequence;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use codec::CodecError;
pub use config::{ConfigError, SequencerConfig, CONFIG_FILE_NAME};
pub use ease::EasingEngine;
pub use host::{CameraHost, CameraMode, WorldRegion};
pub use keyframe::{EaseType, Keyframe, KeyframeId, Pose, UnknownEaseType};
pub use playback::{PlaybackController, PlaybackEvent, PlaybackState};
pub use sequence::{LocationAnchor, Sequence};
pub use session::{CameraSession, Observer, SessionEvent, SharedSession};
pub use store::{SequenceStore, StoreError};
