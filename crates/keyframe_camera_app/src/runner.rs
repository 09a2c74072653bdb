// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless preview of camera sequences.

use crate::sim_host::SimulatedCamera;
use keyframe_camera_sequencer::{
    CameraHost, CameraSession, ConfigError, EaseType, ManualClock, PlaybackEvent, Pose,
    SessionEvent, StoreError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Session type used by the runner
pub type PreviewSession = CameraSession<SimulatedCamera, ManualClock>;

/// Application errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be read or written
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A sequence could not be saved or loaded
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Playback needs at least two keyframes
    #[error("Sequence has {0} keyframe(s); at least 2 are needed to play")]
    TooFewKeyframes(usize),
}

/// How a preview is run
#[derive(Debug, Clone, Copy)]
pub struct PreviewOptions {
    /// Simulated frames per second
    pub fps: u32,
    /// Stop after this much playback time even when looping
    pub max_seconds: u64,
    /// Sleep between frames instead of running as fast as possible
    pub realtime: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            fps: 30,
            max_seconds: 60,
            realtime: false,
        }
    }
}

/// Outcome of a preview run
#[derive(Debug, Clone, Copy)]
pub struct PreviewReport {
    /// Frames ticked
    pub frames: u64,
    /// Times playback wrapped around
    pub loops: usize,
    /// Last pose applied to the camera
    pub final_pose: Option<Pose>,
    /// Whether playback ended on its own
    pub finished: bool,
}

/// Play the session's sequence against the simulated camera
pub fn preview(
    session: &mut PreviewSession,
    clock: &ManualClock,
    options: PreviewOptions,
) -> Result<PreviewReport, AppError> {
    let loops = Arc::new(AtomicUsize::new(0));
    let loop_counter = Arc::clone(&loops);
    session.subscribe(move |event| match event {
        SessionEvent::Playback(PlaybackEvent::Looped) => {
            loop_counter.fetch_add(1, Ordering::Relaxed);
        }
        SessionEvent::Playback(PlaybackEvent::KeyframeChanged(index)) => {
            tracing::info!("Keyframe {index}");
        }
        other => tracing::debug!("{other:?}"),
    });

    if !session.play() {
        return Err(AppError::TooFewKeyframes(session.sequence().len()));
    }

    let frame_ms = u64::from(1000 / options.fps.max(1)).max(1);
    let budget_ms = options.max_seconds.saturating_mul(1000);
    let mut played_ms = 0;
    let mut frames = 0;
    let mut final_pose = None;

    while session.playback().is_playing() && played_ms < budget_ms {
        clock.advance(frame_ms);
        played_ms += frame_ms;
        if options.realtime {
            std::thread::sleep(Duration::from_millis(frame_ms));
        }
        if let Some(pose) = session.tick() {
            final_pose = Some(pose);
        }
        frames += 1;
    }

    let finished = !session.playback().is_playing();
    session.stop();

    Ok(PreviewReport {
        frames,
        loops: loops.load(Ordering::Relaxed),
        final_pose,
        finished,
    })
}

/// Capture a short orbit around the simulated camera's start point
pub fn build_demo(session: &mut PreviewSession) -> usize {
    let start = session.host().current_pose();
    let stops = [
        (0.0, 0.0, 512, EaseType::Sine, 2000),
        (512.0, 384.0, 600, EaseType::Cubic, 1500),
        (-512.0, 1024.0, 700, EaseType::Expo, 2500),
        (0.0, 1900.0, 512, EaseType::Linear, 0),
    ];

    let mut captured = Vec::with_capacity(stops.len());
    for (offset, yaw, zoom, ease, duration) in stops {
        let pose = Pose {
            focal_x: start.focal_x + offset,
            focal_z: start.focal_z - offset,
            yaw,
            zoom,
            ..start
        };
        session.host_mut().point_at(pose);
        if let Some(id) = session.capture_keyframe() {
            session.set_ease(id, ease);
            captured.push((id, duration));
        }
    }

    // A segment only has a length once the keyframe after it exists
    for (id, duration) in captured {
        if session.sequence().is_last(id) {
            break;
        }
        session.set_duration(id, duration);
    }

    session.sequence().len()
}
