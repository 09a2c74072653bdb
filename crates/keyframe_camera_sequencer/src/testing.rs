// SPDX-License-Identifier: MIT OR Apache-2.0
//! Test doubles shared by the unit tests.

use crate::host::{CameraHost, CameraMode, WorldRegion};
use crate::keyframe::Pose;

/// Host camera that records every applied pose
#[derive(Debug, Clone)]
pub(crate) struct RecordingHost {
    pub pose: Pose,
    pub mode: CameraMode,
    pub logged_in: bool,
    pub region: WorldRegion,
    pub applied: Vec<Pose>,
    pub mode_requests: Vec<CameraMode>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            pose: Pose::new([6400.0, -300.0, 6400.0], 256.0, 1024.0, 600),
            mode: CameraMode::Locked,
            logged_in: true,
            region: WorldRegion {
                base_x: 3200,
                base_z: 3200,
                size_x: 104,
                size_z: 104,
            },
            applied: Vec::new(),
            mode_requests: Vec::new(),
        }
    }

    pub fn last_applied(&self) -> Option<Pose> {
        self.applied.last().copied()
    }
}

impl CameraHost for RecordingHost {
    fn current_pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: &Pose) {
        self.pose = *pose;
        self.applied.push(*pose);
    }

    fn camera_mode(&self) -> CameraMode {
        self.mode
    }

    fn set_camera_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
        self.mode_requests.push(mode);
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    fn world_region(&self) -> WorldRegion {
        self.region
    }
}
