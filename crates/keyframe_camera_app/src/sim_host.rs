// SPDX-License-Identifier: MIT OR Apache-2.0
//! Simulated host camera for headless runs.

use keyframe_camera_sequencer::{CameraHost, CameraMode, Pose, WorldRegion};

/// In-memory camera standing in for a game client
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    pose: Pose,
    mode: CameraMode,
    region: WorldRegion,
    applied: usize,
}

impl SimulatedCamera {
    /// Camera looking at the centre of a default region
    pub fn new() -> Self {
        Self {
            pose: Pose::new([6656.0, -400.0, 6656.0], 256.0, 0.0, 512),
            mode: CameraMode::Locked,
            region: WorldRegion {
                base_x: 3200,
                base_z: 3200,
                size_x: 104,
                size_z: 104,
            },
            applied: 0,
        }
    }

    /// Move the camera as an operator would before capturing
    pub fn point_at(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Number of poses applied by playback or preview
    pub fn applied_count(&self) -> usize {
        self.applied
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraHost for SimulatedCamera {
    fn current_pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: &Pose) {
        tracing::trace!(
            "camera focal=({:.1}, {:.1}, {:.1}) pitch={:.1} yaw={:.1} zoom={}",
            pose.focal_x,
            pose.focal_y,
            pose.focal_z,
            pose.pitch,
            pose.yaw,
            pose.zoom
        );
        self.pose = *pose;
        self.applied += 1;
    }

    fn camera_mode(&self) -> CameraMode {
        self.mode
    }

    fn set_camera_mode(&mut self, mode: CameraMode) {
        tracing::debug!("Camera mode -> {mode:?}");
        self.mode = mode;
    }

    fn is_logged_in(&self) -> bool {
        true
    }

    fn world_region(&self) -> WorldRegion {
        self.region
    }
}
