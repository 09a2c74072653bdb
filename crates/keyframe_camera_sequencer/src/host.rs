// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interface to the host camera.

use crate::keyframe::Pose;

/// Local units per world tile
pub const LOCAL_UNITS_PER_TILE: f64 = 128.0;

/// Host camera mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// The game controls the camera
    #[default]
    Locked,
    /// The camera pose can be set externally
    Free,
}

impl CameraMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Locked => Self::Free,
            Self::Free => Self::Locked,
        }
    }
}

/// Currently loaded world region, in tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldRegion {
    /// Tile X of the region origin
    pub base_x: i32,
    /// Tile Z of the region origin
    pub base_z: i32,
    /// Region width in tiles
    pub size_x: i32,
    /// Region depth in tiles
    pub size_z: i32,
}

impl WorldRegion {
    /// Whether a region-local tile position lies inside the loaded region
    pub fn contains_local(&self, tile_x: f64, tile_z: f64) -> bool {
        (0.0..=f64::from(self.size_x)).contains(&tile_x)
            && (0.0..=f64::from(self.size_z)).contains(&tile_z)
    }
}

/// Camera collaborator implemented by the host client
pub trait CameraHost {
    /// Read the live camera pose
    fn current_pose(&self) -> Pose;

    /// Apply a pose to the live camera
    fn set_pose(&mut self, pose: &Pose);

    /// Current camera mode
    fn camera_mode(&self) -> CameraMode;

    /// Request a camera mode
    fn set_camera_mode(&mut self, mode: CameraMode);

    /// Whether a player is logged in and a camera exists
    fn is_logged_in(&self) -> bool;

    /// The loaded world region
    fn world_region(&self) -> WorldRegion;
}
