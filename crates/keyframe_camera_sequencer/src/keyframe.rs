// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the camera sequencer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Native angular units in one full turn
pub const JAU_PER_TURN: f64 = 2048.0;

/// Half a turn in native angular units
pub const JAU_HALF_TURN: f64 = JAU_PER_TURN / 2.0;

/// Convert radians to native angular units
pub fn radians_to_jau(radians: f64) -> f64 {
    radians * JAU_PER_TURN / std::f64::consts::TAU
}

/// Convert native angular units to radians
pub fn jau_to_radians(jau: f64) -> f64 {
    jau * std::f64::consts::TAU / JAU_PER_TURN
}

/// Reduce a yaw to `[0, 2048)`
pub fn normalize_yaw(yaw: f64) -> f64 {
    let wrapped = yaw.rem_euclid(JAU_PER_TURN);
    // rem_euclid can round up to exactly one turn for tiny negative inputs
    if wrapped >= JAU_PER_TURN {
        0.0
    } else {
        wrapped
    }
}

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for KeyframeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Easing curve used for the transition leaving a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EaseType {
    /// Constant velocity
    Linear,
    /// Sinusoidal ease-in-out
    #[default]
    Sine,
    /// Quadratic ease-in-out
    Quad,
    /// Cubic ease-in-out
    Cubic,
    /// Quartic ease-in-out
    Quart,
    /// Quintic ease-in-out
    Quint,
    /// Exponential ease-in-out
    Expo,
    /// Hold the starting pose, then cut
    Constant,
}

impl EaseType {
    /// Persisted name of this ease type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Sine => "SINE",
            Self::Quad => "QUAD",
            Self::Cubic => "CUBIC",
            Self::Quart => "QUART",
            Self::Quint => "QUINT",
            Self::Expo => "EXPO",
            Self::Constant => "CONSTANT",
        }
    }

    /// All ease types, in display order
    pub fn all() -> &'static [EaseType] {
        &[
            EaseType::Linear,
            EaseType::Sine,
            EaseType::Quad,
            EaseType::Cubic,
            EaseType::Quart,
            EaseType::Quint,
            EaseType::Expo,
            EaseType::Constant,
        ]
    }
}

impl fmt::Display for EaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an ease type name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ease type: {0:?}")]
pub struct UnknownEaseType(pub String);

impl FromStr for EaseType {
    type Err = UnknownEaseType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|ease| ease.name() == s)
            .ok_or_else(|| UnknownEaseType(s.to_string()))
    }
}

/// A camera pose as exchanged with the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Focal point X (world units)
    pub focal_x: f64,
    /// Focal point Y (world units)
    pub focal_y: f64,
    /// Focal point Z (world units)
    pub focal_z: f64,
    /// Pitch in native angular units
    pub pitch: f64,
    /// Yaw in native angular units
    pub yaw: f64,
    /// Zoom level
    pub zoom: i32,
}

impl Pose {
    /// Create a pose
    pub fn new(focal: [f64; 3], pitch: f64, yaw: f64, zoom: i32) -> Self {
        Self {
            focal_x: focal[0],
            focal_y: focal[1],
            focal_z: focal[2],
            pitch,
            yaw,
            zoom,
        }
    }
}

/// A keyframe in a camera sequence
///
/// Durations are not stored here; the owning sequence derives them from
/// its timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    id: KeyframeId,
    pose: Pose,
    /// Easing used for the transition to the next keyframe
    pub ease: EaseType,
}

impl Keyframe {
    /// Create a new keyframe with a fresh identity
    pub fn new(pose: Pose, ease: EaseType) -> Self {
        Self {
            id: KeyframeId::new(),
            pose: Self::normalized(pose),
            ease,
        }
    }

    /// Copy this keyframe's pose and ease under a new identity
    pub fn duplicate(&self) -> Self {
        Self::new(self.pose, self.ease)
    }

    /// Unique keyframe ID
    pub fn id(&self) -> KeyframeId {
        self.id
    }

    /// Captured pose
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Replace the pose, keeping identity and ease
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = Self::normalized(pose);
    }

    fn normalized(mut pose: Pose) -> Pose {
        pose.yaw = normalize_yaw(pose.yaw);
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_names_round_trip() {
        for ease in EaseType::all() {
            assert_eq!(ease.name().parse::<EaseType>(), Ok(*ease));
        }
        assert_eq!(
            "BOUNCE".parse::<EaseType>(),
            Err(UnknownEaseType("BOUNCE".to_string()))
        );
        assert!("sine".parse::<EaseType>().is_err());
    }

    #[test]
    fn test_yaw_is_normalized() {
        let kf = Keyframe::new(Pose::new([0.0; 3], 0.0, 2100.0, 0), EaseType::Linear);
        assert_eq!(kf.pose().yaw, 52.0);

        let kf = Keyframe::new(Pose::new([0.0; 3], 0.0, -48.0, 0), EaseType::Linear);
        assert_eq!(kf.pose().yaw, 2000.0);
    }

    #[test]
    fn test_duplicate_has_new_identity() {
        let kf = Keyframe::new(Pose::new([1.0, 2.0, 3.0], 128.0, 512.0, 400), EaseType::Cubic);
        let copy = kf.duplicate();
        assert_ne!(kf.id(), copy.id());
        assert_eq!(kf.pose(), copy.pose());
        assert_eq!(kf.ease, copy.ease);
    }

    #[test]
    fn test_angle_conversion() {
        assert!((radians_to_jau(std::f64::consts::PI) - 1024.0).abs() < 1e-9);
        assert!((jau_to_radians(512.0) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
