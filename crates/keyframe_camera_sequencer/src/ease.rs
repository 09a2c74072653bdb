// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves and keyframe interpolation.

use crate::keyframe::{normalize_yaw, EaseType, Keyframe, Pose, JAU_HALF_TURN, JAU_PER_TURN};
use std::f64::consts::PI;

/// Easing and interpolation utilities
pub struct EasingEngine;

impl EasingEngine {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Map linear progress `t` onto the curve for `ease`
    ///
    /// `t` is evaluated directly and never clamped.
    pub fn ease(ease: EaseType, t: f64) -> f64 {
        match ease {
            EaseType::Linear => t,
            EaseType::Sine => -((PI * t).cos() - 1.0) / 2.0,
            EaseType::Quad => in_out_pow(t, 2),
            EaseType::Cubic => in_out_pow(t, 3),
            EaseType::Quart => in_out_pow(t, 4),
            EaseType::Quint => in_out_pow(t, 5),
            EaseType::Expo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            EaseType::Constant => 0.0,
        }
    }

    /// Interpolate yaw along the shortest arc, result in `[0, 2048)`
    pub fn lerp_yaw(from: f64, to: f64, p: f64) -> f64 {
        let mut from = from;
        let mut to = to;
        let diff = to - from;

        if diff.abs() > JAU_HALF_TURN {
            if diff > 0.0 {
                from += JAU_PER_TURN;
            } else {
                to += JAU_PER_TURN;
            }
        }

        normalize_yaw(Self::lerp(from, to, p))
    }

    /// Interpolate the pose between `current` and `next`
    ///
    /// The curve is taken from `current`'s ease type. Without a `next`
    /// keyframe the current pose is held.
    pub fn interpolate(current: &Keyframe, next: Option<&Keyframe>, t: f64) -> Pose {
        let Some(next) = next else {
            return *current.pose();
        };

        let p = Self::ease(current.ease, t);
        let a = current.pose();
        let b = next.pose();

        Pose {
            focal_x: Self::lerp(a.focal_x, b.focal_x, p),
            focal_y: Self::lerp(a.focal_y, b.focal_y, p),
            focal_z: Self::lerp(a.focal_z, b.focal_z, p),
            pitch: Self::lerp(a.pitch, b.pitch, p),
            yaw: Self::lerp_yaw(a.yaw, b.yaw, p),
            zoom: Self::lerp(f64::from(a.zoom), f64::from(b.zoom), p).round() as i32,
        }
    }
}

/// Symmetric ease-in-out of degree `n`
fn in_out_pow(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn keyframe(focal: [f64; 3], pitch: f64, yaw: f64, zoom: i32, ease: EaseType) -> Keyframe {
        Keyframe::new(Pose::new(focal, pitch, yaw, zoom), ease)
    }

    fn assert_linear_fields(pose: &Pose, expected: &Pose) {
        assert!((pose.focal_x - expected.focal_x).abs() < EPS);
        assert!((pose.focal_y - expected.focal_y).abs() < EPS);
        assert!((pose.focal_z - expected.focal_z).abs() < EPS);
        assert!((pose.pitch - expected.pitch).abs() < EPS);
        assert_eq!(pose.zoom, expected.zoom);
    }

    #[test]
    fn test_curve_endpoints() {
        for ease in EaseType::all() {
            let start = EasingEngine::ease(*ease, 0.0);
            let end = EasingEngine::ease(*ease, 1.0);
            assert!(start.abs() < EPS, "{ease} at 0 was {start}");
            if *ease == EaseType::Constant {
                assert_eq!(end, 0.0);
            } else {
                assert!((end - 1.0).abs() < EPS, "{ease} at 1 was {end}");
            }
        }
    }

    #[test]
    fn test_curves_are_symmetric_at_midpoint() {
        for ease in EaseType::all() {
            if *ease == EaseType::Constant {
                continue;
            }
            let mid = EasingEngine::ease(*ease, 0.5);
            assert!((mid - 0.5).abs() < 1e-9, "{ease} at 0.5 was {mid}");
        }
    }

    #[test]
    fn test_known_curve_values() {
        assert!((EasingEngine::ease(EaseType::Quad, 0.25) - 0.125).abs() < EPS);
        assert!((EasingEngine::ease(EaseType::Cubic, 0.25) - 0.0625).abs() < EPS);
        assert!((EasingEngine::ease(EaseType::Quart, 0.75) - (1.0 - 0.0625 / 2.0)).abs() < EPS);
        assert!((EasingEngine::ease(EaseType::Quint, 0.25) - 16.0 * 0.25f64.powi(5)).abs() < EPS);
        assert!((EasingEngine::ease(EaseType::Sine, 0.25) - (1.0 - (PI / 4.0).cos()) / 2.0).abs() < EPS);
        assert!((EasingEngine::ease(EaseType::Expo, 0.25) - 2f64.powf(-5.0) / 2.0).abs() < EPS);
    }

    #[test]
    fn test_interpolate_endpoints() {
        for ease in EaseType::all() {
            let a = keyframe([100.0, -20.0, 3200.0], 128.0, 300.0, 400, *ease);
            let b = keyframe([260.0, 40.0, 3000.0], 383.0, 700.0, 900, EaseType::Linear);

            let at_start = EasingEngine::interpolate(&a, Some(&b), 0.0);
            assert_linear_fields(&at_start, a.pose());
            assert!((at_start.yaw - 300.0).abs() < EPS);

            let at_end = EasingEngine::interpolate(&a, Some(&b), 1.0);
            if *ease == EaseType::Constant {
                assert_linear_fields(&at_end, a.pose());
            } else {
                assert_linear_fields(&at_end, b.pose());
                assert!((at_end.yaw - 700.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_terminal_hold() {
        let a = keyframe([1.0, 2.0, 3.0], 10.0, 20.0, 30, EaseType::Sine);
        assert_eq!(EasingEngine::interpolate(&a, None, 0.7), *a.pose());
    }

    #[test]
    fn test_yaw_wraps_across_zero() {
        let a = keyframe([0.0; 3], 0.0, 2000.0, 0, EaseType::Linear);
        let b = keyframe([0.0; 3], 0.0, 100.0, 0, EaseType::Linear);
        let mid = EasingEngine::interpolate(&a, Some(&b), 0.5);
        assert!((mid.yaw - 26.0).abs() < EPS, "yaw was {}", mid.yaw);

        // And the other direction
        let back = EasingEngine::interpolate(&b, Some(&a), 0.5);
        assert!((back.yaw - 26.0).abs() < EPS, "yaw was {}", back.yaw);
    }

    #[test]
    fn test_yaw_short_path_without_wrap() {
        assert!((EasingEngine::lerp_yaw(100.0, 900.0, 0.5) - 500.0).abs() < EPS);
        assert!((EasingEngine::lerp_yaw(900.0, 100.0, 0.25) - 700.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_rounds() {
        let a = keyframe([0.0; 3], 0.0, 0.0, 100, EaseType::Linear);
        let b = keyframe([0.0; 3], 0.0, 0.0, 103, EaseType::Linear);
        assert_eq!(EasingEngine::interpolate(&a, Some(&b), 0.5).zoom, 102);
        assert_eq!(EasingEngine::interpolate(&a, Some(&b), 0.1).zoom, 100);
    }

    fn circular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(JAU_PER_TURN);
        d.min(JAU_PER_TURN - d)
    }

    proptest! {
        #[test]
        fn prop_yaw_never_jumps(from in 0.0f64..2048.0, to in 0.0f64..2048.0) {
            let steps = 100;
            let mut previous = EasingEngine::lerp_yaw(from, to, 0.0);
            let mut travelled = 0.0;
            for i in 1..=steps {
                let yaw = EasingEngine::lerp_yaw(from, to, i as f64 / steps as f64);
                let step = circular_distance(previous, yaw);
                prop_assert!(step <= JAU_HALF_TURN / steps as f64 + 1e-6);
                travelled += step;
                previous = yaw;
            }
            prop_assert!(travelled <= JAU_HALF_TURN + 1e-6);
            prop_assert!(circular_distance(previous, to) < 1e-6);
        }

        #[test]
        fn prop_curves_stay_in_unit_range(t in 0.0f64..=1.0) {
            for ease in EaseType::all() {
                let p = EasingEngine::ease(*ease, t);
                prop_assert!((-1e-12..=1.0 + 1e-12).contains(&p));
            }
        }
    }
}
