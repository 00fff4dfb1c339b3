//! Follow camera: circles slowly around a target body and eases toward
//! that moving viewpoint with first-order smoothing.

use glam::Vec3;

use crate::controller::CameraPose;

/// Radians per second of the camera's circle around the target.
const ORBIT_RATE: f32 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub struct FollowCamera {
    /// Fraction of the remaining distance covered per update.
    pub smoothing: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self { smoothing: 0.08 }
    }
}

impl FollowCamera {
    /// Viewing distance for a target of `radius`.
    pub fn distance_for(radius: f32) -> f32 {
        (radius * 18.0 + 20.0).max(15.0)
    }

    /// Where the camera wants to be at time `elapsed`.
    pub fn desired_position(target: Vec3, radius: f32, elapsed: f32) -> Vec3 {
        let d = Self::distance_for(radius);
        let (s, c) = (elapsed * ORBIT_RATE).sin_cos();
        target + Vec3::new(c * d * 1.2, d * 0.35, s * d * 1.2)
    }
}

/// Ease `pose` toward the viewpoint around `target` and look at it.
pub fn follow_camera_system(
    cam: &FollowCamera,
    pose: &mut CameraPose,
    target: Vec3,
    target_radius: f32,
    elapsed: f32,
) {
    let desired = FollowCamera::desired_position(target, target_radius, elapsed);
    pose.position = pose.position.lerp(desired, cam.smoothing.clamp(0.0, 1.0));
    if let Some(front) = (target - pose.position).try_normalize() {
        pose.front = front;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> CameraPose {
        CameraPose {
            position: Vec3::new(0.0, 10.0, 40.0),
            front: Vec3::NEG_Z,
        }
    }

    #[test]
    fn test_distance_floor() {
        assert_eq!(FollowCamera::distance_for(1.0), 38.0);
        assert_eq!(FollowCamera::distance_for(0.0), 20.0);
        assert_eq!(FollowCamera::distance_for(-1.0), 15.0);
    }

    #[test]
    fn test_desired_offset_at_time_zero() {
        let p = FollowCamera::desired_position(Vec3::new(26.0, 0.0, 0.0), 1.0, 0.0);
        assert!((p - Vec3::new(26.0 + 45.6, 13.3, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_step_moves_eight_percent() {
        let cam = FollowCamera::default();
        let mut pose = start();
        let target = Vec3::new(26.0, 0.0, 0.0);
        let desired = FollowCamera::desired_position(target, 1.0, 0.0);
        let before = pose.position.distance(desired);
        follow_camera_system(&cam, &mut pose, target, 1.0, 0.0);
        let after = pose.position.distance(desired);
        assert!((after / before - 0.92).abs() < 1e-4);
    }

    #[test]
    fn test_always_looks_at_target() {
        let cam = FollowCamera::default();
        let mut pose = start();
        let target = Vec3::new(-50.0, 0.0, 12.0);
        for i in 0..50 {
            follow_camera_system(&cam, &mut pose, target, 2.5, i as f32 * 0.1);
            let expected = (target - pose.position).normalize();
            assert!((pose.front - expected).length() < 1e-5);
        }
    }

    #[test]
    fn test_converges_on_static_viewpoint() {
        let cam = FollowCamera::default();
        let mut pose = start();
        let target = Vec3::new(110.0, 0.0, 0.0);
        for _ in 0..300 {
            follow_camera_system(&cam, &mut pose, target, 1.2, 0.0);
        }
        let desired = FollowCamera::desired_position(target, 1.2, 0.0);
        assert!(pose.position.distance(desired) < 1e-2);
    }
}
