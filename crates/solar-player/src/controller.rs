//! Switches between free-fly and follow modes and owns the camera pose.

use glam::{Vec2, Vec3};

use crate::follow_camera::{FollowCamera, follow_camera_system};
use crate::free_fly_camera::{FlyInput, FreeFlyCamera, free_fly_look_system, free_fly_move_system};

/// Camera position and unit view direction. Up is always +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub front: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    FreeFly,
    Follow,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    pub free_fly: FreeFlyCamera,
    pub follow: FollowCamera,
    pose: CameraPose,
    mode: CameraMode,
}

impl CameraController {
    pub fn new(position: Vec3, free_fly: FreeFlyCamera, follow: FollowCamera) -> Self {
        let front = free_fly.front();
        Self {
            free_fly,
            follow,
            pose: CameraPose { position, front },
            mode: CameraMode::FreeFly,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Change mode. Leaving follow mode keeps the current view direction.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode == CameraMode::Follow && mode == CameraMode::FreeFly {
            self.free_fly.face(self.pose.front);
        }
        self.mode = mode;
    }

    /// Turn by a pointer delta. Call once per rendered frame with all the
    /// motion gathered since the last one; ignored while following.
    pub fn look(&mut self, delta: Vec2) -> CameraPose {
        if self.mode == CameraMode::FreeFly {
            free_fly_look_system(delta, &mut self.free_fly, &mut self.pose);
        }
        self.pose
    }

    /// Advance one simulation step. In follow mode `target` is the tracked
    /// body's world position and radius; without a target the camera holds still.
    pub fn update(
        &mut self,
        input: FlyInput,
        target: Option<(Vec3, f32)>,
        elapsed: f32,
        dt: f32,
    ) -> CameraPose {
        match self.mode {
            CameraMode::FreeFly => free_fly_move_system(input, &self.free_fly, &mut self.pose, dt),
            CameraMode::Follow => {
                if let Some((position, radius)) = target {
                    follow_camera_system(&self.follow, &mut self.pose, position, radius, elapsed);
                }
            }
        }
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        CameraController::new(
            Vec3::new(0.0, 10.0, 40.0),
            FreeFlyCamera::default(),
            FollowCamera::default(),
        )
    }

    #[test]
    fn test_follow_ignores_look_and_movement() {
        let mut c = controller();
        c.set_mode(CameraMode::Follow);
        let input = FlyInput {
            forward: 1.0,
            ..Default::default()
        };
        let target = Vec3::new(26.0, 0.0, 0.0);
        c.look(Vec2::new(500.0, 0.0));
        let pose = c.update(input, Some((target, 1.0)), 0.0, 1.0);
        assert!((pose.front - (target - pose.position).normalize()).length() < 1e-5);
        assert_eq!(c.free_fly.yaw, -90.0);
    }

    #[test]
    fn test_free_fly_moves() {
        let mut c = controller();
        let input = FlyInput {
            forward: 1.0,
            ..Default::default()
        };
        let pose = c.update(input, None, 0.0, 2.0);
        assert!((pose.position - Vec3::new(0.0, 10.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_leaving_follow_keeps_direction() {
        let mut c = controller();
        c.set_mode(CameraMode::Follow);
        let pose = c.update(
            FlyInput::default(),
            Some((Vec3::new(-30.0, 0.0, 0.0), 1.0)),
            0.0,
            0.016,
        );
        c.set_mode(CameraMode::FreeFly);
        assert!((c.free_fly.front() - pose.front).length() < 1e-3);
        let after = c.update(FlyInput::default(), None, 0.0, 0.016);
        assert_eq!(after.position, pose.position);
    }

    #[test]
    fn test_follow_without_target_holds() {
        let mut c = controller();
        c.set_mode(CameraMode::Follow);
        let before = c.pose();
        assert_eq!(c.update(FlyInput::default(), None, 3.0, 0.1), before);
    }

    #[test]
    fn test_look_accumulates_every_call() {
        let mut c = controller();
        for _ in 0..30 {
            c.look(Vec2::new(10.0, 0.0));
        }
        assert!((c.free_fly.yaw - (-90.0 + 300.0 * 0.1)).abs() < 1e-3);
        assert!((c.pose().front - c.free_fly.front()).length() < 1e-6);
    }
}
