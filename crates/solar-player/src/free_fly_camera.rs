//! Free-fly camera: mouse look with clamped pitch, movement along the view
//! basis.

use glam::{Vec2, Vec3};
use solar_input::{Action, ActionState};

use crate::controller::CameraPose;

const PITCH_LIMIT_DEGREES: f32 = 89.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FreeFlyCamera {
    /// Degrees. -90 looks down -Z.
    pub yaw: f32,
    /// Degrees, clamped to ±89.
    pub pitch: f32,
    /// Degrees per pixel of pointer motion.
    pub mouse_sensitivity: f32,
    /// Units per second.
    pub move_speed: f32,
    pub boost_multiplier: f32,
}

impl Default for FreeFlyCamera {
    fn default() -> Self {
        Self {
            yaw: -90.0,
            pitch: 0.0,
            mouse_sensitivity: 0.1,
            move_speed: 15.0,
            boost_multiplier: 5.0,
        }
    }
}

impl FreeFlyCamera {
    /// Unit view direction for the current yaw and pitch.
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    /// Point the camera along `front` by recovering yaw and pitch from it.
    pub fn face(&mut self, front: Vec3) {
        let Some(front) = front.try_normalize() else {
            return;
        };
        self.pitch = front
            .y
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        self.yaw = front.z.atan2(front.x).to_degrees();
    }
}

/// Movement request for one frame, each axis in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlyInput {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
    pub boost: bool,
}

impl FlyInput {
    pub fn from_actions(actions: &ActionState) -> Self {
        Self {
            forward: actions.axis(Action::MoveForward, Action::MoveBack),
            right: actions.axis(Action::MoveRight, Action::MoveLeft),
            up: actions.axis(Action::MoveUp, Action::MoveDown),
            boost: actions.is_active(Action::Boost),
        }
    }
}

/// Apply pointer motion (pixels, +y down) to yaw and pitch.
pub fn free_fly_look_system(delta: Vec2, cam: &mut FreeFlyCamera, pose: &mut CameraPose) {
    if delta == Vec2::ZERO {
        return;
    }
    cam.yaw += delta.x * cam.mouse_sensitivity;
    cam.pitch = (cam.pitch - delta.y * cam.mouse_sensitivity)
        .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
    pose.front = cam.front();
}

/// Translate along front, right, and world up.
pub fn free_fly_move_system(input: FlyInput, cam: &FreeFlyCamera, pose: &mut CameraPose, dt: f32) {
    let mut speed = cam.move_speed * dt.max(0.0);
    if input.boost {
        speed *= cam.boost_multiplier;
    }
    let right = pose.front.cross(Vec3::Y).normalize_or_zero();
    pose.position += pose.front * input.forward * speed;
    pose.position += right * input.right * speed;
    pose.position += Vec3::Y * input.up * speed;
}
