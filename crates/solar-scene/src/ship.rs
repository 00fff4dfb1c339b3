//! The spacecraft: a scripted flyby through the inner system.
//!
//! It drifts toward -Z while slowly yawing, and wraps back to the far side
//! once it leaves the scene. It moves on wall time, independent of the
//! orbit pause and speed controls.

use glam::{Mat4, Vec3};

/// Vertex color applied to every loaded ship vertex.
pub const SHIP_COLOR: Vec3 = Vec3::new(0.85, 0.9, 1.0);

const START_POSITION: Vec3 = Vec3::new(0.0, 3.0, 30.0);
const YAW_RATE: f32 = 0.2;
const DRIFT_SPEED: f32 = 5.0;
const WRAP_Z: f32 = 120.0;
const SCALE: f32 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub position: Vec3,
    /// Radians about +Y.
    pub yaw: f32,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            position: START_POSITION,
            yaw: 0.0,
        }
    }
}

impl Ship {
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.yaw += YAW_RATE * dt;
        self.position.z -= DRIFT_SPEED * dt;
        if self.position.z < -WRAP_Z {
            self.position.z = WRAP_Z;
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_scale(Vec3::splat(SCALE))
    }
}
