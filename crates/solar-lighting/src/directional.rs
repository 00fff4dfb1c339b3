//! The one light in the scene: infinitely distant, circling slowly overhead.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Radians per second of elapsed time.
pub const LIGHT_ORBIT_RATE: f32 = 0.3;

/// Direction the rays travel at time `t`:
/// `normalize(sin(0.3t), 0.75, cos(0.3t))`.
pub fn orbiting_light_direction(t: f32) -> Vec3 {
    let (sin, cos) = (t * LIGHT_ORBIT_RATE).sin_cos();
    Vec3::new(sin, 0.75, cos).normalize()
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector pointing from the light into the scene. Shaders negate it
    /// to get the surface-to-light vector.
    pub direction: Vec3,
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: orbiting_light_direction(0.0),
            color: Vec3::new(1.0, 1.0, 0.9),
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    /// Advance along the orbit to elapsed time `t`. Runs while orbits are
    /// paused.
    pub fn update(&mut self, t: f32) {
        self.direction = orbiting_light_direction(t);
    }

    pub fn to_uniform(&self) -> DirectionalLightUniform {
        DirectionalLightUniform {
            direction_intensity: self.direction.extend(self.intensity).to_array(),
            color_padding: self.color.extend(0.0).to_array(),
        }
    }
}

/// `@group(0) @binding(1)`, beside the camera.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// xyz = direction, w = intensity.
    pub direction_intensity: [f32; 4],
    /// xyz = color, w unused.
    pub color_padding: [f32; 4],
}
