//! Builds the runtime objects each crate owns from the loaded [`Config`].

use glam::Vec3;
use solar_config::Config;
use solar_lighting::ShadowSettings;
use solar_player::{CameraController, CameraMode, FollowCamera, FreeFlyCamera};
use solar_render::Camera;
use solar_scene::{SimulationLimits, SimulationState};
use solar_space::ShootingStarConfig;

pub fn shadow_settings(config: &Config) -> ShadowSettings {
    let s = &config.shadow;
    ShadowSettings {
        enabled: s.enabled,
        resolution: s.resolution.max(1),
        light_distance: s.light_distance,
        ortho_half_extent: s.ortho_half_extent,
        near: s.near,
        far: s.far,
        bias_slope: s.bias_slope,
        bias_min: s.bias_min,
    }
}

pub fn shooting_star_config(config: &Config) -> ShootingStarConfig {
    let p = &config.particles;
    ShootingStarConfig {
        capacity: p.capacity,
        speed: p.speed,
        tail_length: p.tail_length,
        spawn_extent: p.spawn_extent,
        min_lifetime: p.min_lifetime,
        max_lifetime: p.max_lifetime,
        prefill: p.prefill,
        seed: p.seed,
    }
}

/// Initial simulation state; the default target is clamped to `planet_count`.
pub fn simulation_state(config: &Config, planet_count: usize) -> SimulationState {
    let s = &config.simulation;
    let mut state = SimulationState::new(
        s.speed_multiplier,
        SimulationLimits {
            min_speed_multiplier: s.min_speed_multiplier,
            max_speed_multiplier: s.max_speed_multiplier,
            speed_change_rate: s.speed_change_rate,
        },
    );
    state.paused = s.start_paused;
    state.follow = s.start_in_follow_mode;
    state.set_target(s.default_target, planet_count);
    state
}

pub fn camera_controller(config: &Config) -> CameraController {
    let c = &config.camera;
    let free_fly = FreeFlyCamera {
        yaw: c.start_yaw_degrees,
        pitch: c.start_pitch_degrees.clamp(-89.0, 89.0),
        mouse_sensitivity: c.mouse_sensitivity,
        move_speed: c.move_speed,
        boost_multiplier: c.boost_multiplier,
    };
    let follow = FollowCamera {
        smoothing: c.follow_smoothing,
    };
    let mut controller =
        CameraController::new(Vec3::from_array(c.start_position), free_fly, follow);
    if config.simulation.start_in_follow_mode {
        controller.set_mode(CameraMode::Follow);
    }
    controller
}

/// Perspective camera for a surface of `width` × `height` pixels.
pub fn projection_camera(config: &Config, width: u32, height: u32) -> Camera {
    let c = &config.camera;
    let near = c.near.max(1e-4);
    let far = c.far.max(near * 2.0);
    let mut camera = Camera::perspective(c.fov_y_degrees, 1.0, near, far);
    camera.set_aspect_ratio(width as f32, height as f32);
    camera
}

pub fn clear_color(config: &Config) -> wgpu::Color {
    let [r, g, b] = config.render.clear_color;
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}
