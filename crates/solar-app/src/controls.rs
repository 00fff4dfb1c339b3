//! Maps resolved input actions onto the simulation and camera.

use solar_input::{Action, ActionState};
use solar_player::{CameraController, CameraMode};
use solar_scene::SimulationState;
use tracing::{debug, info};

/// Requests for the window layer produced by one frame of input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowRequests {
    pub quit: bool,
    pub toggle_fullscreen: bool,
}

/// Apply the frame's key presses: pause/resume, follow mode, target
/// selection, fullscreen, and quit.
pub fn apply_frame_actions(
    actions: &ActionState,
    sim: &mut SimulationState,
    camera: &mut CameraController,
    planet_count: usize,
) -> WindowRequests {
    if actions.is_active(Action::Pause) && !sim.paused {
        sim.pause();
        info!("Simulation paused");
    }
    if actions.is_active(Action::Resume) && sim.paused {
        sim.resume();
        info!("Simulation resumed");
    }

    if actions.is_active(Action::FollowOn) {
        sim.follow = true;
    }
    if actions.is_active(Action::FollowOff) {
        sim.follow = false;
    }
    for action in Action::TARGETS {
        if actions.just_activated(action)
            && let Some(index) = action.target_index()
        {
            sim.select_target(index, planet_count);
            debug!("Follow target {}", sim.target());
        }
    }

    let mode = if sim.follow {
        CameraMode::Follow
    } else {
        CameraMode::FreeFly
    };
    if camera.mode() != mode {
        camera.set_mode(mode);
        debug!("Camera mode {mode:?}");
    }

    WindowRequests {
        quit: actions.just_activated(Action::Quit),
        toggle_fullscreen: actions.just_activated(Action::ToggleFullscreen),
    }
}

/// Held speed keys, applied once per simulation step.
pub fn apply_held_actions(actions: &ActionState, sim: &mut SimulationState, dt: f32) {
    let direction = actions.axis(Action::SpeedUp, Action::SpeedDown);
    if direction != 0.0 {
        sim.change_speed(direction, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_input::{ActionResolver, InputMap, KeyboardState, RawKeyEvent};
    use solar_player::{FollowCamera, FreeFlyCamera};
    use solar_scene::SimulationLimits;
    use winit::event::ElementState;
    use winit::keyboard::{KeyCode, PhysicalKey};

    fn press(codes: &[KeyCode]) -> ActionState {
        let mut keyboard = KeyboardState::new();
        for &code in codes {
            keyboard.process_raw(RawKeyEvent {
                key: PhysicalKey::Code(code),
                state: ElementState::Pressed,
                repeat: false,
            });
        }
        let mut actions = ActionState::new();
        ActionResolver::resolve(&InputMap::default(), &keyboard, &mut actions);
        actions
    }

    fn setup() -> (SimulationState, CameraController) {
        (
            SimulationState::new(1.0, SimulationLimits::default()),
            CameraController::new(
                glam::Vec3::new(0.0, 10.0, 40.0),
                FreeFlyCamera::default(),
                FollowCamera::default(),
            ),
        )
    }

    #[test]
    fn test_pause_then_resume() {
        let (mut sim, mut camera) = setup();
        apply_frame_actions(&press(&[KeyCode::KeyP]), &mut sim, &mut camera, 8);
        assert!(sim.paused);
        apply_frame_actions(&press(&[KeyCode::KeyO]), &mut sim, &mut camera, 8);
        assert!(!sim.paused);
    }

    #[test]
    fn test_digit_selects_target_and_follows() {
        let (mut sim, mut camera) = setup();
        apply_frame_actions(&press(&[KeyCode::Digit5]), &mut sim, &mut camera, 8);
        assert_eq!(sim.target(), 4);
        assert!(sim.follow);
        assert_eq!(camera.mode(), CameraMode::Follow);

        apply_frame_actions(&press(&[KeyCode::KeyG]), &mut sim, &mut camera, 8);
        assert!(!sim.follow);
        assert_eq!(camera.mode(), CameraMode::FreeFly);
    }

    #[test]
    fn test_target_clamps_to_planet_count() {
        let (mut sim, mut camera) = setup();
        apply_frame_actions(&press(&[KeyCode::Digit8]), &mut sim, &mut camera, 3);
        assert_eq!(sim.target(), 2);
    }

    #[test]
    fn test_window_requests() {
        let (mut sim, mut camera) = setup();
        let requests = apply_frame_actions(
            &press(&[KeyCode::Escape, KeyCode::F11]),
            &mut sim,
            &mut camera,
            8,
        );
        assert_eq!(
            requests,
            WindowRequests {
                quit: true,
                toggle_fullscreen: true
            }
        );
        assert_eq!(
            apply_frame_actions(&ActionState::new(), &mut sim, &mut camera, 8),
            WindowRequests::default()
        );
    }

    #[test]
    fn test_held_speed_keys_scale_with_dt() {
        let (mut sim, _) = setup();
        apply_held_actions(&press(&[KeyCode::Equal]), &mut sim, 0.5);
        assert!((sim.speed_multiplier() - 2.0).abs() < 1e-6);
        apply_held_actions(&press(&[KeyCode::Minus]), &mut sim, 10.0);
        assert!((sim.speed_multiplier() - 0.01).abs() < 1e-6);
        apply_held_actions(&press(&[KeyCode::Minus, KeyCode::Equal]), &mut sim, 1.0);
        assert!((sim.speed_multiplier() - 0.01).abs() < 1e-6);
    }
}
