//! Window, event handling, and the frame loop.
//!
//! [`App`] owns the simulation and the GPU state. Each redraw resolves input
//! into actions, runs the fixed-rate simulation steps, updates the camera,
//! and hands a [`FrameScene`] to the [`SceneRenderer`].

use std::sync::Arc;

use glam::{Vec2, Vec3};
use solar_assets::{MeshData, load_ship_or_fallback};
use solar_config::Config;
use solar_input::{ActionResolver, ActionState, InputMap, KeyboardState, MouseState};
use solar_player::{CameraController, FlyInput};
use solar_render::{Camera, RenderContext, SurfaceError, init_render_context_blocking};
use solar_scene::{SHIP_COLOR, Ship, SimulationState, SolarSystem};
use solar_space::{ParticleField, StarPoint, StarfieldGenerator};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::controls::{self, WindowRequests};
use crate::error::AppError;
use crate::game_loop::GameLoop;
use crate::renderer::{FrameScene, SceneRenderer};
use crate::settings;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(
            config.window.width.max(1) as f64,
            config.window.height.max(1) as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

pub struct App {
    config: Config,
    input_map: InputMap,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    game_loop: GameLoop,
    keyboard: KeyboardState,
    mouse: MouseState,
    actions: ActionState,
    system: SolarSystem,
    sim: SimulationState,
    camera_controller: CameraController,
    camera: Camera,
    ship: Ship,
    ship_mesh: MeshData,
    particles: ParticleField,
    /// Handed to the renderer on first resume, then dropped.
    stars: Vec<StarPoint>,
    error: Option<AppError>,
}

impl App {
    /// Build the simulation and load CPU-side assets. GPU work waits for
    /// the first `resumed`.
    pub fn new(config: Config, input_map: InputMap) -> Self {
        let system = SolarSystem::standard();
        let sim = settings::simulation_state(&config, system.planet_count());
        let camera_controller = settings::camera_controller(&config);
        let camera =
            settings::projection_camera(&config, config.window.width, config.window.height);
        let ship_mesh = load_ship_or_fallback(&config.assets.ship_model_path(), SHIP_COLOR);
        let particles = ParticleField::new(settings::shooting_star_config(&config));
        let stars = StarfieldGenerator::new(
            config.starfield.seed,
            config.starfield.count,
            config.starfield.radius,
        )
        .generate();

        for conflict in input_map.conflicts() {
            warn!("Key {:?} is bound to several actions: {:?}", conflict.0, conflict.1);
        }

        Self {
            config,
            input_map,
            window: None,
            gpu: None,
            renderer: None,
            game_loop: GameLoop::new(),
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            actions: ActionState::new(),
            system,
            sim,
            camera_controller,
            camera,
            ship: Ship::default(),
            ship_mesh,
            particles,
            stars,
            error: None,
        }
    }

    /// Record a fatal error and stop the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let gpu = init_render_context_blocking(Arc::clone(&window), self.config.window.vsync)?;
        let renderer = SceneRenderer::new(
            &gpu,
            &self.config,
            &self.system,
            &self.ship_mesh,
            &self.stars,
        )?;
        self.stars = Vec::new();

        let (width, height) = gpu.size();
        self.camera.set_aspect_ratio(width as f32, height as f32);
        info!(
            "Window {}x{}, shadows {}",
            width,
            height,
            if renderer.shadows_enabled() { "on" } else { "off" }
        );

        self.mouse.set_captured(&window, true);
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.window = Some(window);
        // Startup time should not count as a frame.
        self.game_loop = GameLoop::new();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }
        self.camera.set_aspect_ratio(width as f32, height as f32);
        info!("Resized to {width}x{height}");
    }

    fn toggle_fullscreen(&self) {
        let Some(window) = &self.window else {
            return;
        };
        if window.fullscreen().is_some() {
            window.set_fullscreen(None);
            info!("Windowed");
        } else {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            info!("Fullscreen");
        }
    }

    /// Apply this frame's pointer motion, then run the fixed steps due for
    /// `frame_time` seconds. Look is applied even when no step is due.
    fn simulate(&mut self, frame_time: f64, look_delta: Vec2) {
        self.camera_controller.look(look_delta);

        let fly = FlyInput::from_actions(&self.actions);
        let actions = &self.actions;
        let sim = &mut self.sim;
        let system = &mut self.system;
        let ship = &mut self.ship;
        let particles = &mut self.particles;
        let camera_controller = &mut self.camera_controller;
        self.game_loop.advance(frame_time, |dt, _sim_time| {
            let dt = dt as f32;
            controls::apply_held_actions(actions, sim, dt);
            sim.tick(dt);
            system.advance(dt, sim);
            ship.update(dt);
            particles.update(dt);
            let target = if sim.follow {
                system.planet_position(sim.target())
            } else {
                None
            };
            camera_controller.update(fly, target, sim.elapsed, dt);
        });
    }

    /// Input, simulation steps, then one rendered frame.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        ActionResolver::resolve(&self.input_map, &self.keyboard, &mut self.actions);
        let requests: WindowRequests = controls::apply_frame_actions(
            &self.actions,
            &mut self.sim,
            &mut self.camera_controller,
            self.system.planet_count(),
        );
        if requests.quit {
            info!("Quit requested");
            event_loop.exit();
            return;
        }
        if requests.toggle_fullscreen {
            self.toggle_fullscreen();
        }

        let frame_time = self.game_loop.begin_frame();
        self.simulate(frame_time, self.mouse.delta());

        let pose = self.camera_controller.pose();
        self.camera.position = pose.position;
        self.camera.look_to(pose.front, Vec3::Y);

        if let (Some(gpu), Some(renderer)) = (&mut self.gpu, &mut self.renderer) {
            let scene = FrameScene {
                camera: &self.camera,
                system: &self.system,
                ship_world: self.ship.world_matrix(),
                particles: &self.particles,
                elapsed: self.sim.elapsed,
            };
            match renderer.render(gpu, &scene) {
                Ok(()) => {}
                Err(SurfaceError::Lost) => {
                    let (width, height) = gpu.size();
                    gpu.resize(width, height);
                }
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory");
                    event_loop.exit();
                }
                Err(SurfaceError::Timeout) => {
                    warn!("Surface timeout, skipping frame");
                }
            }
        }

        self.keyboard.clear_transients();
        self.mouse.clear_transients();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(focused) => {
                if let Some(window) = &self.window {
                    self.mouse.set_captured(window, focused);
                }
                if !focused {
                    self.keyboard.release_all();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.keyboard.process_event(&event),
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse.on_raw_motion(delta.0, delta.1);
        }
    }
}

/// Open the window and run until it closes or a fatal error occurs. A
/// config that fails validation is refused before any window opens.
#[instrument(skip_all)]
pub fn run(config: Config, input_map: InputMap) -> Result<(), AppError> {
    config.validate()?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(config, input_map);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_player::CameraMode;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.starfield.count = 100;
        config.assets.root = std::path::PathBuf::from("/nonexistent-solar-assets");
        config
    }

    #[test]
    fn test_app_starts_without_gpu() {
        let app = App::new(small_config(), InputMap::default());
        assert!(app.window.is_none());
        assert!(app.gpu.is_none());
        assert!(app.renderer.is_none());
        assert_eq!(app.stars.len(), 100);
    }

    #[test]
    fn test_missing_ship_model_uses_fallback() {
        let app = App::new(small_config(), InputMap::default());
        assert_eq!(app.ship_mesh, solar_assets::fallback_ship());
    }

    #[test]
    fn test_initial_simulation_from_config() {
        let mut config = small_config();
        config.simulation.start_in_follow_mode = true;
        config.simulation.default_target = 5;
        let app = App::new(config, InputMap::default());
        assert!(app.sim.follow);
        assert_eq!(app.sim.target(), 5);
        assert_eq!(app.camera_controller.mode(), CameraMode::Follow);
        assert_eq!(app.particles.len(), app.particles.capacity());
    }

    #[test]
    fn test_pointer_motion_survives_frames_without_steps() {
        let mut app = App::new(small_config(), InputMap::default());
        // 144 Hz: most frames run no 60 Hz step.
        for _ in 0..144 {
            app.simulate(1.0 / 144.0, Vec2::new(10.0, 0.0));
        }
        let yaw = app.camera_controller.free_fly.yaw;
        assert!((yaw - (-90.0 + 1440.0 * 0.1)).abs() < 1e-3, "yaw {yaw}");
        assert!(app.game_loop.update_count() < 144);
    }

    #[test]
    fn test_run_refuses_invalid_config() {
        let mut config = small_config();
        config.particles.max_lifetime = f32::NAN;
        let result = run(config, InputMap::default());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_window_attributes_do_not_panic() {
        let mut config = Config::default();
        config.window.width = 0;
        config.window.fullscreen = true;
        let _attrs = window_attributes_from_config(&config);
    }
}
