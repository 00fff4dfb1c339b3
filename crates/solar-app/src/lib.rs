//! Application shell for the solar system viewer.
//!
//! Owns the window and event loop, drives the fixed-timestep simulation,
//! and records each frame through [`renderer::SceneRenderer`].

pub mod controls;
pub mod error;
pub mod game_loop;
pub mod renderer;
pub mod settings;
pub mod window;

pub use error::AppError;
pub use solar_input::InputMap;
pub use window::run;
