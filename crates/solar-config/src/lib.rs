//! Configuration for the solar system viewer.
//!
//! Settings persist to disk as RON files and can be overridden from the
//! command line. Every section defaults field-by-field, so old or partial
//! config files keep loading as new settings are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, CameraConfig, Config, DebugConfig, ParticleConfig, RenderConfig, ShadowConfig,
    SimulationConfig, StarfieldConfig, WindowConfig,
};
pub use error::ConfigError;
