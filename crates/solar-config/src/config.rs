//! Configuration structs with sensible defaults and RON persistence.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera projection and controller settings.
    pub camera: CameraConfig,
    /// Orbit simulation settings.
    pub simulation: SimulationConfig,
    /// Background starfield settings.
    pub starfield: StarfieldConfig,
    /// Shooting-star particle settings.
    pub particles: ParticleConfig,
    /// Shadow map settings.
    pub shadow: ShadowConfig,
    /// Main pass rendering settings.
    pub render: RenderConfig,
    /// Asset locations.
    pub assets: AssetConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Degrees of yaw/pitch per pixel of pointer motion.
    pub mouse_sensitivity: f32,
    /// Free-fly speed in world units per second.
    pub move_speed: f32,
    /// Speed multiplier while the boost key is held.
    pub boost_multiplier: f32,
    /// Per-frame interpolation factor toward the follow target.
    pub follow_smoothing: f32,
    /// Initial camera position.
    pub start_position: [f32; 3],
    /// Initial yaw in degrees (-90 looks down -Z).
    pub start_yaw_degrees: f32,
    /// Initial pitch in degrees.
    pub start_pitch_degrees: f32,
}

/// Orbit simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Initial global speed multiplier.
    pub speed_multiplier: f32,
    /// Lower bound for the speed multiplier.
    pub min_speed_multiplier: f32,
    /// Upper bound for the speed multiplier.
    pub max_speed_multiplier: f32,
    /// Change in the multiplier per second while a speed key is held.
    pub speed_change_rate: f32,
    /// Start with the orbits frozen.
    pub start_paused: bool,
    /// Planet index the follow camera tracks first.
    pub default_target: usize,
    /// Start in follow mode instead of free-fly.
    pub start_in_follow_mode: bool,
}

/// Starfield configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Number of stars.
    pub count: u32,
    /// Radius of the star sphere.
    pub radius: f32,
    /// RNG seed for star placement.
    pub seed: u64,
}

/// Shooting-star configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    /// Maximum number of live shooting stars.
    pub capacity: usize,
    /// Base speed in world units per second.
    pub speed: f32,
    /// Length of the trailing segment.
    pub tail_length: f32,
    /// Half-size of the cube new stars spawn in.
    pub spawn_extent: f32,
    /// Shortest lifetime in seconds.
    pub min_lifetime: f32,
    /// Longest lifetime in seconds.
    pub max_lifetime: f32,
    /// Fill the pool to capacity at startup.
    pub prefill: bool,
    /// RNG seed.
    pub seed: u64,
}

/// Shadow map configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    /// Render the depth pass and sample it in the lit pass.
    pub enabled: bool,
    /// Shadow map width and height in texels.
    pub resolution: u32,
    /// Distance of the light eye from the origin.
    pub light_distance: f32,
    /// Half extent of the orthographic light frustum.
    pub ortho_half_extent: f32,
    /// Light frustum near plane.
    pub near: f32,
    /// Light frustum far plane.
    pub far: f32,
    /// Slope-scaled depth bias.
    pub bias_slope: f32,
    /// Minimum depth bias.
    pub bias_min: f32,
}

/// Main pass rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Background clear color.
    pub clear_color: [f32; 3],
    /// Blend factor from texture color toward vertex color for textured bodies.
    pub vertex_color_mix: f32,
    /// Sphere longitude segments.
    pub sphere_segments: u32,
    /// Sphere latitude rings.
    pub sphere_rings: u32,
}

/// Asset locations, relative to `root`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Root directory for all assets.
    pub root: PathBuf,
    /// Texture directory under the root.
    pub texture_dir: PathBuf,
    /// Spacecraft OBJ file under the root.
    pub ship_model: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fullscreen: false,
            vsync: true,
            title: "Solar System".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 5000.0,
            mouse_sensitivity: 0.1,
            move_speed: 15.0,
            boost_multiplier: 5.0,
            follow_smoothing: 0.08,
            start_position: [0.0, 10.0, 40.0],
            start_yaw_degrees: -90.0,
            start_pitch_degrees: 0.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            min_speed_multiplier: 0.01,
            max_speed_multiplier: 5.0,
            speed_change_rate: 2.0,
            start_paused: false,
            default_target: 2,
            start_in_follow_mode: false,
        }
    }
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 50_000,
            radius: 4000.0,
            seed: 0x5EED_57A2,
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            speed: 50.0,
            tail_length: 5.0,
            spawn_extent: 100.0,
            min_lifetime: 2.0,
            max_lifetime: 5.0,
            prefill: true,
            seed: 0xC0FF_EE00,
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resolution: 2048,
            light_distance: 160.0,
            ortho_half_extent: 150.0,
            near: 1.0,
            far: 400.0,
            bias_slope: 0.0008,
            bias_min: 0.0004,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.05],
            vertex_color_mix: 0.0,
            sphere_segments: 30,
            sphere_rings: 20,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            texture_dir: PathBuf::from("textures"),
            ship_model: PathBuf::from("models/spacecraft.obj"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AssetConfig {
    /// Absolute-or-relative path of a texture file by name.
    pub fn texture_path(&self, file_name: &str) -> PathBuf {
        self.root.join(&self.texture_dir).join(file_name)
    }

    /// Path of the spacecraft model.
    pub fn ship_model_path(&self) -> PathBuf {
        self.root.join(&self.ship_model)
    }
}

/// Read and parse `config.ron` at `path`.
fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Load and validate `config.ron` from `config_dir`, writing the
    /// defaults there first if it does not exist.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }
        let config = read_config(&path)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_error = |source| ConfigError::WriteError {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;
        std::fs::write(&path, text).map_err(write_error)
    }


    /// Reject values the simulation cannot run with: non-finite numbers,
    /// negative extents and speeds, and inverted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.camera;
        finite_positive("camera.near", c.near)?;
        greater("camera.far", c.far, "camera.near", c.near)?;
        within("camera.fov_y_degrees", c.fov_y_degrees, 1.0..=179.0)?;
        finite_non_negative("camera.mouse_sensitivity", c.mouse_sensitivity)?;
        finite_non_negative("camera.move_speed", c.move_speed)?;
        finite_non_negative("camera.boost_multiplier", c.boost_multiplier)?;
        within("camera.follow_smoothing", c.follow_smoothing, 0.0..=1.0)?;

        let s = &self.simulation;
        finite_positive("simulation.min_speed_multiplier", s.min_speed_multiplier)?;
        not_less(
            "simulation.max_speed_multiplier",
            s.max_speed_multiplier,
            "simulation.min_speed_multiplier",
            s.min_speed_multiplier,
        )?;
        finite_non_negative("simulation.speed_multiplier", s.speed_multiplier)?;
        finite_non_negative("simulation.speed_change_rate", s.speed_change_rate)?;

        finite_positive("starfield.radius", self.starfield.radius)?;

        let p = &self.particles;
        finite_non_negative("particles.speed", p.speed)?;
        finite_non_negative("particles.tail_length", p.tail_length)?;
        finite_non_negative("particles.spawn_extent", p.spawn_extent)?;
        finite_non_negative("particles.min_lifetime", p.min_lifetime)?;
        finite_positive("particles.max_lifetime", p.max_lifetime)?;
        not_less("particles.max_lifetime", p.max_lifetime, "particles.min_lifetime", p.min_lifetime)?;

        let sh = &self.shadow;
        finite_positive("shadow.near", sh.near)?;
        greater("shadow.far", sh.far, "shadow.near", sh.near)?;
        finite_positive("shadow.light_distance", sh.light_distance)?;
        finite_positive("shadow.ortho_half_extent", sh.ortho_half_extent)?;
        finite_non_negative("shadow.bias_slope", sh.bias_slope)?;
        finite_non_negative("shadow.bias_min", sh.bias_min)?;

        within("render.vertex_color_mix", self.render.vertex_color_mix, 0.0..=1.0)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn finite_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a finite number >= 0, got {value}")))
    }
}

fn finite_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a finite number > 0, got {value}")))
    }
}

fn within(field: &'static str, value: f32, range: RangeInclusive<f32>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must lie in {range:?}, got {value}")))
    }
}

fn not_less(
    field: &'static str,
    value: f32,
    other: &'static str,
    bound: f32,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= bound {
        Ok(())
    } else {
        Err(invalid(field, format!("must be at least {other} ({bound}), got {value}")))
    }
}

fn greater(field: &'static str, value: f32, other: &'static str, bound: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > bound {
        Ok(())
    } else {
        Err(invalid(field, format!("must exceed {other} ({bound}), got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1920"));
        assert!(ron_str.contains("resolution: 2048"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), camera: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.shadow, ShadowConfig::default());
        assert_eq!(config.particles, ParticleConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(particles: (capacity: 8))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.particles.capacity, 8);
        assert_eq!(config.particles.speed, 50.0);
        assert!(config.particles.prefill);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 800;
        config.simulation.start_paused = true;
        config.starfield.seed = 7;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        std::fs::create_dir(dir.path().join(CONFIG_FILE)).unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_lifetime_range_is_rejected() {
        let mut config = Config::default();
        config.particles.min_lifetime = 5.0;
        config.particles.max_lifetime = 2.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "particles.max_lifetime", .. }));
    }

    #[test]
    fn test_nan_and_negative_values_are_rejected() {
        let mut config = Config::default();
        config.particles.min_lifetime = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "particles.min_lifetime", .. })
        ));

        let mut config = Config::default();
        config.particles.spawn_extent = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.min_speed_multiplier = 3.0;
        config.simulation.max_speed_multiplier = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "(particles: (min_lifetime: 4.0, max_lifetime: 1.0))",
        )
        .unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(err.to_string().contains("particles.max_lifetime"));
    }

    #[test]
    fn test_asset_paths_join_root() {
        let assets = AssetConfig {
            root: PathBuf::from("data"),
            ..Default::default()
        };
        assert_eq!(
            assets.texture_path("earth.jpg"),
            PathBuf::from("data/textures/earth.jpg")
        );
        assert_eq!(
            assets.ship_model_path(),
            PathBuf::from("data/models/spacecraft.obj")
        );
    }

    #[test]
    fn test_speed_bounds_are_ordered() {
        let sim = SimulationConfig::default();
        assert!(sim.min_speed_multiplier < sim.speed_multiplier);
        assert!(sim.speed_multiplier < sim.max_speed_multiplier);
    }
}
