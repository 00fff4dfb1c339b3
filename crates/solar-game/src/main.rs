//! Stylized solar system viewer.
//!
//! Run with: `cargo run -p solar-game -- --help`

use std::path::{Path, PathBuf};

use clap::Parser;
use solar_app::InputMap;
use solar_config::{CliArgs, Config};
use tracing::{error, info, warn};

const APP_DIR: &str = "solar-system";
const INPUT_FILE: &str = "input.ron";

fn config_dir(args: &CliArgs) -> PathBuf {
    args.config
        .clone()
        .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR)))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn load_config(dir: &Path) -> (Config, Option<String>) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        return (Config::default(), Some(format!("{}: {e}", dir.display())));
    }
    match Config::load_or_create(dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e.to_string())),
    }
}

/// Key bindings live next to `config.ron`; a missing file is written out
/// with the defaults so it can be edited.
fn load_input_map(args: &CliArgs, dir: &Path) -> InputMap {
    let path = match args.config {
        Some(_) => dir.join(INPUT_FILE),
        None => InputMap::default_config_path().unwrap_or_else(|| dir.join(INPUT_FILE)),
    };
    if path.exists() {
        return InputMap::load(&path);
    }
    let map = InputMap::default();
    match map.save(&path) {
        Ok(()) => info!("Wrote default key bindings to {}", path.display()),
        Err(e) => warn!("Could not write key bindings {}: {e}", path.display()),
    }
    map
}

fn main() {
    let args = CliArgs::parse();
    let dir = config_dir(&args);

    let (mut config, config_error) = load_config(&dir);
    config.apply_cli_overrides(&args);

    let log_dir = dirs::data_local_dir().map(|d| d.join(APP_DIR).join("logs"));
    solar_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Some(e) = config_error {
        warn!("Config not loaded ({e}); using defaults");
    }
    info!("Solar system viewer");
    info!(
        "Window: {}x{} | Assets: {} | Seed: {}",
        config.window.width,
        config.window.height,
        config.assets.root.display(),
        config.starfield.seed,
    );

    let input_map = load_input_map(&args, &dir);

    if let Err(e) = solar_app::run(config, input_map) {
        error!("Fatal: {e}");
        std::process::exit(1);
    }
}
