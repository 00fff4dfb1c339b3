//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Flags that take precedence over `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "solar", about = "Interactive stylized solar system")]
pub struct CliArgs {
    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// A level or a tracing filter directive list, e.g. `warn,solar_app=debug`.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Directory holding `config.ron` and `input.ron`.
    #[arg(long, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Root directory holding `textures/` and `models/`.
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Start with the orbits paused.
    #[arg(long)]
    pub paused: bool,

    /// Skip the shadow depth pass.
    #[arg(long)]
    pub no_shadows: bool,

    /// Seed for the starfield and shooting stars.
    #[arg(long)]
    pub seed: Option<u64>,
}

fn override_with<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

impl Config {
    /// Layer command-line values over a loaded config. `--seed` seeds the
    /// starfield and, offset by one, the shooting stars.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        override_with(&mut self.window.width, &args.width);
        override_with(&mut self.window.height, &args.height);
        override_with(&mut self.window.fullscreen, &args.fullscreen);
        override_with(&mut self.debug.log_level, &args.log_level);
        override_with(&mut self.assets.root, &args.assets);
        self.simulation.start_paused |= args.paused;
        self.shadow.enabled &= !args.no_shadows;
        if let Some(seed) = args.seed {
            self.starfield.seed = seed;
            self.particles.seed = seed.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1280),
            assets: Some(PathBuf::from("/opt/solar")),
            no_shadows: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.assets.root, PathBuf::from("/opt/solar"));
        assert!(!config.shadow.enabled);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 1080);
        assert!(!config.simulation.start_paused);
    }

    #[test]
    fn test_flags_never_re_enable() {
        let mut config = Config::default();
        config.shadow.enabled = false;
        config.simulation.start_paused = true;
        config.apply_cli_overrides(&CliArgs::default());
        assert!(!config.shadow.enabled);
        assert!(config.simulation.start_paused);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_seed_drives_both_generators() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(42),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.starfield.seed, 42);
        assert_eq!(config.particles.seed, 43);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from(["solar", "--paused", "--seed", "9", "--width", "640"]);
        assert!(args.paused);
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.width, Some(640));
    }
}
