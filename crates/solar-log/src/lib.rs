//! Tracing setup for the solar system viewer.
//!
//! Everything goes to the console with uptime timestamps. Debug builds also
//! write JSON lines to a file. `RUST_LOG` wins over the configured level.

use std::fs::File;
use std::path::Path;

use solar_config::Config;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

pub const LOG_FILE_NAME: &str = "solar.log";

const QUIET_BACKENDS: &str = "wgpu=warn,naga=warn";

/// Install the global subscriber. Call once, before anything logs.
///
/// `log_dir` is only used when `debug_build` is set; a directory that cannot
/// be created just means no file output.
///
/// ```no_run
/// solar_log::init_logging(None, false, None);
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_string(config)));

    let console = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime());

    let log_file = log_dir.filter(|_| debug_build).and_then(open_log_file);
    let file_logging = log_file.is_some();
    let json_file = log_file.map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_ansi(false)
            .with_timer(fmt::time::uptime())
            .boxed()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json_file)
        .init();

    tracing::debug!(file_logging, "Logging initialized");
}

fn open_log_file(dir: &Path) -> Option<File> {
    std::fs::create_dir_all(dir).ok()?;
    File::create(dir.join(LOG_FILE_NAME)).ok()
}

/// A bare level from the config (`"debug"`) keeps the GPU backends at
/// `warn`; a directive list is used as written.
pub fn filter_string(config: Option<&Config>) -> String {
    let level = config.map(|c| c.debug.log_level.trim()).unwrap_or_default();
    if level.is_empty() {
        DEFAULT_FILTER.to_string()
    } else if level.contains([',', '=']) {
        level.to_string()
    } else {
        format!("{level},{QUIET_BACKENDS}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_level(level: &str) -> Config {
        let mut config = Config::default();
        config.debug.log_level = level.to_string();
        config
    }

    #[test]
    fn test_filter_without_config() {
        assert_eq!(filter_string(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_bare_level_keeps_backend_quiet() {
        assert_eq!(filter_string(Some(&with_level("debug"))), "debug,wgpu=warn,naga=warn");
    }

    #[test]
    fn test_directive_list_used_verbatim() {
        let config = with_level("warn,solar_app=trace");
        assert_eq!(filter_string(Some(&config)), "warn,solar_app=trace");
        let config = with_level("solar_space=debug");
        assert_eq!(filter_string(Some(&config)), "solar_space=debug");
    }

    #[test]
    fn test_empty_level_falls_back() {
        assert_eq!(filter_string(Some(&with_level("  "))), DEFAULT_FILTER);
    }

    #[test]
    fn test_produced_filters_parse() {
        for level in ["info", "debug,solar_render=trace", "", "trace"] {
            let filter = filter_string(Some(&with_level(level)));
            assert!(EnvFilter::try_new(&filter).is_ok(), "bad filter: {filter}");
        }
    }

    #[test]
    fn test_missing_log_dir_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"").unwrap();
        // A regular file where the directory should be.
        assert!(open_log_file(&file.join("logs")).is_none());
        assert!(open_log_file(dir.path()).is_some());
    }
}
