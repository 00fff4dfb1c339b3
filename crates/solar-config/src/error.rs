use std::path::PathBuf;

/// Failures reading, checking, or writing `config.ron`. I/O and parse errors
/// carry the file they came from.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid config RON: {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    #[error("config value {field} {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("config could not be encoded as RON: {0}")]
    SerializeError(#[source] ron::Error),
}
