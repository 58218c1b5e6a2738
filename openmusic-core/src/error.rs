/// Structured error types for openmusic-core.
///
/// Binary crates (openmusic-cli) wrap these in `anyhow` with context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    #[error("Failed to parse config file {path:?}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = CoreError::config("PORT must be a number");
        assert_eq!(err.to_string(), "Configuration error: PORT must be a number");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
