use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by format drivers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("the config key cannot be empty")]
    KeyIsEmpty,

    #[error("the config instance in 'readonly' mode")]
    ReadOnly,

    #[error("config key not found: '{0}'")]
    KeyNotFound(String),

    #[error("cannot set value for the key '{key}': {reason}")]
    PathConflict { key: String, reason: String },

    #[error("value cannot be convert to {target}, key is '{key}'")]
    Convert { key: String, target: &'static str },

    #[error("no exists or no register decoder for the format: {0}")]
    UnknownFormat(String),

    #[error("no exists or no register encoder for the format: {0}")]
    MissingEncoder(String),

    #[error("failed to decode {format} content: {source}")]
    Decode { format: String, source: BoxError },

    #[error("failed to encode data as {format}: {source}")]
    Encode { format: String, source: BoxError },

    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {format} config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        format: String,
        source: BoxError,
    },

    #[error("loaded data must be a map at the top level")]
    RootNotMap,

    #[error("failed to bind config data: {0}")]
    Bind(#[from] serde_json::Error),

    #[error("failed to write config data: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn path_conflict(key: &str, reason: impl Into<String>) -> Self {
        Self::PathConflict {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
