//! Error types for the trivia server.

use std::path::PathBuf;

/// Failures while loading or validating the server configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File {path} does not exist or cannot be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Fatal server errors. Per-connection failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Binding to {addr} was unsuccessful: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
