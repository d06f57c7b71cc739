//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration file or flags are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `--args` was not a JSON object.
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// An error occurred building the relay.
    #[error(transparent)]
    Relay(#[from] relay::Error),

    /// An error occurred in the session registry.
    #[error(transparent)]
    Session(#[from] sessions::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
