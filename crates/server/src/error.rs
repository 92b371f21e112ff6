//! Error types for the engine facade.

use data_loader::{MovieId, UserId};
use std::path::PathBuf;
use thiserror::Error;

use crate::session::RecorderError;

/// Errors returned by `RecommendationEngine`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Movie {0} not found")]
    MovieNotFound(MovieId),

    /// Recorder failures pass through unchanged.
    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

/// Errors raised while loading or validating an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
