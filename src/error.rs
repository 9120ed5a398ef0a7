//! Error types for configuration handling and log scanning

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, saving or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("Failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that abort a scan run
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot open log source {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading log source {origin}: {source}")]
    Read {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid log pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
