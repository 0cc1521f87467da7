use std::io;

use thiserror::Error;

/// Result type used across the RuleCraft core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Canonical error representation shared by the RuleCraft crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("general error: {0}")]
    GeneralError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::DeserializationError(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to read option catalogue {path}")]
    CatalogIo {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse option catalogue {path}: {message}")]
    CatalogParse { path: String, message: String },
}

impl From<ConfigError> for CoreError {
    fn from(value: ConfigError) -> Self {
        CoreError::ConfigError(value.to_string())
    }
}
