//! Configuration errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors while reading or checking client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// A source was read but is not valid JSON, TOML or `.env`.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// Settings are missing or inconsistent.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Parsed data does not fit [`ClientConfig`](crate::ClientConfig).
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl ConfigError {
    /// Whether the error comes from a missing or inconsistent setting rather
    /// than from reading a source.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::InvalidValue { .. })
    }
}
