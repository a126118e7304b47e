//! Error types and handling for trtbench core

use thiserror::Error;

/// Result type alias for trtbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for trtbench core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend adapter errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Inference engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Backend adapter errors
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{backend} backend does not support model_type {model_type}")]
    UnsupportedModelType { backend: String, model_type: String },

    #[error("{backend} backend has no loaded model, call load() first")]
    NotLoaded { backend: String },
}

/// Errors raised by the inference engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Model '{model}' declares model_type '{found}', expected '{expected}'")]
    ArchitectureMismatch {
        model: String,
        expected: String,
        found: String,
    },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}
