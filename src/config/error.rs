//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind host: {0}")]
    InvalidHost(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("top_k must be between 1 and {max}, got {value}")]
    InvalidTopK { value: usize, max: usize },

    #[error("min_similarity must be a non-negative finite number, got {0}")]
    InvalidMinSimilarity(f64),

    #[error("Invalid risk model: {0}")]
    InvalidRiskModel(String),

    #[error("Invalid chunking: {0}")]
    InvalidChunking(String),
}
