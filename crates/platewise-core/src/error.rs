//! Error types for the Platewise estimation core.
//!
//! Errors are split by concern: configuration problems surface at startup,
//! estimation problems surface per request (or once, when the model set is
//! built and nothing could be loaded).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Platewise operations.
#[derive(Error, Debug)]
pub enum PlatewiseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Estimation errors
    #[error("Estimation error: {0}")]
    Estimate(#[from] EstimateError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while turning an image into an estimate.
#[derive(Error, Debug)]
pub enum EstimateError {
    /// Neither a classifier nor the zero-shot model could be loaded.
    #[error("No vision model available")]
    ModelUnavailable,

    /// A single model call failed. Recoverable: the model is skipped.
    #[error("Model {model} failed: {message}")]
    ModelInvocation {
        model: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The caller supplied neither an image path nor image bytes.
    #[error("Provide an image path or image bytes")]
    NoInput,

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Payload exceeds the upload limit
    #[error("Payload too large: {size_mb:.2} MB > {max_mb:.2} MB")]
    FileTooLarge { size_mb: f64, max_mb: f64 },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },
}

/// Convenience type alias for Platewise results.
pub type Result<T> = std::result::Result<T, PlatewiseError>;
