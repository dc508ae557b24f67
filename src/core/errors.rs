//! Error types shared by both front-ends

use thiserror::Error;

/// Errors raised while resolving, validating or translating
#[derive(Error, Debug)]
pub enum KotkiError {
    /// Nothing to translate
    #[error("Empty input")]
    EmptyInput,

    /// Source language could not be determined
    #[error("Could not detect input language: {message}")]
    Detection {
        message: String,
    },

    /// Resolved model identifier is not in the registry
    #[error("{}unknown translation model id '{model}'", detect_prefix(.auto_detected))]
    ModelNotFound {
        model: String,
        auto_detected: bool,
    },

    /// Input exceeds the configured character cap
    #[error("Text too long: {length} characters (limit {limit})")]
    ContentTooLong {
        length: usize,
        limit: usize,
    },

    /// Failure reported by the translation engine
    #[error("Translation engine error: {message}")]
    Engine {
        message: String,
    },

    /// Registry file could not be found or parsed
    #[error("Registry error: {message}")]
    Registry {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<config::ConfigError> for KotkiError {
    fn from(err: config::ConfigError) -> Self {
        KotkiError::Config {
            message: err.to_string(),
        }
    }
}

fn detect_prefix(auto_detected: &bool) -> &'static str {
    if *auto_detected {
        "Auto-detect error: "
    } else {
        ""
    }
}

/// Result type for kotki operations
pub type Result<T> = std::result::Result<T, KotkiError>;
