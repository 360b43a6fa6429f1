//! Error types for the symptom screener

use thiserror::Error;

/// Result type alias for screener operations
pub type Result<T> = std::result::Result<T, ScreenerError>;

#[derive(Error, Debug)]
pub enum ScreenerError {

    // =============================
    // Request Errors
    // =============================

    #[error("Input text is empty")]
    EmptyInput,

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Translation error: {0}")]
    TranslationError(String),

    // =============================
    // Startup Errors
    // =============================

    #[error("Training data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Model bundle corrupt: {0}")]
    ModelCorrupt(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
