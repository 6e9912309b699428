//! Error types for Wellness Insight

use thiserror::Error;

/// Errors that can occur at the engine boundary (parsing, configuration, scoring).
///
/// The analytics components themselves are total and never return these.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid screener response: {0}")]
    InvalidScreenerResponse(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
