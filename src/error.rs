//! Error types for Hinge Lens

use thiserror::Error;

/// Errors that can occur while reading or transforming an export
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse export: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Interaction {index} does not match the export shape: {message}")]
    InvalidInteraction { index: usize, message: String },

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Interaction {index}: malformed timestamp in {field}: {value:?}")]
    TimestampFormat {
        index: usize,
        field: String,
        value: String,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Flow aggregation error: {0}")]
    FlowError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
