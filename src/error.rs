//! Error types for motion-log

use thiserror::Error;

/// Errors raised at the producer and serialization boundaries.
///
/// Sampling and classification never fail; only input that comes from a
/// person or a file can be rejected.
#[derive(Debug, Error)]
pub enum MotionLogError {
    #[error("Field must not be blank: {0}")]
    BlankField(&'static str),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid session event: {0}")]
    InvalidEvent(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
