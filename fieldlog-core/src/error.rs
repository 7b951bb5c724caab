//! Error types for fieldlog

use thiserror::Error;

/// Result type alias for fieldlog operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Fieldlog error types
#[derive(Error, Debug)]
pub enum LogError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The in-memory buffer is at capacity
    #[error("Measurement buffer full")]
    BufferFull,

    /// Eviction could not free enough space for a write
    #[error("Storage exhausted: no segment left to evict")]
    StorageExhausted,

    /// No segment exists under the requested key
    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    /// Timestamp is outside the representable or trusted range
    #[error("Invalid timestamp: {0}")]
    InvalidTime(i64),

    /// Malformed segment row or segment key
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LogError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, LogError::Io(_) | LogError::StorageExhausted)
    }

    /// Check if error means the requested segment does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, LogError::SegmentNotFound(_))
    }
}
