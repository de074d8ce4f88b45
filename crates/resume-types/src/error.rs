//! Error types for the resume advisor.

use thiserror::Error;

/// Unified error type for advisor operations.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller's deadline expired between embedding chunks
    #[error("Analysis cancelled: deadline exceeded")]
    Cancelled,

    /// Embedding backend could not be prepared
    #[error("Embedding error: {0}")]
    Embedding(String),
}
