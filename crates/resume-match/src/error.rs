//! Matching error types.

use resume_embeddings::EmbeddingError;
use thiserror::Error;

/// Errors that can occur while matching a resume against a job.
///
/// Content never causes an error; embedding failures degrade to zero
/// vectors inside the embedder. What remains is cancellation.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The caller's deadline expired between embedding chunks
    #[error("Matching cancelled: deadline exceeded")]
    Cancelled,

    /// Embedding error that could not be absorbed
    #[error("Embedding error: {0}")]
    Embedding(String),
}

impl From<EmbeddingError> for MatchError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Cancelled => MatchError::Cancelled,
            other => MatchError::Embedding(other.to_string()),
        }
    }
}
