use thiserror::Error;

use crate::retry::{RetryError, Retryable};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("embedding service returned HTTP {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("embedding service timed out after {attempts} attempt(s)")]
    TimedOut { attempts: u32 },

    #[error("malformed embedding response: {reason}")]
    MalformedResponse { reason: String },

    #[error("embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        EmbeddingError::RequestFailed {
            reason: err.to_string(),
        }
    }
}

impl From<RetryError<EmbeddingError>> for EmbeddingError {
    fn from(err: RetryError<EmbeddingError>) -> Self {
        match err {
            RetryError::TimedOut { attempts, .. } => EmbeddingError::TimedOut { attempts },
            RetryError::Failed { source, .. } => source,
        }
    }
}

impl Retryable for EmbeddingError {
    /// Client errors other than 408 and 429 fail the same way on every attempt.
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::RequestFailed { .. } | EmbeddingError::TimedOut { .. } => true,
            EmbeddingError::ServiceStatus { status, .. } => {
                !(400..500).contains(status) || matches!(status, 408 | 429)
            }
            EmbeddingError::MalformedResponse { .. }
            | EmbeddingError::CountMismatch { .. }
            | EmbeddingError::DimensionMismatch { .. }
            | EmbeddingError::InvalidConfig { .. } => false,
        }
    }
}
