use thiserror::Error;

use crate::retry::{RetryError, Retryable};

#[derive(Debug, Error)]
pub enum RerankError {
    #[error("reasoning service call failed: {reason}")]
    Service { reason: String },

    #[error("reasoning service timed out after {attempts} attempt(s)")]
    TimedOut { attempts: u32 },

    /// The reply held no usable ranking.
    #[error("unusable ranking reply: {reason}")]
    UnusableReply { reason: String },

    #[error("invalid reranker configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<genai::Error> for RerankError {
    fn from(err: genai::Error) -> Self {
        RerankError::Service {
            reason: err.to_string(),
        }
    }
}

impl From<RetryError<RerankError>> for RerankError {
    fn from(err: RetryError<RerankError>) -> Self {
        match err {
            RetryError::TimedOut { attempts, .. } => RerankError::TimedOut { attempts },
            RetryError::Failed { source, .. } => source,
        }
    }
}

impl Retryable for RerankError {
    fn is_retryable(&self) -> bool {
        matches!(self, RerankError::Service { .. } | RerankError::TimedOut { .. })
    }
}
