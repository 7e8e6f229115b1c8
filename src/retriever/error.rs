use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::index::IndexError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query is empty")]
    EmptyQuery,

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("similarity search failed: {0}")]
    VectorDb(#[from] VectorDbError),

    /// The current generation was built for a different alias or embedder.
    #[error(
        "generation '{collection}' was built with fingerprint {found}, but the embedder expects {expected}"
    )]
    FingerprintMismatch {
        collection: String,
        expected: String,
        found: String,
    },
}
