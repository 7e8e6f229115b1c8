use thiserror::Error;

use crate::catalog::CatalogError;
use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

/// Rebuild failures. In every case the previously published generation stays servable.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("embedding failed during rebuild: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector index write failed during rebuild: {0}")]
    VectorDb(#[from] VectorDbError),

    /// The new collection does not hold one point per assessment.
    #[error("collection '{collection}' holds {actual} points, expected {expected}")]
    CountMismatch {
        collection: String,
        expected: u64,
        actual: u64,
    },
}
