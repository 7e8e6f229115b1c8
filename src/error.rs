//! Top-level error taxonomy.
//!
//! Every module error converts into [`RecommenderError`]; the gateway maps the taxonomy
//! onto HTTP status codes.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::embedding::EmbeddingError;
use crate::index::IndexError;
use crate::indexer::IndexerError;
use crate::normalize::NormalizeError;
use crate::rerank::RerankError;
use crate::retriever::RetrievalError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum RecommenderError {
    /// The catalog snapshot is missing or unreadable.
    #[error("catalog data not found: {0}")]
    DataNotFound(String),

    /// The index cannot be opened or built, or was built for another configuration.
    #[error("index initialization failed: {0}")]
    IndexInit(String),

    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    #[error("rerank service error: {0}")]
    RerankService(String),

    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No generation has been built yet.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),
}

impl From<CatalogError> for RecommenderError {
    fn from(err: CatalogError) -> Self {
        RecommenderError::DataNotFound(err.to_string())
    }
}

impl From<ConfigError> for RecommenderError {
    fn from(err: ConfigError) -> Self {
        RecommenderError::IndexInit(err.to_string())
    }
}

impl From<VectorDbError> for RecommenderError {
    fn from(err: VectorDbError) -> Self {
        RecommenderError::IndexInit(err.to_string())
    }
}

impl From<IndexError> for RecommenderError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Unavailable { .. } => RecommenderError::IndexUnavailable(err.to_string()),
            other => RecommenderError::IndexInit(other.to_string()),
        }
    }
}

impl From<EmbeddingError> for RecommenderError {
    fn from(err: EmbeddingError) -> Self {
        RecommenderError::EmbeddingService(err.to_string())
    }
}

impl From<RetrievalError> for RecommenderError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::EmptyQuery => RecommenderError::InvalidQuery(err.to_string()),
            RetrievalError::Index(e) => e.into(),
            RetrievalError::Embedding(e) => e.into(),
            RetrievalError::VectorDb(e) => e.into(),
            RetrievalError::FingerprintMismatch { .. } => {
                RecommenderError::IndexInit(err.to_string())
            }
        }
    }
}

impl From<RerankError> for RecommenderError {
    fn from(err: RerankError) -> Self {
        RecommenderError::RerankService(err.to_string())
    }
}

impl From<NormalizeError> for RecommenderError {
    fn from(err: NormalizeError) -> Self {
        RecommenderError::MalformedMetadata(err.to_string())
    }
}

impl From<IndexerError> for RecommenderError {
    fn from(err: IndexerError) -> Self {
        match err {
            IndexerError::Catalog(e) => e.into(),
            IndexerError::Embedding(e) => e.into(),
            other => RecommenderError::IndexInit(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_index_errors_split_unavailable_from_init() {
        let unavailable: RecommenderError = IndexError::Unavailable {
            alias: "a".to_string(),
        }
        .into();
        assert!(matches!(unavailable, RecommenderError::IndexUnavailable(_)));

        let mismatch: RecommenderError = RetrievalError::FingerprintMismatch {
            collection: "c".to_string(),
            expected: "x".to_string(),
            found: "y".to_string(),
        }
        .into();
        assert!(matches!(mismatch, RecommenderError::IndexInit(_)));
    }

    #[test]
    fn test_retrieval_errors_map_by_cause() {
        let empty: RecommenderError = RetrievalError::EmptyQuery.into();
        assert!(matches!(empty, RecommenderError::InvalidQuery(_)));

        let embedding: RecommenderError =
            RetrievalError::Embedding(EmbeddingError::TimedOut { attempts: 3 }).into();
        assert!(matches!(embedding, RecommenderError::EmbeddingService(_)));
    }

    #[test]
    fn test_missing_catalog_is_data_not_found() {
        let err: RecommenderError = IndexerError::Catalog(CatalogError::DataNotFound {
            path: PathBuf::from("/missing.csv"),
        })
        .into();
        assert!(matches!(err, RecommenderError::DataNotFound(ref m) if m.contains("/missing.csv")));
    }

    #[test]
    fn test_normalize_error_is_malformed_metadata() {
        let err: RecommenderError = NormalizeError::MissingField { field: "url" }.into();
        assert!(matches!(err, RecommenderError::MalformedMetadata(_)));
    }
}
