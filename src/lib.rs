//! Assessment recommender library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! A free-text hiring query goes through two stages: semantic retrieval over an indexed
//! assessment catalog, then reranking by a reasoning service. Results come back in one
//! canonical schema.
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`RecommendationPipeline`], [`QueryOptions`] - End-to-end query path
//! - [`RecommenderError`] - Top-level error taxonomy
//!
//! ## Catalog & Indexing
//! - [`Assessment`], [`TestType`], [`load_catalog`] - Catalog snapshots
//! - [`Indexer`], [`RebuildReport`] - Build-new-then-swap index generations
//! - [`IndexHandle`], [`Generation`] - Current generation and reader leases
//!
//! ## Retrieval & Ranking
//! - [`Embedder`], [`HttpEmbedder`], [`StubEmbedder`] - Text embedding
//! - [`Retriever`], [`Candidate`] - First-stage semantic search
//! - [`Reranker`], [`LlmReranker`], [`PassthroughReranker`] - Second-stage ranking
//! - [`normalize`], [`CanonicalRecommendation`] - Output schema
//!
//! ## Vector Database
//! - [`QdrantClient`], [`VectorDbClient`] - Qdrant access behind a trait
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod gateway;
pub mod hashing;
pub mod index;
pub mod indexer;
pub mod normalize;
pub mod pipeline;
pub mod rerank;
pub mod retriever;
pub mod retry;
pub mod vectordb;

pub use catalog::{
    Assessment, CatalogError, CatalogLoad, RejectedRow, RowRejection, TestType, load_catalog,
};
pub use config::{Config, ConfigError};
pub use embedding::{
    Embedder, EmbedderBackend, EmbeddingError, EmbeddingIdentity, HttpEmbedder, StubEmbedder,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use error::RecommenderError;
pub use evaluation::{
    EvaluationError, EvaluationReport, LabelledQuery, PredictionRow, average_precision_at_k,
    evaluate, recall_at_k, write_predictions,
};
pub use hashing::{assessment_id, hash_to_u64, point_id, query_key};
pub use index::{Fingerprint, Generation, GenerationLease, IndexError, IndexHandle};
pub use indexer::{Indexer, IndexerError, RebuildReport, RejectedEntry, compose_document};
pub use normalize::{CanonicalRecommendation, Metadata, NormalizeError, normalize};
pub use pipeline::{QueryLimits, QueryOptions, RecommendationPipeline};
#[cfg(any(test, feature = "mock"))]
pub use rerank::MockReasoner;
pub use rerank::{
    GenaiReasoner, LlmReranker, PassthroughReranker, ReasoningService, Recommendation,
    RerankError, RerankFallback, Reranker, RerankerBackend,
};
pub use retriever::{Candidate, RetrievalError, Retriever};
pub use retry::{RetryError, RetryPolicy, Retryable};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorDbClient;
pub use vectordb::{QdrantClient, SearchResult, VectorDbClient, VectorDbError, VectorPoint};
