//! Text embedding.
//!
//! - [`HttpEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint.
//! - [`StubEmbedder`] produces deterministic hash vectors (no model, no network).
//!
//! The same [`Embedder`] instance must serve the indexer and the retriever; its
//! [`EmbeddingIdentity`] is part of every index generation's fingerprint.

mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod stub;


pub use error::EmbeddingError;
pub use http::HttpEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use stub::StubEmbedder;

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Model name plus output dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddingIdentity {
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingIdentity {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
        }
    }
}

/// Turns texts into fixed-size vectors.
pub trait Embedder: Send + Sync {
    /// Model identity; stable for the lifetime of the instance.
    fn identity(&self) -> &EmbeddingIdentity;

    /// Embeds `texts`, returning one vector per text in input order.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// Embeds a single text.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send {
        let texts = vec![text.to_string()];
        async move {
            let mut vectors = self.embed_batch(&texts).await?;
            if vectors.len() != 1 {
                return Err(EmbeddingError::CountMismatch {
                    expected: 1,
                    actual: vectors.len(),
                });
            }
            Ok(vectors.swap_remove(0))
        }
    }
}

/// Runtime-selected embedder used by the binary.
#[derive(Debug)]
pub enum EmbedderBackend {
    Http(HttpEmbedder),
    Stub(StubEmbedder),
}

impl Embedder for EmbedderBackend {
    fn identity(&self) -> &EmbeddingIdentity {
        match self {
            EmbedderBackend::Http(e) => e.identity(),
            EmbedderBackend::Stub(e) => e.identity(),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self {
            EmbedderBackend::Http(e) => e.embed_batch(texts).await,
            EmbedderBackend::Stub(e) => e.embed_batch(texts).await,
        }
    }
}

/// Checks one response vector per input and the configured dimensions.
pub(crate) fn check_vectors(
    identity: &EmbeddingIdentity,
    expected: usize,
    vectors: &[Vec<f32>],
) -> Result<(), EmbeddingError> {
    if vectors.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: vectors.len(),
        });
    }

    if let Some(bad) = vectors.iter().find(|v| v.len() != identity.dimensions) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: identity.dimensions,
            actual: bad.len(),
        });
    }

    Ok(())
}
