use tracing::warn;

use super::{Embedder, EmbeddingError, EmbeddingIdentity};

/// Deterministic, model-free embedder (testing and offline demos only).
///
/// Vectors are unit-length and derived from a BLAKE3 seed of the text, so equal texts map
/// to equal vectors across processes; there is no semantic similarity beyond that.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    identity: EmbeddingIdentity,
}

impl StubEmbedder {
    pub fn new(identity: EmbeddingIdentity) -> Self {
        warn!(model = %identity.model, "Embedder running in STUB mode (testing only)");
        Self { identity }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut state = crate::hashing::hash_to_u64(text.as_bytes());
        let mut embedding = Vec::with_capacity(self.identity.dimensions);

        for _ in 0..self.identity.dimensions {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        embedding
    }
}

impl Embedder for StubEmbedder {
    fn identity(&self) -> &EmbeddingIdentity {
        &self.identity
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
