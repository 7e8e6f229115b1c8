use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::{Embedder, EmbeddingError, EmbeddingIdentity};

/// Keyword-axis embedder for tests.
///
/// Dimension `i` is `1.0` when the lowercased text contains keyword `i`; a trailing bias
/// dimension keeps every vector non-zero. Texts sharing more keywords are closer.
#[derive(Debug)]
pub struct MockEmbedder {
    identity: EmbeddingIdentity,
    keywords: Vec<String>,
    failing: AtomicBool,
    delay_ms: AtomicU64,
    batches: AtomicUsize,
    texts: AtomicUsize,
}

impl MockEmbedder {
    pub fn with_keywords(keywords: &[&str]) -> Self {
        Self::with_model("mock-keywords", keywords)
    }

    pub fn with_model(model: &str, keywords: &[&str]) -> Self {
        Self {
            identity: EmbeddingIdentity::new(model, keywords.len() + 1),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            failing: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            batches: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        }
    }

    /// Makes every following call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delays every following call by `delay` (tokio time, so paused clocks apply).
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Batches received (failed ones included).
    pub fn batch_calls(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    /// Texts embedded successfully.
    pub fn embedded_texts(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let mut vector: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| if lowered.contains(k.as_str()) { 1.0 } else { 0.0 })
            .collect();
        vector.push(0.1);
        vector
    }
}

impl Embedder for MockEmbedder {
    fn identity(&self) -> &EmbeddingIdentity {
        &self.identity
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batches.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::ServiceStatus {
                status: 503,
                body: "injected failure".to_string(),
            });
        }

        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}
