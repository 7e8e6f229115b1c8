use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{Embedder, EmbeddingError, EmbeddingIdentity, check_vectors};
use crate::retry::RetryPolicy;

/// Client for an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    url: String,
    api_key: Option<String>,
    identity: EmbeddingIdentity,
    retry: RetryPolicy,
}

impl HttpEmbedder {
    /// `url` is the full endpoint (e.g. `http://host:8080/v1/embeddings`).
    pub fn new(
        url: impl Into<String>,
        identity: EmbeddingIdentity,
        api_key: Option<String>,
        retry: RetryPolicy,
    ) -> Result<Self, EmbeddingError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding url is empty".to_string(),
            });
        }
        if identity.dimensions == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding dimensions must be positive".to_string(),
            });
        }

        Ok(Self {
            client: Client::builder().build()?,
            url,
            api_key,
            identity,
            retry,
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = serde_json::json!({
            "model": self.identity.model,
            "input": texts,
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;
        parse_embedding_response(json)
    }
}

impl Embedder for HttpEmbedder {
    fn identity(&self) -> &EmbeddingIdentity {
        &self.identity
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self
            .retry
            .run("embedding", || self.request(texts))
            .await?;

        check_vectors(&self.identity, texts.len(), &vectors)?;
        debug!(count = texts.len(), model = %self.identity.model, "Embedded batch");
        Ok(vectors)
    }
}

/// Reads `data[].embedding`, ordered by `data[].index`.
pub(crate) fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let malformed = |reason: &str| EmbeddingError::MalformedResponse {
        reason: reason.to_string(),
    };

    let data = json
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| malformed("missing data array"))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (fallback_index, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(fallback_index);
        let embedding = item
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| malformed("item missing embedding array"))?;

        let vector = embedding
            .iter()
            .map(|value| {
                value
                    .as_f64()
                    .map(|n| n as f32)
                    .ok_or_else(|| malformed("embedding value must be numeric"))
            })
            .collect::<Result<Vec<f32>, _>>()?;
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
