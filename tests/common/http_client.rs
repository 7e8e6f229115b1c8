//! HTTP client helpers for tests.

use std::time::Duration;

use recommender::gateway::{HealthResponse, RecommendRequest, RecommendResponse, STATUS_HEADER};
use serde_json::Value;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("Content-Type", "application/json")
    }

    pub async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<RecommendResponse, TestClientError> {
        let body = serde_json::to_value(request).expect("request serializes");
        self.recommend_raw(body).await
    }

    /// Posts an arbitrary JSON body to `/recommend`.
    pub async fn recommend_raw(&self, body: Value) -> Result<RecommendResponse, TestClientError> {
        let builder = self.add_headers(self.client.post(self.url("/recommend")));
        let resp = builder.json(&body).send().await?;

        match resp.status().as_u16() {
            200 => Ok(resp.json().await?),
            400 | 422 => Err(TestClientError::BadRequest(resp.text().await?)),
            status => {
                let label = status_label(&resp);
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, label, body))
            }
        }
    }

    /// Returns the HTTP status alongside the body, so callers can assert on 503.
    pub async fn health(&self) -> Result<(u16, HealthResponse), TestClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    pub async fn rebuild(&self) -> Result<Value, TestClientError> {
        let builder = self.add_headers(self.client.post(self.url("/admin/rebuild")));
        let resp = builder.send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let label = status_label(&resp);
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, label, body))
        }
    }
}

fn status_label(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(STATUS_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unexpected status {0} ({1}): {2}")]
    UnexpectedStatus(u16, String, String),
}
