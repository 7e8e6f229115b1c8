use serde::{Deserialize, Serialize};

use crate::normalize::CanonicalRecommendation;
use crate::pipeline::QueryOptions;

/// Body of `POST /recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    #[serde(default)]
    pub candidates: Option<usize>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl RecommendRequest {
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            candidates: self.candidates,
            top_k: self.top_k,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<CanonicalRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
