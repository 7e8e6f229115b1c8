use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::STATUS_HEADER;
use crate::catalog::CatalogError;
use crate::error::RecommenderError;
use crate::indexer::IndexerError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("upstream service failed: {0}")]
    UpstreamFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<RecommenderError> for GatewayError {
    fn from(err: RecommenderError) -> Self {
        match err {
            RecommenderError::InvalidQuery(_) => GatewayError::InvalidRequest(err.to_string()),
            RecommenderError::DataNotFound(_) => GatewayError::NotFound(err.to_string()),
            RecommenderError::IndexInit(_) | RecommenderError::IndexUnavailable(_) => {
                GatewayError::Unavailable(err.to_string())
            }
            RecommenderError::EmbeddingService(_) | RecommenderError::RerankService(_) => {
                GatewayError::UpstreamFailed(err.to_string())
            }
            RecommenderError::MalformedMetadata(_) => GatewayError::InternalError(err.to_string()),
        }
    }
}

impl From<IndexerError> for GatewayError {
    fn from(err: IndexerError) -> Self {
        match err {
            IndexerError::Catalog(CatalogError::DataNotFound { .. }) => {
                GatewayError::NotFound(err.to_string())
            }
            IndexerError::Embedding(_) => GatewayError::UpstreamFailed(err.to_string()),
            _ => GatewayError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, status_label) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            GatewayError::UpstreamFailed(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, HeaderValue::from_static(status_label));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
