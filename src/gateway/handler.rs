use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use super::STATUS_HEADER;
use super::error::GatewayError;
use super::payload::{HealthResponse, RecommendRequest, RecommendResponse};
use super::state::AppState;
use crate::embedding::Embedder;
use crate::indexer::RebuildReport;
use crate::rerank::Reranker;
use crate::vectordb::VectorDbClient;

#[instrument(skip(state))]
pub async fn health_handler<V, E, R>(State(state): State<AppState<V, E, R>>) -> Response
where
    V: VectorDbClient + 'static,
    E: Embedder + 'static,
    R: Reranker + 'static,
{
    let (status, body) = if state.pipeline.is_ready() {
        (
            StatusCode::OK,
            HealthResponse {
                status: "healthy".to_string(),
                detail: None,
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy".to_string(),
                detail: Some("no index generation is loaded".to_string()),
            },
        )
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        STATUS_HEADER,
        HeaderValue::from_str(&body.status).unwrap_or(HeaderValue::from_static("error")),
    );

    (status, headers, Json(body)).into_response()
}

#[instrument(skip(state, request))]
pub async fn recommend_handler<V, E, R>(
    State(state): State<AppState<V, E, R>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Json<RecommendResponse>, GatewayError>
where
    V: VectorDbClient + 'static,
    E: Embedder + 'static,
    R: Reranker + 'static,
{
    let request: RecommendRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let recommended_assessments = state
        .pipeline
        .recommend(&request.query, request.options())
        .await?;

    Ok(Json(RecommendResponse {
        recommended_assessments,
    }))
}

#[instrument(skip(state))]
pub async fn rebuild_handler<V, E, R>(
    State(state): State<AppState<V, E, R>>,
) -> Result<Json<RebuildReport>, GatewayError>
where
    V: VectorDbClient + 'static,
    E: Embedder + 'static,
    R: Reranker + 'static,
{
    info!(catalog = %state.catalog_path.display(), "Rebuild requested");
    let report = state.indexer.rebuild(&state.catalog_path).await?;
    Ok(Json(report))
}
