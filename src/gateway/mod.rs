//! HTTP gateway (Axum) for recommendations and index administration.
//!
//! This module is primarily used by the `recommender` binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{health_handler, rebuild_handler, recommend_handler};
pub use payload::{HealthResponse, RecommendRequest, RecommendResponse};
pub use state::AppState;

use crate::embedding::Embedder;
use crate::rerank::Reranker;
use crate::vectordb::VectorDbClient;

/// Response header carrying a short machine-readable outcome.
pub const STATUS_HEADER: &str = "x-recommender-status";

pub fn create_router_with_state<V, E, R>(state: AppState<V, E, R>) -> Router
where
    V: VectorDbClient + 'static,
    E: Embedder + 'static,
    R: Reranker + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/recommend", post(recommend_handler))
        .route("/admin/rebuild", post(rebuild_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
