use std::path::PathBuf;
use std::sync::Arc;

use crate::indexer::Indexer;
use crate::pipeline::RecommendationPipeline;

/// Shared handler state.
pub struct AppState<V, E, R> {
    pub pipeline: Arc<RecommendationPipeline<V, E, R>>,

    pub indexer: Arc<Indexer<V, E>>,

    /// Catalog read by `POST /admin/rebuild`.
    pub catalog_path: PathBuf,
}

impl<V, E, R> AppState<V, E, R> {
    pub fn new(
        pipeline: Arc<RecommendationPipeline<V, E, R>>,
        indexer: Arc<Indexer<V, E>>,
        catalog_path: PathBuf,
    ) -> Self {
        Self {
            pipeline,
            indexer,
            catalog_path,
        }
    }
}

impl<V, E, R> Clone for AppState<V, E, R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            indexer: Arc::clone(&self.indexer),
            catalog_path: self.catalog_path.clone(),
        }
    }
}
