//! Query pipeline: retrieve, rerank, normalize.


use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::Config;
use crate::constants::{DEFAULT_CANDIDATES, DEFAULT_MAX_CANDIDATES, DEFAULT_TOP_K};
use crate::embedding::Embedder;
use crate::error::RecommenderError;
use crate::index::IndexError;
use crate::normalize::{CanonicalRecommendation, normalize};
use crate::rerank::Reranker;
use crate::retriever::{RetrievalError, Retriever};
use crate::vectordb::VectorDbClient;

/// Per-query overrides; `None` takes the pipeline default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// First-stage candidate count.
    pub candidates: Option<usize>,
    /// Final result count.
    pub top_k: Option<usize>,
}

/// Defaults and bounds applied to [`QueryOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub candidates: usize,
    pub top_k: usize,
    pub max_candidates: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES,
            top_k: DEFAULT_TOP_K,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl From<&Config> for QueryLimits {
    fn from(config: &Config) -> Self {
        Self {
            candidates: config.candidates,
            top_k: config.top_k,
            max_candidates: config.max_candidates,
        }
    }
}

impl QueryLimits {
    /// Resolves `options` to `(candidates, top_k)`.
    pub fn resolve(&self, options: QueryOptions) -> Result<(usize, usize), RecommenderError> {
        let candidates = options.candidates.unwrap_or(self.candidates);
        let top_k = options.top_k.unwrap_or(self.top_k);

        if candidates == 0 || candidates > self.max_candidates {
            return Err(RecommenderError::InvalidQuery(format!(
                "candidates must be between 1 and {}, got {candidates}",
                self.max_candidates
            )));
        }
        if top_k == 0 || top_k > candidates {
            return Err(RecommenderError::InvalidQuery(format!(
                "top_k must be between 1 and candidates ({candidates}), got {top_k}"
            )));
        }
        Ok((candidates, top_k))
    }
}

/// End-to-end recommendation for free-text queries.
pub struct RecommendationPipeline<V, E, R> {
    retriever: Retriever<V, E>,
    reranker: R,
    limits: QueryLimits,
}

impl<V, E, R> RecommendationPipeline<V, E, R>
where
    V: VectorDbClient,
    E: Embedder,
    R: Reranker,
{
    pub fn new(retriever: Retriever<V, E>, reranker: R) -> Self {
        Self {
            retriever,
            reranker,
            limits: QueryLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    pub fn retriever(&self) -> &Retriever<V, E> {
        &self.retriever
    }

    pub fn reranker(&self) -> &R {
        &self.reranker
    }

    /// Whether a generation is loaded and queries can be served.
    pub fn is_ready(&self) -> bool {
        self.retriever.index().is_ready()
    }

    /// Ranked, canonical recommendations for `query`.
    ///
    /// Retrieval failures past validation degrade to an empty result. Records that cannot
    /// be normalized are skipped.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn recommend(
        &self,
        query: &str,
        options: QueryOptions,
    ) -> Result<Vec<CanonicalRecommendation>, RecommenderError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecommenderError::InvalidQuery("query is empty".to_string()));
        }
        let (candidates, top_k) = self.limits.resolve(options)?;

        let retrieved = match self.retriever.try_search(query, candidates).await {
            Ok(retrieved) => retrieved,
            Err(
                e @ (RetrievalError::EmptyQuery
                | RetrievalError::FingerprintMismatch { .. }
                | RetrievalError::Index(IndexError::Unavailable { .. })),
            ) => return Err(e.into()),
            Err(e) => {
                error!(error = %e, "Retrieval failed; returning no recommendations");
                Vec::new()
            }
        };
        let retrieved_count = retrieved.len();

        let ranked = self.reranker.rerank(query, retrieved, top_k).await?;

        let recommendations: Vec<CanonicalRecommendation> = ranked
            .iter()
            .filter_map(|recommendation| match normalize(recommendation) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        assessment_id = %recommendation.candidate.id,
                        error = %e,
                        "Skipping malformed recommendation"
                    );
                    None
                }
            })
            .collect();

        info!(
            candidates,
            top_k,
            retrieved = retrieved_count,
            returned = recommendations.len(),
            "Recommendation complete"
        );
        Ok(recommendations)
    }
}
