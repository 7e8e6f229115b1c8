//! First-stage retrieval: embed the query, search the current generation.

mod error;


pub use error::RetrievalError;

use std::sync::Arc;

use moka::sync::Cache;
use serde::Serialize;
use tracing::{debug, error};

use crate::constants::DEFAULT_QUERY_CACHE_CAPACITY;
use crate::embedding::Embedder;
use crate::hashing::query_key;
use crate::index::{Fingerprint, Generation, IndexError, IndexHandle};
use crate::normalize::Metadata;
use crate::vectordb::{VectorDbClient, similarity_to_distance};

/// A retrieved document for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub ordinal: u64,
    pub document: String,
    pub metadata: Metadata,
    /// Non-negative; lower is more similar.
    pub distance: f32,
}

/// Semantic search over the current index generation.
pub struct Retriever<V, E> {
    index: Arc<IndexHandle<V>>,
    embedder: Arc<E>,
    query_cache: Cache<u64, Arc<Vec<f32>>>,
}

impl<V: VectorDbClient, E: Embedder> Retriever<V, E> {
    pub fn new(index: Arc<IndexHandle<V>>, embedder: Arc<E>) -> Self {
        Self {
            index,
            embedder,
            query_cache: Cache::new(DEFAULT_QUERY_CACHE_CAPACITY),
        }
    }

    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.query_cache = Cache::new(capacity);
        self
    }

    pub fn index(&self) -> &Arc<IndexHandle<V>> {
        &self.index
    }

    /// Up to `n` candidates by ascending distance (ties by catalog order).
    ///
    /// Never fails: any error is logged and yields an empty list. Use
    /// [`Self::try_search`] to observe the cause.
    pub async fn search(&self, query: &str, n: usize) -> Vec<Candidate> {
        match self.try_search(query, n).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, n, "Retrieval failed; returning no candidates");
                Vec::new()
            }
        }
    }

    pub async fn try_search(&self, query: &str, n: usize) -> Result<Vec<Candidate>, RetrievalError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        let expected = Fingerprint::new(self.index.alias(), self.embedder.identity().clone());
        let current = self.index.current().ok_or_else(|| IndexError::Unavailable {
            alias: self.index.alias().to_string(),
        })?;
        check_fingerprint(&current, &expected)?;

        // Embed outside the lease; a held lease blocks retirement.
        let vector = self.query_vector(query).await?;

        let lease = self.index.lease().await?;
        check_fingerprint(&lease, &expected)?;

        let hits = self
            .index
            .db()
            .search(&lease.collection, vector.as_ref().clone(), n as u64)
            .await?;

        let mut candidates: Vec<Candidate> = hits
            .into_iter()
            .map(|hit| Candidate {
                id: hit.payload.assessment_id,
                ordinal: hit.payload.ordinal,
                document: hit.payload.document,
                metadata: hit.payload.metadata,
                distance: similarity_to_distance(hit.score),
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        candidates.truncate(n);

        debug!(
            collection = %lease.collection,
            n,
            returned = candidates.len(),
            "Retrieved candidates"
        );
        Ok(candidates)
    }

    async fn query_vector(&self, query: &str) -> Result<Arc<Vec<f32>>, RetrievalError> {
        let key = query_key(query);
        if let Some(vector) = self.query_cache.get(&key) {
            return Ok(vector);
        }

        let vector = Arc::new(self.embedder.embed(query).await?);
        self.query_cache.insert(key, vector.clone());
        Ok(vector)
    }
}

fn check_fingerprint(
    generation: &Generation,
    expected: &Fingerprint,
) -> Result<(), RetrievalError> {
    if generation.fingerprint == *expected {
        return Ok(());
    }
    Err(RetrievalError::FingerprintMismatch {
        collection: generation.collection.clone(),
        expected: expected.digest(),
        found: generation.fingerprint.digest(),
    })
}
