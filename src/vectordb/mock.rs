use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::vectordb::{DocumentPayload, SearchResult, VectorDbClient, VectorDbError, VectorPoint};

/// In-memory stand-in for Qdrant with collections, aliases and failure injection.
#[derive(Default)]
pub struct MockVectorDbClient {
    state: RwLock<MockState>,
    fail_upserts: AtomicBool,
    fail_searches: AtomicBool,
    searches: AtomicUsize,
}

#[derive(Default)]
struct MockState {
    collections: BTreeMap<String, MockCollection>,
    aliases: HashMap<String, String>,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: u64,
    points: HashMap<u64, MockStoredPoint>,
}

#[derive(Clone)]
struct MockStoredPoint {
    vector: Vec<f32>,
    payload: DocumentPayload,
}

impl MockVectorDbClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.state
            .read()
            .collections
            .get(collection)
            .map(|c| c.points.len())
    }

    /// Collection names, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        self.state.read().collections.keys().cloned().collect()
    }

    pub fn alias_target(&self, alias: &str) -> Option<String> {
        self.state.read().aliases.get(alias).cloned()
    }

    /// Makes every following upsert fail until reset.
    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    /// Makes every following search fail until reset.
    pub fn set_fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    /// Number of search requests received.
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn not_found(collection: &str) -> VectorDbError {
        VectorDbError::CollectionNotFound {
            collection: collection.to_string(),
        }
    }
}

impl VectorDbClient for MockVectorDbClient {
    async fn create_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let mut state = self.state.write();

        if state.collections.contains_key(name) {
            return Err(VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: "collection already exists".to_string(),
            });
        }

        state.collections.insert(
            name.to_string(),
            MockCollection {
                vector_size,
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDbError> {
        let mut state = self.state.write();
        state
            .collections
            .remove(name)
            .ok_or_else(|| Self::not_found(name))?;
        state.aliases.retain(|_, target| target != name);
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        Ok(self.state.read().collections.contains_key(name))
    }

    async fn list_collections(&self) -> Result<Vec<String>, VectorDbError> {
        Ok(self.collection_names())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorDbError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let mut state = self.state.write();
        let coll = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        for point in points {
            if point.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: point.vector.len(),
                });
            }

            coll.points.insert(
                point.id,
                MockStoredPoint {
                    vector: point.vector,
                    payload: point.payload,
                },
            );
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        self.searches.fetch_add(1, Ordering::SeqCst);

        if self.fail_searches.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let state = self.state.read();
        let coll = state
            .collections
            .get(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        if query.len() as u64 != coll.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size as usize,
                actual: query.len(),
            });
        }

        let mut results: Vec<SearchResult> = coll
            .points
            .iter()
            .map(|(&id, p)| SearchResult {
                id,
                score: cosine_similarity(&query, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.payload.ordinal.cmp(&b.payload.ordinal))
        });

        results.truncate(limit as usize);
        Ok(results)
    }

    async fn count_points(&self, collection: &str) -> Result<u64, VectorDbError> {
        self.point_count(collection)
            .map(|n| n as u64)
            .ok_or_else(|| Self::not_found(collection))
    }

    async fn resolve_alias(&self, alias: &str) -> Result<Option<String>, VectorDbError> {
        Ok(self.alias_target(alias))
    }

    async fn swap_alias(&self, alias: &str, collection: &str) -> Result<(), VectorDbError> {
        let mut state = self.state.write();

        if !state.collections.contains_key(collection) {
            return Err(VectorDbError::AliasFailed {
                alias: alias.to_string(),
                message: format!("collection '{collection}' does not exist"),
            });
        }

        state
            .aliases
            .insert(alias.to_string(), collection.to_string());
        Ok(())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
