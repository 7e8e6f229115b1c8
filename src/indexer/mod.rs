//! Catalog indexer: builds a new generation and swaps it in.
//!
//! Rebuild order:
//! 1. load the catalog (nothing touched on failure)
//! 2. embed every document (nothing touched on failure)
//! 3. create the generation collection, upsert, verify the point count
//! 4. repoint the alias, then the in-process pointer
//! 5. wait for readers of the old generation, then drop its collection
//!
//! A failure in step 3 or 4 deletes the partial collection. Rebuilds are serialized.

mod document;
mod error;


pub use document::{IndexedDocument, compose_document};
pub use error::IndexerError;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{Assessment, RejectedRow, load_catalog};
use crate::constants::{DEFAULT_EMBED_BATCH_SIZE, UPSERT_CHUNK_SIZE};
use crate::embedding::{Embedder, check_vectors};
use crate::index::{Fingerprint, Generation, IndexHandle, collection_name, parse_collection_name};
use crate::vectordb::VectorDbClient;

/// A catalog row left out of the rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEntry {
    pub row: usize,
    pub name: Option<String>,
    pub reason: String,
}

impl From<&RejectedRow> for RejectedEntry {
    fn from(rejected: &RejectedRow) -> Self {
        Self {
            row: rejected.row,
            name: rejected.name.clone(),
            reason: rejected.reason.to_string(),
        }
    }
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub alias: String,
    pub collection: String,
    pub generation_id: String,
    pub documents: u64,
    pub rejected: Vec<RejectedEntry>,
    /// Collection of the replaced generation, if there was one.
    pub retired: Option<String>,
    /// Leftover generation collections removed after the swap.
    pub pruned: Vec<String>,
    pub built_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Builds generations from catalog snapshots.
pub struct Indexer<V, E> {
    index: Arc<IndexHandle<V>>,
    embedder: Arc<E>,
    batch_size: usize,
    rebuild_lock: Mutex<()>,
}

impl<V: VectorDbClient, E: Embedder> Indexer<V, E> {
    pub fn new(index: Arc<IndexHandle<V>>, embedder: Arc<E>) -> Self {
        Self {
            index,
            embedder,
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Texts per embedding request (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn index(&self) -> &Arc<IndexHandle<V>> {
        &self.index
    }

    /// Loads the catalog at `source` and rebuilds from it.
    pub async fn rebuild(&self, source: &Path) -> Result<RebuildReport, IndexerError> {
        let load = load_catalog(source)?;
        let rejected: Vec<RejectedEntry> = load.rejected.iter().map(RejectedEntry::from).collect();

        let mut report = self.rebuild_from(&load.assessments).await?;
        report.rejected = rejected;
        Ok(report)
    }

    /// Builds and publishes a generation holding exactly `assessments`.
    pub async fn rebuild_from(
        &self,
        assessments: &[Assessment],
    ) -> Result<RebuildReport, IndexerError> {
        let _serial = self.rebuild_lock.lock().await;
        let started = Instant::now();

        let identity = self.embedder.identity().clone();
        let fingerprint = Fingerprint::new(self.index.alias(), identity.clone());
        let alias = self.index.alias().to_string();

        info!(
            alias = %alias,
            assessments = assessments.len(),
            model = %identity.model,
            "Rebuild started"
        );

        let documents = self.embed_documents(assessments).await?;
        let expected = documents.len() as u64;

        let generation_id = Uuid::new_v4().simple().to_string();
        let collection = collection_name(&alias, &fingerprint.digest(), &generation_id);
        let db = self.index.db();

        db.create_collection(&collection, identity.dimensions as u64)
            .await?;

        if let Err(e) = self.populate_and_point(&collection, documents).await {
            self.discard(&collection).await;
            return Err(e);
        }

        let built_at = Utc::now();
        let generation = Generation::new(
            collection.clone(),
            generation_id.clone(),
            fingerprint,
            expected,
            Some(built_at),
        );
        let previous = self.index.publish(Arc::new(generation));

        let retired = match previous {
            Some(previous) => {
                let _guard = previous.retire().await;
                if let Err(e) = db.delete_collection(&previous.collection).await {
                    warn!(
                        collection = %previous.collection,
                        error = %e,
                        "Failed to delete retired generation"
                    );
                }
                Some(previous.collection.clone())
            }
            None => None,
        };

        let pruned = self.prune_orphans(&collection, retired.as_deref()).await;

        let report = RebuildReport {
            alias,
            collection,
            generation_id,
            documents: expected,
            rejected: Vec::new(),
            retired,
            pruned,
            built_at,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            collection = %report.collection,
            documents = report.documents,
            retired = ?report.retired,
            elapsed_ms = report.elapsed_ms,
            "Rebuild complete"
        );
        Ok(report)
    }

    async fn embed_documents(
        &self,
        assessments: &[Assessment],
    ) -> Result<Vec<IndexedDocument>, IndexerError> {
        let mut documents = Vec::with_capacity(assessments.len());

        for chunk in assessments.chunks(self.batch_size) {
            let texts: Vec<String> = chunk.iter().map(compose_document).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            check_vectors(self.embedder.identity(), texts.len(), &vectors)?;

            documents.extend(
                chunk
                    .iter()
                    .zip(texts)
                    .zip(vectors)
                    .map(|((assessment, text), vector)| {
                        IndexedDocument::new(assessment, text, vector)
                    }),
            );
        }

        Ok(documents)
    }

    async fn populate_and_point(
        &self,
        collection: &str,
        documents: Vec<IndexedDocument>,
    ) -> Result<(), IndexerError> {
        let db = self.index.db();
        let expected = documents.len() as u64;

        let mut points = documents.into_iter().map(IndexedDocument::into_point);
        loop {
            let chunk: Vec<_> = points.by_ref().take(UPSERT_CHUNK_SIZE).collect();
            if chunk.is_empty() {
                break;
            }
            db.upsert_points(collection, chunk).await?;
        }

        let actual = db.count_points(collection).await?;
        if actual != expected {
            return Err(IndexerError::CountMismatch {
                collection: collection.to_string(),
                expected,
                actual,
            });
        }

        db.swap_alias(self.index.alias(), collection).await?;
        Ok(())
    }

    async fn discard(&self, collection: &str) {
        if let Err(e) = self.index.db().delete_collection(collection).await {
            warn!(collection, error = %e, "Failed to delete partial generation");
        }
    }

    /// Deletes generation collections of this alias that are neither current nor retired.
    async fn prune_orphans(&self, current: &str, retired: Option<&str>) -> Vec<String> {
        let db = self.index.db();
        let names = match db.list_collections().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Could not list collections for pruning");
                return Vec::new();
            }
        };

        let mut pruned = Vec::new();
        for name in names {
            if name == current
                || Some(name.as_str()) == retired
                || parse_collection_name(self.index.alias(), &name).is_none()
            {
                continue;
            }

            match db.delete_collection(&name).await {
                Ok(()) => pruned.push(name),
                Err(e) => warn!(collection = %name, error = %e, "Failed to prune orphan generation"),
            }
        }
        pruned
    }
}
