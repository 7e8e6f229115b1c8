//! Index generations and the handle that publishes the current one.
//!
//! Each rebuild writes a fresh collection named `{alias}__{digest}__{generation}`, where
//! `digest` is the [`Fingerprint`] of the alias plus embedding identity. The Qdrant alias
//! is the durable pointer; [`IndexHandle`] holds the in-process pointer.
//!
//! Readers take a [`GenerationLease`] for the duration of a search. Retiring a generation
//! takes the write side of the same gate, so a collection is only dropped once every
//! lease on it has been released.

mod error;


pub use error::IndexError;

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{OwnedRwLockReadGuard, RwLock as GateLock, RwLockWriteGuard};
use tracing::{info, warn};

use crate::embedding::EmbeddingIdentity;
use crate::hashing::{FINGERPRINT_HEX_LEN, fingerprint_digest};
use crate::vectordb::VectorDbClient;

/// Separator between the parts of a generation collection name.
const NAME_SEPARATOR: &str = "__";

/// Length of a generation id (a simple-format UUID).
pub const GENERATION_ID_HEX_LEN: usize = 32;

/// Collection identity plus embedding identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fingerprint {
    pub alias: String,
    pub embedding: EmbeddingIdentity,
}

impl Fingerprint {
    pub fn new(alias: impl Into<String>, embedding: EmbeddingIdentity) -> Self {
        Self {
            alias: alias.into(),
            embedding,
        }
    }

    /// Short digest encoded into collection names.
    pub fn digest(&self) -> String {
        fingerprint_digest(&self.alias, &self.embedding.model, self.embedding.dimensions)
    }
}

/// Physical collection name for a generation.
pub fn collection_name(alias: &str, digest: &str, generation_id: &str) -> String {
    format!("{alias}{NAME_SEPARATOR}{digest}{NAME_SEPARATOR}{generation_id}")
}

/// Splits a generation collection name into `(digest, generation_id)`.
///
/// Both parts must be lowercase hex of their exact lengths, so a collection of another
/// alias that merely starts with `{alias}__` never parses as one of ours.
pub fn parse_collection_name<'a>(alias: &str, name: &'a str) -> Option<(&'a str, &'a str)> {
    let rest = name.strip_prefix(alias)?.strip_prefix(NAME_SEPARATOR)?;
    let (digest, generation_id) = rest.split_once(NAME_SEPARATOR)?;
    if !is_hex_of_len(digest, FINGERPRINT_HEX_LEN)
        || !is_hex_of_len(generation_id, GENERATION_ID_HEX_LEN)
    {
        return None;
    }
    Some((digest, generation_id))
}

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// One immutable, fully populated index build.
#[derive(Debug)]
pub struct Generation {
    pub collection: String,
    pub generation_id: String,
    pub fingerprint: Fingerprint,
    pub document_count: u64,
    /// Set for generations built by this process.
    pub built_at: Option<DateTime<Utc>>,
    gate: Arc<GateLock<()>>,
    retired: AtomicBool,
}

impl Generation {
    pub fn new(
        collection: String,
        generation_id: String,
        fingerprint: Fingerprint,
        document_count: u64,
        built_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            collection,
            generation_id,
            fingerprint,
            document_count,
            built_at,
            gate: Arc::new(GateLock::new(())),
            retired: AtomicBool::new(false),
        }
    }

    /// `true` once the generation has been replaced and its collection scheduled for removal.
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    /// Waits for every outstanding lease, then marks the generation retired.
    ///
    /// Hold the returned guard while deleting the collection.
    pub(crate) async fn retire(&self) -> RwLockWriteGuard<'_, ()> {
        let guard = self.gate.write().await;
        self.retired.store(true, Ordering::SeqCst);
        guard
    }
}

/// Read access to a live generation; the collection is not deleted while this is held.
#[derive(Debug)]
pub struct GenerationLease {
    generation: Arc<Generation>,
    _guard: OwnedRwLockReadGuard<()>,
}

impl Deref for GenerationLease {
    type Target = Generation;

    fn deref(&self) -> &Generation {
        &self.generation
    }
}

/// Injected handle to the vector index and its current generation.
pub struct IndexHandle<V> {
    db: Arc<V>,
    alias: String,
    current: RwLock<Option<Arc<Generation>>>,
}

impl<V> std::fmt::Debug for IndexHandle<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("alias", &self.alias)
            .field(
                "current",
                &self.current.read().as_ref().map(|g| g.collection.clone()),
            )
            .finish()
    }
}

impl<V: VectorDbClient> IndexHandle<V> {
    /// Handle with no generation (nothing built yet).
    pub fn new(db: Arc<V>, alias: impl Into<String>) -> Self {
        Self {
            db,
            alias: alias.into(),
            current: RwLock::new(None),
        }
    }

    /// Opens the generation published under `alias`, if any, and checks its fingerprint.
    pub async fn open(
        db: Arc<V>,
        alias: impl Into<String>,
        embedding: &EmbeddingIdentity,
    ) -> Result<Self, IndexError> {
        let handle = Self::new(db, alias);
        let expected = Fingerprint::new(handle.alias.clone(), embedding.clone());

        let Some(collection) = handle.db.resolve_alias(&handle.alias).await? else {
            info!(alias = %handle.alias, "No index generation published yet");
            return Ok(handle);
        };

        let (digest, generation_id) = parse_collection_name(&handle.alias, &collection)
            .ok_or_else(|| IndexError::UnrecognizedCollection {
                alias: handle.alias.clone(),
                collection: collection.clone(),
            })?;

        let expected_digest = expected.digest();
        if digest != expected_digest {
            return Err(IndexError::FingerprintMismatch {
                collection: collection.clone(),
                expected: expected_digest,
                found: digest.to_string(),
            });
        }

        let document_count = handle.db.count_points(&collection).await?;
        let generation = Generation::new(
            collection.clone(),
            generation_id.to_string(),
            expected,
            document_count,
            None,
        );

        info!(
            alias = %handle.alias,
            collection = %collection,
            documents = document_count,
            "Opened index generation"
        );
        handle.publish(Arc::new(generation));
        Ok(handle)
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn db(&self) -> &Arc<V> {
        &self.db
    }

    /// Current generation, if one has been published.
    pub fn current(&self) -> Option<Arc<Generation>> {
        self.current.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// Leases the current generation for reading.
    ///
    /// A reader that raced with a swap and lands on a retired generation retries on the
    /// newly published one.
    pub async fn lease(&self) -> Result<GenerationLease, IndexError> {
        loop {
            let generation = self.current().ok_or_else(|| IndexError::Unavailable {
                alias: self.alias.clone(),
            })?;

            let guard = generation.gate.clone().read_owned().await;
            if !generation.is_retired() {
                return Ok(GenerationLease {
                    generation,
                    _guard: guard,
                });
            }
            warn!(collection = %generation.collection, "Leased a retired generation; retrying");
        }
    }

    /// Swaps the in-process pointer and returns the previous generation.
    pub(crate) fn publish(&self, generation: Arc<Generation>) -> Option<Arc<Generation>> {
        self.current.write().replace(generation)
    }
}
