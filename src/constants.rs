//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.

/// Alias under which the current index generation is published.
pub const DEFAULT_COLLECTION_NAME: &str = "assessments";

/// Embedding model identity used when nothing else is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Output dimension of [`DEFAULT_EMBEDDING_MODEL`].
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Characters of the description that go into the embedded document.
///
/// Biases similarity toward the structured fields over long prose.
pub const DOCUMENT_DESCRIPTION_CHARS: usize = 200;

/// Characters of the description shown to the reasoning service per candidate.
pub const RERANK_DESCRIPTION_CHARS: usize = 300;

/// First-pass candidate count (high recall).
pub const DEFAULT_CANDIDATES: usize = 100;

/// Upper bound accepted for a caller-supplied candidate count.
pub const DEFAULT_MAX_CANDIDATES: usize = 200;

/// Final result count after reranking.
pub const DEFAULT_TOP_K: usize = 10;

/// Texts embedded per request while indexing.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 64;

/// Points written per upsert request while indexing.
pub const UPSERT_CHUNK_SIZE: usize = 256;

/// Capacity of the query embedding cache.
pub const DEFAULT_QUERY_CACHE_CAPACITY: u64 = 1024;

/// Per-attempt timeout for embedding and reasoning calls.
pub const DEFAULT_SERVICE_TIMEOUT_MS: u64 = 30_000;

/// Attempts per embedding or reasoning call (first try included).
pub const DEFAULT_SERVICE_MAX_ATTEMPTS: u32 = 3;

/// First retry delay; doubles on every further attempt.
pub const RETRY_BASE_DELAY_MS: u64 = 200;

/// Ceiling for the retry delay.
pub const RETRY_MAX_DELAY_MS: u64 = 2_000;

/// Literal used for a supported feature flag in canonical output.
pub const SUPPORT_YES: &str = "Yes";

/// Literal used for an unsupported or unknown feature flag in canonical output.
pub const SUPPORT_NO: &str = "No";
