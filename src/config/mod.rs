//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RECOMMENDER_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CANDIDATES, DEFAULT_COLLECTION_NAME, DEFAULT_EMBED_BATCH_SIZE, DEFAULT_EMBEDDING_DIM,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_CANDIDATES, DEFAULT_QUERY_CACHE_CAPACITY,
    DEFAULT_SERVICE_MAX_ATTEMPTS, DEFAULT_SERVICE_TIMEOUT_MS, DEFAULT_TOP_K,
};
use crate::embedding::EmbeddingIdentity;
use crate::rerank::RerankFallback;
use crate::retry::RetryPolicy;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RECOMMENDER_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8001`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Catalog snapshot (`.csv` or `.json`). Default: `./data/assessments.csv`.
    pub catalog_path: PathBuf,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Alias under which the current generation is published. Default: `assessments`.
    pub collection: String,

    /// OpenAI-compatible embeddings endpoint. `None` selects the deterministic stub.
    pub embedding_url: Option<String>,

    /// Embedding model name. Default: `all-MiniLM-L6-v2`.
    pub embedding_model: String,

    /// Embedding dimensions. Default: `384`.
    pub embedding_dim: usize,

    pub embedding_api_key: Option<String>,

    /// Reasoning model for reranking. `None` keeps retrieval order.
    pub rerank_model: Option<String>,

    pub rerank_fallback: RerankFallback,

    /// Default first-pass candidate count. Default: `100`.
    pub candidates: usize,

    /// Default result count. Default: `10`.
    pub top_k: usize,

    /// Largest candidate count a caller may request. Default: `200`.
    pub max_candidates: usize,

    /// Per-attempt timeout for embedding and reasoning calls. Default: `30000`.
    pub service_timeout_ms: u64,

    /// Attempts per embedding or reasoning call. Default: `3`.
    pub service_max_attempts: u32,

    /// Texts embedded per request while indexing. Default: `64`.
    pub embed_batch_size: usize,

    /// Query embedding cache capacity. Default: `1024`.
    pub query_cache_capacity: u64,
}

/// Default Qdrant URL used when `RECOMMENDER_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default catalog location used when `RECOMMENDER_CATALOG_PATH` is not set.
pub const DEFAULT_CATALOG_PATH: &str = "./data/assessments.csv";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8001,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            embedding_url: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            embedding_api_key: None,
            rerank_model: None,
            rerank_fallback: RerankFallback::default(),
            candidates: DEFAULT_CANDIDATES,
            top_k: DEFAULT_TOP_K,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            service_timeout_ms: DEFAULT_SERVICE_TIMEOUT_MS,
            service_max_attempts: DEFAULT_SERVICE_MAX_ATTEMPTS,
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RECOMMENDER_PORT";
    const ENV_BIND_ADDR: &'static str = "RECOMMENDER_BIND_ADDR";
    const ENV_CATALOG_PATH: &'static str = "RECOMMENDER_CATALOG_PATH";
    const ENV_QDRANT_URL: &'static str = "RECOMMENDER_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "RECOMMENDER_COLLECTION";
    const ENV_EMBEDDING_URL: &'static str = "RECOMMENDER_EMBEDDING_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "RECOMMENDER_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIM: &'static str = "RECOMMENDER_EMBEDDING_DIM";
    const ENV_EMBEDDING_API_KEY: &'static str = "RECOMMENDER_EMBEDDING_API_KEY";
    const ENV_RERANK_MODEL: &'static str = "RECOMMENDER_RERANK_MODEL";
    const ENV_RERANK_FALLBACK: &'static str = "RECOMMENDER_RERANK_FALLBACK";
    const ENV_CANDIDATES: &'static str = "RECOMMENDER_CANDIDATES";
    const ENV_TOP_K: &'static str = "RECOMMENDER_TOP_K";
    const ENV_MAX_CANDIDATES: &'static str = "RECOMMENDER_MAX_CANDIDATES";
    const ENV_SERVICE_TIMEOUT_MS: &'static str = "RECOMMENDER_SERVICE_TIMEOUT_MS";
    const ENV_SERVICE_MAX_ATTEMPTS: &'static str = "RECOMMENDER_SERVICE_MAX_ATTEMPTS";
    const ENV_EMBED_BATCH_SIZE: &'static str = "RECOMMENDER_EMBED_BATCH_SIZE";
    const ENV_QUERY_CACHE_CAPACITY: &'static str = "RECOMMENDER_QUERY_CACHE_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            catalog_path: Self::parse_path_from_env(Self::ENV_CATALOG_PATH, defaults.catalog_path),
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            embedding_url: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_dim: Self::parse_num_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim),
            embedding_api_key: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY),
            rerank_model: Self::parse_optional_string_from_env(Self::ENV_RERANK_MODEL),
            rerank_fallback: Self::parse_fallback_from_env(defaults.rerank_fallback)?,
            candidates: Self::parse_num_from_env(Self::ENV_CANDIDATES, defaults.candidates),
            top_k: Self::parse_num_from_env(Self::ENV_TOP_K, defaults.top_k),
            max_candidates: Self::parse_num_from_env(
                Self::ENV_MAX_CANDIDATES,
                defaults.max_candidates,
            ),
            service_timeout_ms: Self::parse_num_from_env(
                Self::ENV_SERVICE_TIMEOUT_MS,
                defaults.service_timeout_ms,
            ),
            service_max_attempts: Self::parse_num_from_env(
                Self::ENV_SERVICE_MAX_ATTEMPTS,
                defaults.service_max_attempts,
            ),
            embed_batch_size: Self::parse_num_from_env(
                Self::ENV_EMBED_BATCH_SIZE,
                defaults.embed_batch_size,
            ),
            query_cache_capacity: Self::parse_num_from_env(
                Self::ENV_QUERY_CACHE_CAPACITY,
                defaults.query_cache_capacity,
            ),
        })
    }

    /// Checks cross-field invariants (does not touch the filesystem beyond the catalog path).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::EmptyCollection);
        }

        for (name, value) in [
            ("top_k", self.top_k),
            ("embedding_dim", self.embedding_dim),
            ("embed_batch_size", self.embed_batch_size),
            ("service_max_attempts", self.service_max_attempts as usize),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { name });
            }
        }

        if self.top_k > self.candidates {
            return Err(ConfigError::TopKExceedsCandidates {
                top_k: self.top_k,
                candidates: self.candidates,
            });
        }

        if self.candidates > self.max_candidates {
            return Err(ConfigError::CandidatesExceedMax {
                candidates: self.candidates,
                max_candidates: self.max_candidates,
            });
        }

        if self.catalog_path.exists() && !self.catalog_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.catalog_path.clone(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Identity recorded in every generation's fingerprint.
    pub fn embedding_identity(&self) -> EmbeddingIdentity {
        EmbeddingIdentity::new(self.embedding_model.clone(), self.embedding_dim)
    }

    /// Retry policy for embedding and reasoning calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_timeout(Duration::from_millis(self.service_timeout_ms))
            .with_max_attempts(self.service_max_attempts)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_fallback_from_env(default: RerankFallback) -> Result<RerankFallback, ConfigError> {
        match Self::parse_optional_string_from_env(Self::ENV_RERANK_FALLBACK) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidRerankFallback { value }),
            None => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_num_from_env<T: std::str::FromStr>(var_name: &str, default: T) -> T {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
