//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Unknown reranker fallback policy name.
    #[error("invalid rerank fallback '{value}': expected 'retrieval-order' or 'fail'")]
    InvalidRerankFallback { value: String },

    /// A count or size that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    #[error("top_k ({top_k}) must not exceed candidates ({candidates})")]
    TopKExceedsCandidates { top_k: usize, candidates: usize },

    #[error("candidates ({candidates}) must not exceed max_candidates ({max_candidates})")]
    CandidatesExceedMax {
        candidates: usize,
        max_candidates: usize,
    },

    /// The collection alias is blank.
    #[error("collection name must not be empty")]
    EmptyCollection,

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },
}
