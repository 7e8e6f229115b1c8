use std::path::PathBuf;
use thiserror::Error;

use crate::normalize::NormalizeError;

/// Errors that prevent a catalog snapshot from being read at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No catalog at the expected location.
    #[error("catalog not found at {path}")]
    DataNotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extension is neither `.csv` nor `.json`.
    #[error("unsupported catalog format: {path} (expected .csv or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid CSV catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON catalog whose top level is not an array of objects.
    #[error("invalid JSON catalog: {reason}")]
    Shape { reason: String },
}

/// Why a single catalog row was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error(transparent)]
    Malformed(#[from] NormalizeError),

    #[error("unknown test type label '{label}'")]
    UnknownTestType { label: String },

    #[error("duplicate url (first seen in row {first_row})")]
    DuplicateUrl { first_row: usize },
}
