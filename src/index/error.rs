use thiserror::Error;

use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum IndexError {
    /// No generation has been published under the alias yet.
    #[error("no index generation is available under '{alias}'")]
    Unavailable { alias: String },

    /// The published generation was built with a different collection or embedder.
    #[error(
        "index fingerprint mismatch for '{collection}': expected digest {expected}, found {found}"
    )]
    FingerprintMismatch {
        collection: String,
        expected: String,
        found: String,
    },

    /// The alias points at a collection whose name does not follow the generation layout.
    #[error("alias '{alias}' points at unrecognized collection '{collection}'")]
    UnrecognizedCollection { alias: String, collection: String },

    #[error(transparent)]
    VectorDb(#[from] VectorDbError),
}
