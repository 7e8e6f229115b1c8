//! Qdrant vector database integration.
//!
//! One collection per index generation; the alias names whichever generation is current.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantClient, VectorDbClient};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorDbClient, cosine_similarity};
pub use model::{DocumentPayload, SearchResult, VectorPoint, similarity_to_distance};
