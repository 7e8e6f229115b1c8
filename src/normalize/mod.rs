//! Result normalization into the canonical output schema.
//!
//! Catalog sources and older index generations store display fields in several shapes
//! (`test_type` as `"['A', 'B']"` text or as a list, `duration` as `"7.0"` or `7`, support
//! flags as booleans or `"Yes"`). [`normalize_metadata`] maps all of them onto
//! [`CanonicalRecommendation`]. The transform is pure and idempotent:
//! normalizing [`CanonicalRecommendation::to_metadata`] yields the same record.

pub mod coerce;
pub mod error;

#[cfg(test)]
mod tests;

pub use coerce::{
    coerce_duration, coerce_support, coerce_test_types, is_truthy, split_legacy_list,
};
pub use error::NormalizeError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rerank::Recommendation;

/// Display-field snapshot stored alongside every indexed document.
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata keys shared by the indexer, the retriever and the normalizer.
pub mod fields {
    pub const NAME: &str = "name";
    pub const URL: &str = "url";
    pub const DESCRIPTION: &str = "description";
    pub const DURATION: &str = "duration";
    pub const TEST_TYPE: &str = "test_type";
    pub const REMOTE_SUPPORT: &str = "remote_support";
    pub const ADAPTIVE_SUPPORT: &str = "adaptive_support";
}

/// Final output record. Field order matches the public response schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecommendation {
    pub url: String,
    pub name: String,
    pub adaptive_support: String,
    pub description: String,
    pub duration: u32,
    pub remote_support: String,
    pub test_type: Vec<String>,
}

impl CanonicalRecommendation {
    /// Converts back into a metadata map (the input shape of [`normalize_metadata`]).
    pub fn to_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(fields::URL.into(), Value::from(self.url.clone()));
        metadata.insert(fields::NAME.into(), Value::from(self.name.clone()));
        metadata.insert(
            fields::ADAPTIVE_SUPPORT.into(),
            Value::from(self.adaptive_support.clone()),
        );
        metadata.insert(
            fields::DESCRIPTION.into(),
            Value::from(self.description.clone()),
        );
        metadata.insert(fields::DURATION.into(), Value::from(self.duration));
        metadata.insert(
            fields::REMOTE_SUPPORT.into(),
            Value::from(self.remote_support.clone()),
        );
        metadata.insert(
            fields::TEST_TYPE.into(),
            Value::Array(self.test_type.iter().cloned().map(Value::from).collect()),
        );
        metadata
    }
}

/// Normalizes a ranked recommendation.
pub fn normalize(raw: &Recommendation) -> Result<CanonicalRecommendation, NormalizeError> {
    normalize_metadata(&raw.candidate.metadata)
}

/// Normalizes a raw metadata snapshot.
pub fn normalize_metadata(metadata: &Metadata) -> Result<CanonicalRecommendation, NormalizeError> {
    let url = coerce::required_text(metadata.get(fields::URL), fields::URL)?;
    let name = coerce::required_text(metadata.get(fields::NAME), fields::NAME)?;
    let description = coerce::coerce_text(metadata.get(fields::DESCRIPTION)).unwrap_or_default();

    Ok(CanonicalRecommendation {
        url,
        name,
        adaptive_support: coerce_support(metadata.get(fields::ADAPTIVE_SUPPORT)).to_string(),
        description,
        duration: coerce_duration(metadata.get(fields::DURATION)),
        remote_support: coerce_support(metadata.get(fields::REMOTE_SUPPORT)).to_string(),
        test_type: coerce_test_types(metadata.get(fields::TEST_TYPE))?,
    })
}
