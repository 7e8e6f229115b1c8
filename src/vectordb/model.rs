use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{ScoredPoint, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::normalize::Metadata;

/// Payload stored with every indexed point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub assessment_id: String,
    pub ordinal: u64,
    pub document: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: DocumentPayload,
}

impl VectorPoint {
    pub fn new(id: u64, vector: Vec<f32>, payload: DocumentPayload) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: u64,
    /// Cosine similarity (higher is closer).
    pub score: f32,
    pub payload: DocumentPayload,
}

impl SearchResult {
    /// Converts a Qdrant hit; `None` for non-numeric ids or payloads without the
    /// document fields.
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n,
            _ => return None,
        };

        let payload = match payload_from_qdrant(point.payload) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(point_id = id, error = %e, "Skipping point with unreadable payload");
                return None;
            }
        };

        Some(SearchResult {
            id,
            score: point.score,
            payload,
        })
    }
}

/// Decodes a Qdrant payload map into a [`DocumentPayload`].
pub fn payload_from_qdrant(
    payload: HashMap<String, QdrantValue>,
) -> Result<DocumentPayload, serde_json::Error> {
    let map: serde_json::Map<String, Value> = payload
        .into_iter()
        .map(|(k, v)| (k, qdrant_value_to_json(v)))
        .collect();
    serde_json::from_value(Value::Object(map))
}

fn qdrant_value_to_json(value: QdrantValue) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}

/// Maps cosine similarity onto a non-negative distance (lower is closer).
#[inline]
pub fn similarity_to_distance(similarity: f32) -> f32 {
    (1.0 - similarity).max(0.0)
}
