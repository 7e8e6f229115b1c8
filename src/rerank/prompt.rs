//! Prompt construction and reply parsing for LLM reranking.

use std::collections::HashSet;

use serde_json::{Value, json};

use crate::constants::RERANK_DESCRIPTION_CHARS;
use crate::normalize::{coerce, fields};
use crate::retriever::Candidate;

const SYSTEM_PROMPT: &str = "You rank hiring assessments for a recruiter's request. \
Consider required skills, seniority, test categories, duration limits and remote or \
adaptive requirements stated in the request. Reply with JSON only, in the form \
{\"ranking\": [candidate indices, most relevant first]}. Leave out assessments that do \
not fit. Do not invent indices.";

/// A rendered reranking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerankPrompt {
    pub system: String,
    pub user: String,
    /// Number of candidates listed; valid indices are `0..candidate_count`.
    pub candidate_count: usize,
    pub top_k: usize,
}

impl RerankPrompt {
    pub fn new(query: &str, candidates: &[Candidate], top_k: usize) -> Self {
        let listing: Vec<Value> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| candidate_summary(index, candidate))
            .collect();

        let user = format!(
            "Request: {query}\n\nReturn at most {top_k} indices.\n\nCandidates:\n{}",
            serde_json::to_string_pretty(&listing).unwrap_or_else(|_| "[]".to_string())
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
            candidate_count: candidates.len(),
            top_k,
        }
    }
}

fn candidate_summary(index: usize, candidate: &Candidate) -> Value {
    let metadata = &candidate.metadata;
    let description: String = coerce::coerce_text(metadata.get(fields::DESCRIPTION))
        .unwrap_or_default()
        .chars()
        .take(RERANK_DESCRIPTION_CHARS)
        .collect();

    json!({
        "index": index,
        "name": coerce::coerce_text(metadata.get(fields::NAME)).unwrap_or_default(),
        "test_type": coerce::coerce_test_types(metadata.get(fields::TEST_TYPE)).unwrap_or_default(),
        "duration_minutes": coerce::coerce_duration(metadata.get(fields::DURATION)),
        "remote_support": coerce::coerce_support(metadata.get(fields::REMOTE_SUPPORT)),
        "adaptive_support": coerce::coerce_support(metadata.get(fields::ADAPTIVE_SUPPORT)),
        "description": description,
    })
}

/// Extracts candidate indices from a reasoning-service reply.
///
/// Accepts `{"ranking": [...]}` (also under `indices`/`order`) or a bare array, optionally
/// wrapped in a code fence or surrounded by prose. Indices may be numbers or numeric
/// strings. Out-of-range and repeated indices are dropped; order is preserved.
/// Returns `None` when no JSON ranking can be found.
pub fn parse_ranking(reply: &str, candidate_count: usize) -> Option<Vec<usize>> {
    let body = strip_code_fence(reply);
    let value = first_json_value(body)?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => ["ranking", "indices", "order"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))?,
        _ => return None,
    };

    let mut seen = HashSet::new();
    Some(
        items
            .iter()
            .filter_map(index_of)
            .filter(|&i| i < candidate_count && seen.insert(i))
            .collect(),
    )
}

fn index_of(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("index").and_then(index_of),
        _ => None,
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.rsplit_once("```").map_or(rest, |(body, _)| body).trim()
}

/// Parses the first complete JSON object or array embedded in `text`.
fn first_json_value(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .find_map(|(start, _)| {
            serde_json::Deserializer::from_str(&text[start..])
                .into_iter::<Value>()
                .next()
                .and_then(Result::ok)
                .filter(|v| v.is_object() || v.is_array())
        })
}
