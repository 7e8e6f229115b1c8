//! Field-level coercion rules.
//!
//! Each rule is total over well-formed input and a fixed point over its own output.

use serde_json::Value;

use super::error::NormalizeError;
use crate::constants::{SUPPORT_NO, SUPPORT_YES};

/// Characters stripped from the legacy textual list form (`"['A', 'B']"`).
const LEGACY_LIST_DELIMITERS: [char; 4] = ['[', ']', '\'', '"'];

/// Coerces a stored `test_type` value into an ordered list of labels.
pub fn coerce_test_types(value: Option<&Value>) -> Result<Vec<String>, NormalizeError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(split_legacy_list(s)),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|label| !label.is_empty())
            .collect()),
        Some(Value::Bool(b)) => Ok(vec![b.to_string()]),
        Some(Value::Number(n)) => Ok(vec![n.to_string()]),
        Some(Value::Object(_)) => Err(NormalizeError::UnsupportedShape {
            field: "test_type",
            found: "object",
        }),
    }
}

/// Splits the legacy bracket/quote-delimited list form.
///
/// A plain label without delimiters yields a single-element list.
pub fn split_legacy_list(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !LEGACY_LIST_DELIMITERS.contains(c))
        .collect();

    cleaned
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coerces a stored duration into whole minutes (truncating, never negative).
pub fn coerce_duration(value: Option<&Value>) -> u32 {
    let minutes = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match minutes {
        Some(m) if m.is_finite() && m > 0.0 => m.trunc() as u32,
        _ => 0,
    }
}

/// Returns `true` for the affirmative spellings used across catalog sources.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v == 1.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        _ => false,
    }
}

/// Coerces a support flag into the canonical `"Yes"` / `"No"` literal.
pub fn coerce_support(value: Option<&Value>) -> &'static str {
    if is_truthy(value) { SUPPORT_YES } else { SUPPORT_NO }
}

/// Renders a scalar as text; `None` for null, missing, arrays and objects.
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// Required, trimmed, non-empty text field.
pub fn required_text(value: Option<&Value>, field: &'static str) -> Result<String, NormalizeError> {
    match value {
        Some(Value::Array(_)) => Err(NormalizeError::UnsupportedShape {
            field,
            found: "array",
        }),
        Some(Value::Object(_)) => Err(NormalizeError::UnsupportedShape {
            field,
            found: "object",
        }),
        other => coerce_text(other)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(NormalizeError::MissingField { field }),
    }
}
