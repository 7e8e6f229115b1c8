use thiserror::Error;

/// A record that cannot be brought into canonical shape even after coercion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// A required display field is absent or blank.
    #[error("malformed metadata: missing required field '{field}'")]
    MissingField {
        /// Field name.
        field: &'static str,
    },

    /// A field holds a JSON shape no coercion rule accepts.
    #[error("malformed metadata: field '{field}' cannot be coerced from {found}")]
    UnsupportedShape {
        /// Field name.
        field: &'static str,
        /// JSON kind that was found.
        found: &'static str,
    },
}
