// File: src/error.rs
// Purpose: Programmer-facing errors (schema construction, session misuse)
//
// User input problems are never errors here; they are data in ValidationResult.

use thiserror::Error;

/// Raised while building a [`Schema`](crate::Schema). Indicates a mistake in the
/// schema definition, never a problem with user input.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("field `{field}` has kind `{kind}` which needs a transform")]
    MissingTransform { field: String, kind: &'static str },

    #[error("cross-field rule `{rule}` attaches to unknown field `{field}`")]
    UnknownAttachTarget { rule: String, field: String },

    #[error("cross-field rule `{rule}` depends on unknown field `{field}`")]
    UnknownDependency { rule: String, field: String },

    #[error("cross-field rule `{0}` declares no dependencies")]
    EmptyDependencies(String),

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid phone digit bounds: min {min}, max {max}")]
    InvalidPhoneShape { min: usize, max: usize },
}

/// Misuse of a [`FormSession`](crate::FormSession).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
}
