//! Error types for the validator

use thiserror::Error;

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Hard failures of a validate call
///
/// These indicate a malformed schema or a broken registry, not invalid data.
/// Data non-conformance is reported through
/// [`ValidationResult`](crate::ValidationResult) and never as a `SchemaError`.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unresolvable $ref: {reference}")]
    RefNotFound { reference: String },

    #[error("cyclic $ref chain at: {reference}")]
    CyclicRef { reference: String },

    #[error("$ref chain exceeded depth limit of {limit}: {reference}")]
    RefDepthExceeded { reference: String, limit: usize },

    #[error("invalid pattern in schema: {0}")]
    InvalidPattern(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
