//! Engine error types
//!
//! Client-input failures (unknown fields, bad formats, operator mismatches)
//! surface immediately with the offending field and operator/value; storage
//! failures propagate unchanged. Field-level mutation validation errors are
//! not represented here — they accumulate into
//! [MutationResult](crate::mutation::MutationResult) and return as a normal
//! result.

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors produced by the query and mutation engine
#[derive(Debug, Error)]
pub enum EngineError {
    // ==================
    // Request-level rejections
    // ==================
    /// No authenticated identity on the request
    #[error("authentication required")]
    Unauthenticated,

    /// Entity type not present in the schema registry
    #[error("unknown entity type '{0}'")]
    UnknownEntity(String),

    /// Record not found for a lookup or mutation
    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    // ==================
    // Client-input errors
    // ==================
    /// Field name not declared on the entity type
    #[error("unknown field '{field}' on entity '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Raw value does not match the declared value type's format
    #[error("invalid value for field '{field}': {message}")]
    InvalidFormat { field: String, message: String },

    /// Operator not valid for the value's effective type
    #[error("can't use operator {operator} with value type {value_type}")]
    OperatorMismatch {
        operator: &'static str,
        value_type: String,
    },

    /// Malformed filter tree (empty combinator, bad structured-field value)
    #[error("invalid filter: {0}")]
    InvalidFilterShape(String),

    /// Filter tree exceeded the recursion ceiling
    #[error("filter tree exceeds maximum depth of {limit}")]
    FilterTooDeep { limit: usize },

    /// Page size must be a positive integer
    #[error("invalid page size {0}")]
    InvalidPageSize(i64),

    // ==================
    // Server-side errors
    // ==================
    /// Storage backend failure, propagated unchanged
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Write-transform hook or other internal failure
    #[error("internal error: {0}")]
    Internal(String),
}
