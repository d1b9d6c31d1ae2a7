//! Compile errors.
//!
//! All variants are input-validation failures: they are raised before any
//! storage access and name the offending field, operation or value.

use thiserror::Error;

/// Errors produced while compiling a search query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The filter targets a field that is not searchable.
    #[error("filter type '{field}' is not supported")]
    InvalidField { field: String },

    /// The operation is not allowed for the field's type.
    #[error("filter operation '{operation}' is not supported for '{field}'")]
    UnsupportedOperation { field: String, operation: String },

    /// The value does not parse as the field's type, or is out of range.
    #[error("filter value '{value}' for '{field}' is invalid: {reason}")]
    InvalidFilterValue {
        field: String,
        value: String,
        reason: String,
    },

    /// A group has no filters. Rejected so that it cannot widen the query to
    /// the whole catalog.
    #[error("filter group {index} has no filters")]
    EmptyGroup { index: usize },
}

/// Result type for query compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
