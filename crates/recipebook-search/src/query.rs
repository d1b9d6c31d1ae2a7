//! Wire types for search requests.
//!
//! ```json
//! { "groups": [ { "filters": [
//!     { "type": "name", "operation": "start", "value": "Choco", "case_sensitive": false }
//! ] } ] }
//! ```
//!
//! Field and operation names stay as strings here so that unknown names
//! surface as [`CompileError`](crate::CompileError)s naming the offender
//! rather than as opaque JSON errors.

use serde::{Deserialize, Serialize};

/// A search request: filter groups combined with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub groups: Vec<FilterGroup>,
}

impl SearchQuery {
    /// Create an empty query (matches nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group.
    pub fn with_group(mut self, group: FilterGroup) -> Self {
        self.groups.push(group);
        self
    }
}

/// Filters combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// A single comparison against one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Searchable field name (`name`, `difficulty`, `prep_time`, `rate`, `vegeterian`).
    #[serde(rename = "type")]
    pub field: String,

    /// Operation symbol (`match`, `=`, `start`, `end`, `contain`, `!=`, `<`, `<=`, `>`, `>=`).
    pub operation: String,

    /// Literal operand, parsed according to the field's type.
    #[serde(default)]
    pub value: String,

    /// Only meaningful for text fields; comparisons ignore case by default.
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Filter {
    /// Create a case-insensitive filter.
    pub fn new(
        field: impl Into<String>,
        operation: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operation: operation.into(),
            value: value.into(),
            case_sensitive: false,
        }
    }

    /// Set case sensitivity.
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }
}
