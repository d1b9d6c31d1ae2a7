//! Search query compiler for the recipe catalog.
//!
//! A [`SearchQuery`] is an OR of [`FilterGroup`]s, each an AND of [`Filter`]s.
//! [`FilterCompiler::compile`] validates it against a fixed field table and
//! produces a [`Predicate`]: a tree of column comparisons whose literal values
//! are carried as typed data, ready to be bound as statement parameters by the
//! storage layer. Filter values are never turned into query text here.
//!
//! A query without groups compiles to [`Predicate::Nothing`], which matches no
//! records.
//!
//! ```rust
//! use recipebook_search::{Filter, FilterCompiler, FilterGroup, SearchQuery};
//!
//! let query = SearchQuery::new()
//!     .with_group(FilterGroup::new().with_filter(Filter::new("name", "start", "Choco")));
//!
//! let predicate = FilterCompiler::new().compile(&query).unwrap();
//! assert!(!predicate.is_nothing());
//! ```

mod compile;
mod error;
mod field;
mod predicate;
mod query;

pub use compile::{FilterCompiler, parse_bool_literal};
pub use error::{CompileError, Result};
pub use field::{Column, FIELDS, FieldKind, FieldSpec};
pub use predicate::{CmpOp, Comparison, Condition, Conjunction, Predicate, TextOp};
pub use query::{Filter, FilterGroup, SearchQuery};
