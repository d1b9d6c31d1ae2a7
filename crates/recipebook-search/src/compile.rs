//! Query compilation.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CompileError, Result};
use crate::field::{FIELDS, FieldKind, FieldSpec};
use crate::predicate::{CmpOp, Comparison, Condition, Conjunction, Predicate, TextOp};
use crate::query::{Filter, SearchQuery};

/// Validates search queries against the field table.
///
/// Holds a name index over [`FIELDS`]; build it once and share it.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    fields: HashMap<&'static str, &'static FieldSpec>,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterCompiler {
    /// Build a compiler over the standard field table.
    pub fn new() -> Self {
        let fields = FIELDS.iter().map(|spec| (spec.name, spec)).collect();
        Self { fields }
    }

    /// Compile a query into a predicate.
    ///
    /// Zero groups yields [`Predicate::Nothing`]. A group with zero filters is
    /// an error. Any other failure names the offending field, operation or
    /// value.
    pub fn compile(&self, query: &SearchQuery) -> Result<Predicate> {
        if query.groups.is_empty() {
            debug!("Search query has no groups, matching nothing");
            return Ok(Predicate::Nothing);
        }

        let mut groups = Vec::with_capacity(query.groups.len());
        for (index, group) in query.groups.iter().enumerate() {
            if group.filters.is_empty() {
                return Err(CompileError::EmptyGroup { index });
            }

            let conditions = group
                .filters
                .iter()
                .map(|filter| self.compile_filter(filter))
                .collect::<Result<Vec<_>>>()?;
            groups.push(Conjunction(conditions));
        }

        let predicate = Predicate::Any(groups);
        debug!(%predicate, "Compiled search query");
        Ok(predicate)
    }

    fn compile_filter(&self, filter: &Filter) -> Result<Condition> {
        let spec = self
            .fields
            .get(filter.field.as_str())
            .ok_or_else(|| CompileError::InvalidField {
                field: filter.field.clone(),
            })?;

        let comparison = match spec.kind {
            FieldKind::Text => Comparison::Text {
                op: text_op(filter)?,
                value: filter.value.clone(),
                case_sensitive: filter.case_sensitive,
            },
            FieldKind::Integer { min, max } => Comparison::Integer {
                op: cmp_op(filter)?,
                value: parse_integer(filter, min, max)?,
            },
            FieldKind::Boolean => {
                if filter.operation != "=" {
                    return Err(unsupported(filter));
                }
                Comparison::Boolean {
                    value: parse_bool(filter)?,
                }
            }
        };

        Ok(Condition {
            column: spec.column,
            comparison,
        })
    }
}

fn text_op(filter: &Filter) -> Result<TextOp> {
    match filter.operation.as_str() {
        "match" | "=" => Ok(TextOp::Equals),
        "start" => Ok(TextOp::StartsWith),
        "end" => Ok(TextOp::EndsWith),
        "contain" => Ok(TextOp::Contains),
        _ => Err(unsupported(filter)),
    }
}

fn cmp_op(filter: &Filter) -> Result<CmpOp> {
    match filter.operation.as_str() {
        "=" => Ok(CmpOp::Eq),
        "!=" => Ok(CmpOp::Ne),
        "<" => Ok(CmpOp::Lt),
        "<=" => Ok(CmpOp::Le),
        ">" => Ok(CmpOp::Gt),
        ">=" => Ok(CmpOp::Ge),
        _ => Err(unsupported(filter)),
    }
}

fn parse_integer(filter: &Filter, min: i64, max: i64) -> Result<i64> {
    let value: i64 = filter
        .value
        .trim()
        .parse()
        .map_err(|_| invalid_value(filter, "not an integer"))?;

    if value < min || value > max {
        return Err(invalid_value(
            filter,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(value)
}

/// Parse a boolean literal: `1 t T TRUE true True` or `0 f F FALSE false False`.
pub fn parse_bool_literal(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn parse_bool(filter: &Filter) -> Result<bool> {
    parse_bool_literal(&filter.value).ok_or_else(|| invalid_value(filter, "not a boolean"))
}

fn unsupported(filter: &Filter) -> CompileError {
    CompileError::UnsupportedOperation {
        field: filter.field.clone(),
        operation: filter.operation.clone(),
    }
}

fn invalid_value(filter: &Filter, reason: impl Into<String>) -> CompileError {
    CompileError::InvalidFilterValue {
        field: filter.field.clone(),
        value: filter.value.clone(),
        reason: reason.into(),
    }
}
