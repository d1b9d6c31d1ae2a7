//! Rendering of compiled search predicates to SQL.
//!
//! Column names and operators come from closed enums; every literal is
//! emitted as a positional placeholder with its value in [`SqlFilter::params`].
//! Case-insensitive text matching lowercases both sides with the connection's
//! `casefold` function, so it folds non-ASCII letters too.

use rusqlite::types::Value;

use recipebook_search::{Comparison, Condition, Predicate, TextOp};

use crate::store::CASEFOLD_FN;

/// A WHERE clause body plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

impl SqlFilter {
    /// Render a predicate. [`Predicate::Nothing`] becomes `1 = 0`.
    pub fn from_predicate(predicate: &Predicate) -> Self {
        let mut params = Vec::new();

        let clause = match predicate {
            Predicate::Nothing => "1 = 0".to_string(),
            Predicate::Any(groups) => groups
                .iter()
                .map(|group| {
                    let conditions: Vec<String> = group
                        .conditions()
                        .iter()
                        .map(|condition| render_condition(condition, &mut params))
                        .collect();
                    format!("({})", conditions.join(" AND "))
                })
                .collect::<Vec<_>>()
                .join(" OR "),
        };

        Self { clause, params }
    }
}

fn render_condition(condition: &Condition, params: &mut Vec<Value>) -> String {
    let column = condition.column.as_str();

    match &condition.comparison {
        Comparison::Text {
            op,
            value,
            case_sensitive: true,
        } => {
            if *op == TextOp::Equals {
                params.push(Value::Text(value.clone()));
                return format!("{column} = ?{}", params.len());
            }
            let escaped = escape_glob(value);
            let pattern = match op {
                TextOp::StartsWith => format!("{escaped}*"),
                TextOp::EndsWith => format!("*{escaped}"),
                _ => format!("*{escaped}*"),
            };
            params.push(Value::Text(pattern));
            format!("{column} GLOB ?{}", params.len())
        }
        Comparison::Text {
            op,
            value,
            case_sensitive: false,
        } => {
            let escaped = escape_like(&value.to_lowercase());
            let pattern = match op {
                TextOp::Equals => escaped,
                TextOp::StartsWith => format!("{escaped}%"),
                TextOp::EndsWith => format!("%{escaped}"),
                TextOp::Contains => format!("%{escaped}%"),
            };
            params.push(Value::Text(pattern));
            format!(
                "{CASEFOLD_FN}({column}) LIKE ?{} ESCAPE '\\'",
                params.len()
            )
        }
        Comparison::Integer { op, value } => {
            params.push(Value::Integer(*value));
            format!("{column} {} ?{}", op.as_sql(), params.len())
        }
        Comparison::Boolean { value } => {
            params.push(Value::Integer(i64::from(*value)));
            format!("{column} = ?{}", params.len())
        }
    }
}

/// Escape LIKE wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape GLOB wildcards by wrapping them in single-character classes.
fn escape_glob(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => out.push_str("[*]"),
            '?' => out.push_str("[?]"),
            '[' => out.push_str("[[]"),
            _ => out.push(c),
        }
    }
    out
}
