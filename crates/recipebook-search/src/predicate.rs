//! Compiled predicates.

use std::fmt;

use crate::field::Column;

/// A compiled search: OR of AND-groups, or explicitly nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches no record. Produced for queries without groups.
    Nothing,
    /// Matches records satisfying at least one conjunction. Never empty.
    Any(Vec<Conjunction>),
}

impl Predicate {
    /// Whether this predicate can match no record by construction.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Predicate::Nothing)
    }

    /// The OR-ed groups (empty for [`Predicate::Nothing`]).
    pub fn groups(&self) -> &[Conjunction] {
        match self {
            Predicate::Nothing => &[],
            Predicate::Any(groups) => groups,
        }
    }
}

/// Conditions that must all hold. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunction(pub Vec<Condition>);

impl Conjunction {
    /// The AND-ed conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }
}

/// A typed comparison against one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: Column,
    pub comparison: Comparison,
}

/// Comparison with its literal operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Text {
        op: TextOp,
        value: String,
        case_sensitive: bool,
    },
    Integer {
        op: CmpOp,
        value: i64,
    },
    Boolean {
        value: bool,
    },
}

/// Text matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

/// Relational operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// SQL spelling of the operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Nothing => f.write_str("<nothing>"),
            Predicate::Any(groups) => {
                for (i, group) in groups.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" OR ")?;
                    }
                    write!(f, "({group})")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comparison {
            Comparison::Text {
                op,
                value,
                case_sensitive,
            } => {
                let op = match op {
                    TextOp::Equals => "equals",
                    TextOp::StartsWith => "starts with",
                    TextOp::EndsWith => "ends with",
                    TextOp::Contains => "contains",
                };
                let case = if *case_sensitive { "" } else { " (ci)" };
                write!(f, "{} {op}{case} {value:?}", self.column)
            }
            Comparison::Integer { op, value } => {
                write!(f, "{} {} {value}", self.column, op.as_sql())
            }
            Comparison::Boolean { value } => write!(f, "{} = {value}", self.column),
        }
    }
}
