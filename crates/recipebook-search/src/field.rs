//! The searchable field table.

use std::fmt;

/// Storage column a filter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Difficulty,
    PrepTime,
    Rating,
    Vegetarian,
}

impl Column {
    /// Column name in the catalog's result set.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Difficulty => "difficulty",
            Column::PrepTime => "prep_time",
            Column::Rating => "rating",
            Column::Vegetarian => "vegetarian",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type class of a searchable field, which decides the allowed operations and
/// how the value is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text: `match`/`=`, `start`, `end`, `contain`.
    Text,
    /// Integer within an inclusive range: `=`, `!=`, `<`, `<=`, `>`, `>=`.
    Integer { min: i64, max: i64 },
    /// Boolean literal: `=` only.
    Boolean,
}

/// One entry of the field table: wire name, column, type class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub column: Column,
    pub kind: FieldKind,
}

/// Every field a search query may reference.
pub static FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        name: "name",
        column: Column::Name,
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "difficulty",
        column: Column::Difficulty,
        kind: FieldKind::Integer { min: 1, max: 3 },
    },
    FieldSpec {
        name: "prep_time",
        column: Column::PrepTime,
        kind: FieldKind::Integer {
            min: 0,
            max: i32::MAX as i64,
        },
    },
    FieldSpec {
        name: "rate",
        column: Column::Rating,
        kind: FieldKind::Integer { min: 0, max: 5 },
    },
    FieldSpec {
        name: "vegeterian",
        column: Column::Vegetarian,
        kind: FieldKind::Boolean,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_unique() {
        let names: HashSet<_> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), FIELDS.len());
    }

    #[test]
    fn test_integer_ranges_are_well_formed() {
        for spec in &FIELDS {
            if let FieldKind::Integer { min, max } = spec.kind {
                assert!(min <= max, "bad range for {}", spec.name);
            }
        }
    }
}
