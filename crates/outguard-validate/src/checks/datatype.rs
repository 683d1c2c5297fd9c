//! Column data type checks.

use std::any::Any;
use std::collections::BTreeMap;

use outguard_error::{ErrorCode, OutputError, ValidationErrorBuilder, Violation, cell_path};

use crate::subject::{Table, ValueKind};
use crate::validator::{PerformanceAware, Validator, narrow};

/// Checks every record's typed columns against an expected kind.
///
/// All mismatches across all rows are collected into one error. A null at a
/// typed column is a mismatch unless the expected kind is [`ValueKind::Any`].
/// Columns absent from a record are left to the malformed-data check.
#[derive(Debug, Clone, Default)]
pub struct DataTypeValidator {
    types: BTreeMap<String, ValueKind>,
}

impl DataTypeValidator {
    pub const NAME: &'static str = "data_type";

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>, kind: ValueKind) -> Self {
        self.types.insert(column.into(), kind);
        self
    }

    pub fn from_map(types: BTreeMap<String, ValueKind>) -> Self {
        Self { types }
    }
}

impl Validator for DataTypeValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        let table = narrow::<Table>(subject, Self::NAME)?;
        let mut violations = Vec::new();

        for (idx, record) in table.rows() {
            for (column, expected) in &self.types {
                let Some(value) = record.get(column) else {
                    continue;
                };
                let actual = value.kind();
                if expected.accepts(actual) {
                    continue;
                }
                violations.push(Violation::new(
                    cell_path("row", idx, column),
                    value.to_json(),
                    "data_type",
                    format!("expected {expected}, got {actual}"),
                ));
            }
        }

        if violations.is_empty() {
            return Ok(());
        }

        let mut columns: Vec<&str> = Vec::new();
        for violation in &violations {
            let column = violation.field.rsplit('.').next().unwrap_or(&violation.field);
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        let suggestions: Vec<String> = columns
            .iter()
            .filter_map(|column| {
                self.types
                    .get(*column)
                    .map(|kind| format!("Convert values in column '{column}' to {kind}"))
            })
            .collect();

        Err(ValidationErrorBuilder::new(
            ErrorCode::INVALID_DATA_TYPE,
            format!("{} values have an unexpected data type", violations.len()),
        )
        .with_operation(Self::NAME)
        .with_suggestions(suggestions)
        .with_violations(violations)
        .build())
    }

    fn performance(&self) -> Option<&dyn PerformanceAware> {
        Some(self)
    }
}

impl PerformanceAware for DataTypeValidator {
    fn estimated_cost(&self) -> u32 {
        10
    }

    fn fail_fast(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Value;

    fn people() -> Table {
        let mut table = Table::new(["Name", "Age", "Score"]);
        table.push([
            ("Name", Value::from("Ada")),
            ("Age", Value::from(36i32)),
            ("Score", Value::from(9.5)),
        ]);
        table.push([
            ("Name", Value::from("Grace")),
            ("Age", Value::from("old")),
            ("Score", Value::Null),
        ]);
        table
    }

    #[test]
    fn test_collects_all_mismatches() {
        let validator = DataTypeValidator::new()
            .with_column("Age", ValueKind::Int)
            .with_column("Score", ValueKind::Float);

        let err = validator.validate(&people()).unwrap_err();
        let messages: Vec<(&str, &str)> = err
            .violations()
            .iter()
            .map(|v| (v.field.as_str(), v.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![
                ("row[1].Age", "expected int, got string"),
                ("row[1].Score", "expected float, got nil"),
            ]
        );
    }

    #[test]
    fn test_numeric_widths_are_interchangeable() {
        let validator = DataTypeValidator::new().with_column("Score", ValueKind::Int);
        let mut table = Table::new(["Score"]);
        table.push([("Score", 1.25f32)]);
        table.push([("Score", 7u8)]);
        assert!(validator.validate(&table).is_ok());
    }

    #[test]
    fn test_any_matches_null() {
        let validator = DataTypeValidator::new().with_column("Score", ValueKind::Any);
        assert!(validator.validate(&people()).is_ok());
    }

    #[test]
    fn test_type_mismatch_on_wrong_subject() {
        let err = DataTypeValidator::new().validate(&"text").unwrap_err();
        assert_eq!(err.code(), &ErrorCode::INVALID_DATA_TYPE);
        assert!(err.violations().is_empty());
    }
}
