//! Required column checks.
//!
//! Every configured column must be among the table's declared keys.

use std::any::Any;

use outguard_error::{ErrorCode, OutputError, ValidationErrorBuilder, Violation};
use serde_json::Value as Json;

use crate::subject::Table;
use crate::validator::{PerformanceAware, Validator, narrow};

/// Fails when any required column is missing from the table keys.
#[derive(Debug, Clone)]
pub struct RequiredColumnsValidator {
    columns: Vec<String>,
}

impl RequiredColumnsValidator {
    pub const NAME: &'static str = "required_columns";

    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Validator for RequiredColumnsValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        let table = narrow::<Table>(subject, Self::NAME)?;

        let missing: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|column| !table.has_key(column))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let violations = missing.iter().map(|column| {
            Violation::new(
                *column,
                Json::Null,
                "required",
                format!("required column '{column}' is missing"),
            )
        });
        let suggestions = missing
            .iter()
            .map(|column| format!("Add column '{column}' to the table"));

        Err(ValidationErrorBuilder::new(
            ErrorCode::MISSING_COLUMN,
            format!("missing required columns: {}", missing.join(", ")),
        )
        .with_operation(Self::NAME)
        .with_violations(violations)
        .with_suggestions(suggestions)
        .build())
    }

    fn performance(&self) -> Option<&dyn PerformanceAware> {
        Some(self)
    }
}

impl PerformanceAware for RequiredColumnsValidator {
    fn estimated_cost(&self) -> u32 {
        2
    }

    fn fail_fast(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_each_missing_column() {
        let table = Table::new(["Name", "Age"]);
        let validator = RequiredColumnsValidator::new(["Name", "Age", "Email", "Phone"]);

        let err = validator.validate(&table).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["Email", "Phone"]);
        assert_eq!(err.code(), &ErrorCode::MISSING_COLUMN);
        assert_eq!(err.suggestions().len(), 2);
        assert!(err.is_composite());
    }

    #[test]
    fn test_passes_when_all_present() {
        let table = Table::new(["Name", "Age"]);
        assert!(RequiredColumnsValidator::new(["Age"]).validate(&table).is_ok());
    }
}
