//! Row-level constraints.
//!
//! A [`Constraint`] is a named check over a single record. The
//! [`ConstraintValidator`] runs every registered constraint against every
//! present record and reports each failure as a violation on `row[index]`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use outguard_error::{ErrorCode, OutputError, ValidationErrorBuilder, Violation, row_path};

use crate::subject::{Record, Table, Value, record_to_json};
use crate::validator::{PerformanceAware, Validator, narrow};

type CheckFn = dyn Fn(&Record) -> Result<(), String> + Send + Sync;

/// A named check over a single record.
#[derive(Clone)]
pub struct Constraint {
    name: String,
    description: String,
    check: Arc<CheckFn>,
}

impl Constraint {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn check(&self, record: &Record) -> Result<(), String> {
        (self.check)(record)
    }

    /// Rejects values ≤ 0 and anything non-numeric.
    pub fn positive_number(field: impl Into<String>) -> Self {
        let field = field.into();
        let description = format!("{field} is a positive number");
        Self::new("positive_number", description, move |record| {
            match record.get(&field).and_then(Value::as_f64) {
                Some(n) if n > 0.0 => Ok(()),
                Some(n) => Err(format!("{field} must be positive, got {n}")),
                None => Err(format!("{field} must be a number, got {}", shown(record, &field))),
            }
        })
    }

    /// Rejects blank or whitespace-only strings and anything non-string.
    pub fn non_empty_string(field: impl Into<String>) -> Self {
        let field = field.into();
        let description = format!("{field} is a non-empty string");
        Self::new("non_empty_string", description, move |record| {
            match record.get(&field) {
                Some(Value::Text(s)) if !s.trim().is_empty() => Ok(()),
                Some(Value::Text(_)) => Err(format!("{field} must not be empty")),
                _ => Err(format!("{field} must be a string, got {}", shown(record, &field))),
            }
        })
    }

    /// Accepts numbers in `[min, max]`, inclusive.
    pub fn numeric_range(field: impl Into<String>, min: f64, max: f64) -> Self {
        let field = field.into();
        let description = format!("{field} is between {min} and {max}");
        Self::new("numeric_range", description, move |record| {
            match record.get(&field).and_then(Value::as_f64) {
                Some(n) if (min..=max).contains(&n) => Ok(()),
                Some(n) => Err(format!("{field} must be between {min} and {max}, got {n}")),
                None => Err(format!("{field} must be a number, got {}", shown(record, &field))),
            }
        })
    }
}

fn shown(record: &Record, field: &str) -> String {
    record
        .get(field)
        .map_or_else(|| "nothing".to_string(), ToString::to_string)
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Runs registered constraints against every record.
#[derive(Debug, Clone, Default)]
pub struct ConstraintValidator {
    constraints: Vec<Constraint>,
}

impl ConstraintValidator {
    pub const NAME: &'static str = "constraints";

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

impl Validator for ConstraintValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        let table = narrow::<Table>(subject, Self::NAME)?;
        let mut violations = Vec::new();
        let mut failed = vec![false; self.constraints.len()];

        for (idx, record) in table.rows() {
            for (slot, constraint) in self.constraints.iter().enumerate() {
                if let Err(message) = constraint.check(record) {
                    failed[slot] = true;
                    violations.push(Violation::new(
                        row_path("row", idx),
                        record_to_json(record),
                        constraint.name(),
                        message,
                    ));
                }
            }
        }

        if violations.is_empty() {
            return Ok(());
        }

        let mut suggestions: Vec<String> = Vec::new();
        for (constraint, _) in self.constraints.iter().zip(&failed).filter(|(_, f)| **f) {
            let suggestion = format!("Ensure {}", constraint.description);
            if !suggestions.contains(&suggestion) {
                suggestions.push(suggestion);
            }
        }

        Err(ValidationErrorBuilder::new(
            ErrorCode::CONSTRAINT_VIOLATION,
            format!("{} constraint violations found", violations.len()),
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

impl PerformanceAware for ConstraintValidator {
    fn estimated_cost(&self) -> u32 {
        20
    }

    fn fail_fast(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[(&str, Value)]) -> Record {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_positive_number() {
        let c = Constraint::positive_number("Qty");
        assert!(c.check(&record(&[("Qty", Value::Int(3))])).is_ok());
        assert_eq!(
            c.check(&record(&[("Qty", Value::Int(0))])),
            Err("Qty must be positive, got 0".to_string())
        );
        assert!(c.check(&record(&[("Qty", Value::from("3"))])).is_err());
        assert!(c.check(&record(&[])).is_err());
    }

    #[test]
    fn test_non_empty_string() {
        let c = Constraint::non_empty_string("Name");
        assert!(c.check(&record(&[("Name", Value::from("Ada"))])).is_ok());
        assert!(c.check(&record(&[("Name", Value::from(" \t "))])).is_err());
        assert!(c.check(&record(&[("Name", Value::Int(1))])).is_err());
    }

    #[test]
    fn test_numeric_range_is_inclusive() {
        let c = Constraint::numeric_range("Pct", 0.0, 100.0);
        assert!(c.check(&record(&[("Pct", Value::Int(0))])).is_ok());
        assert!(c.check(&record(&[("Pct", Value::Float(100.0))])).is_ok());
        assert!(c.check(&record(&[("Pct", Value::Float(100.5))])).is_err());
    }

    #[test]
    fn test_violations_keyed_by_row() {
        let mut table = Table::new(["Qty"]);
        table.push([("Qty", 5)]);
        table.push([("Qty", -1)]);
        table.push([("Qty", 0)]);

        let validator = ConstraintValidator::new().with_constraint(Constraint::positive_number("Qty"));
        let err = validator.validate(&table).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["row[1]", "row[2]"]);
        assert!(err.violations().iter().all(|v| v.constraint == "positive_number"));
        assert_eq!(
            err.suggestions().to_vec(),
            vec!["Ensure Qty is a positive number".to_string()]
        );
    }

    #[test]
    fn test_suggestions_only_for_failing_constraints() {
        let mut table = Table::new(["Qty", "Price"]);
        table.push([("Qty", Value::Int(0)), ("Price", Value::Float(9.5))]);

        let validator = ConstraintValidator::new()
            .with_constraint(Constraint::positive_number("Qty"))
            .with_constraint(Constraint::positive_number("Price"));
        let err = validator.validate(&table).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(
            err.suggestions().to_vec(),
            vec!["Ensure Qty is a positive number".to_string()]
        );
    }
}
