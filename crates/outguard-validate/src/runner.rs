//! Validation runner.
//!
//! Executes a set of validators against one subject in one of two modes:
//!
//! - **Fail-fast**: return the first validator error.
//! - **Collect-all**: run every validator and merge all errors into one
//!   composite error, preserving execution order.
//!
//! Validators exposing [`PerformanceAware`] hints run first, fail-fast ones
//! before the rest and cheaper before more expensive. Validators without
//! hints keep their registration order after them.

use std::any::Any;
use std::fmt;

use outguard_error::OutputError;
use serde::{Deserialize, Serialize};

use crate::validator::{ValidationContext, Validator, validate_in_context};

/// How a runner reacts to validator failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop at the first failing validator.
    #[default]
    FailFast,
    /// Run all validators and return every failure.
    CollectAll,
}

/// Runs a set of validators over a subject.
pub struct ValidationRunner {
    validators: Vec<Box<dyn Validator>>,
    mode: ValidationMode,
    order_by_cost: bool,
}

impl Default for ValidationRunner {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

impl ValidationRunner {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            validators: Vec::new(),
            mode,
            order_by_cost: true,
        }
    }

    pub fn fail_fast() -> Self {
        Self::new(ValidationMode::FailFast)
    }

    pub fn collect_all() -> Self {
        Self::new(ValidationMode::CollectAll)
    }

    /// Register a validator.
    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn push(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    /// Disable cost-based ordering; validators run in registration order.
    #[must_use]
    pub fn with_cost_ordering(mut self, enabled: bool) -> Self {
        self.order_by_cost = enabled;
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validators in the order they will execute.
    pub fn execution_order(&self) -> Vec<&dyn Validator> {
        let mut ordered: Vec<&dyn Validator> = self.validators.iter().map(AsRef::as_ref).collect();
        if self.order_by_cost {
            // Stable sort: ties keep registration order.
            ordered.sort_by_key(|v| match v.performance() {
                Some(hint) => (0u8, !hint.fail_fast(), hint.estimated_cost()),
                None => (1u8, false, 0),
            });
        }
        ordered
    }

    /// Validate a subject.
    pub fn run(&self, subject: &dyn Any) -> Result<(), OutputError> {
        self.execute(|validator| validator.validate(subject))
    }

    /// Validate a subject, passing the context to contextual validators.
    pub fn run_with_context(
        &self,
        subject: &dyn Any,
        context: &ValidationContext,
    ) -> Result<(), OutputError> {
        self.execute(|validator| validate_in_context(validator, subject, context))
    }

    fn execute<F>(&self, mut check: F) -> Result<(), OutputError>
    where
        F: FnMut(&dyn Validator) -> Result<(), OutputError>,
    {
        let mut errors = Vec::new();

        for validator in self.execution_order() {
            let span = tracing::debug_span!("validator", name = validator.name());
            let _guard = span.enter();

            match check(validator) {
                Ok(()) => tracing::debug!("passed"),
                Err(err) => {
                    tracing::debug!(code = %err.code(), severity = %err.severity(), "failed");
                    if self.mode == ValidationMode::FailFast {
                        return Err(err);
                    }
                    errors.push(err);
                }
            }
        }

        match OutputError::composite(errors) {
            Some(composite) => Err(composite),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ValidationRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.validators.iter().map(|v| v.name()).collect();
        f.debug_struct("ValidationRunner")
            .field("mode", &self.mode)
            .field("validators", &names)
            .field("order_by_cost", &self.order_by_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DataTypeValidator, EmptyDatasetValidator, MalformedDataValidator, NamedValidator,
        RequiredColumnsValidator, ValueKind,
    };

    #[test]
    fn test_cost_ordering() {
        let runner = ValidationRunner::fail_fast()
            .with(NamedValidator::new("custom", |_| Ok(())))
            .with(DataTypeValidator::new().with_column("A", ValueKind::Int))
            .with(MalformedDataValidator::new(false))
            .with(RequiredColumnsValidator::new(["A"]))
            .with(EmptyDatasetValidator::forbid());

        let names: Vec<&str> = runner.execution_order().iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            vec![
                "empty_dataset",
                "required_columns",
                "malformed_data",
                "data_type",
                "custom"
            ]
        );
    }

    #[test]
    fn test_registration_order_without_cost_ordering() {
        let runner = ValidationRunner::fail_fast()
            .with_cost_ordering(false)
            .with(DataTypeValidator::new())
            .with(EmptyDatasetValidator::forbid());

        let names: Vec<&str> = runner.execution_order().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["data_type", "empty_dataset"]);
    }

    #[test]
    fn test_empty_runner_passes() {
        assert!(ValidationRunner::collect_all().run(&()).is_ok());
    }
}
