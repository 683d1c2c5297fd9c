//! Validator contracts.
//!
//! A [`Validator`] is a named predicate over an opaque subject. Extra
//! capabilities are exposed through accessor methods so a runner can check
//! for each one independently:
//!
//! - [`ContextualValidator`]: accepts auxiliary [`ValidationContext`]
//! - [`PerformanceAware`]: reports an estimated cost and a fail-fast flag

use std::any::{Any, type_name};
use std::collections::BTreeMap;

use outguard_error::{ErrorCode, OutputError, ValidationErrorBuilder};

/// A named, stateless check over a subject.
pub trait Validator: Send + Sync {
    /// Stable name used in logs and error metadata.
    fn name(&self) -> &str;

    /// Check the subject. `Ok(())` means the subject passed.
    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError>;

    /// Contextual capability, if implemented.
    fn as_contextual(&self) -> Option<&dyn ContextualValidator> {
        None
    }

    /// Cost hints, if implemented.
    fn performance(&self) -> Option<&dyn PerformanceAware> {
        None
    }
}

/// Validator that can use caller-supplied context.
pub trait ContextualValidator: Validator {
    fn validate_with_context(
        &self,
        subject: &dyn Any,
        context: &ValidationContext,
    ) -> Result<(), OutputError>;
}

/// Cost hints used to order validators.
pub trait PerformanceAware {
    /// Relative cost; lower runs earlier.
    fn estimated_cost(&self) -> u32;

    /// Whether this validator tends to reject quickly.
    fn fail_fast(&self) -> bool;
}

/// Auxiliary context for contextual validators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationContext {
    pub operation: Option<String>,
    pub values: BTreeMap<String, serde_json::Value>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }
}

/// Run a validator with context when it supports it, plainly otherwise.
pub fn validate_in_context(
    validator: &dyn Validator,
    subject: &dyn Any,
    context: &ValidationContext,
) -> Result<(), OutputError> {
    match validator.as_contextual() {
        Some(contextual) => contextual.validate_with_context(subject, context),
        None => validator.validate(subject),
    }
}

/// Narrow a subject to the concrete type a validator expects.
///
/// Fails with [`ErrorCode::INVALID_DATA_TYPE`] when the subject has any
/// other type.
pub fn narrow<'a, T: Any>(subject: &'a dyn Any, validator: &str) -> Result<&'a T, OutputError> {
    subject.downcast_ref::<T>().ok_or_else(|| {
        let expected = type_name::<T>().rsplit("::").next().unwrap_or("subject");
        ValidationErrorBuilder::new(
            ErrorCode::INVALID_DATA_TYPE,
            format!("{validator} expects a {expected} subject"),
        )
        .with_operation(validator)
        .with_suggestions([format!("Pass a {expected} to the {validator} validator")])
        .build()
    })
}
