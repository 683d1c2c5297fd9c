//! Validator composition helpers.

use std::any::Any;
use std::fmt;

use outguard_error::OutputError;

use crate::validator::{
    ContextualValidator, PerformanceAware, ValidationContext, Validator, validate_in_context,
};

/// Runs validators strictly in sequence and stops at the first failure.
///
/// Use when later validators assume earlier ones passed (e.g. type checks
/// that assume the columns exist).
#[derive(Default)]
pub struct ValidatorChain {
    name: String,
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validators: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn push(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Validator for ValidatorChain {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        for validator in &self.validators {
            tracing::trace!(chain = %self.name, validator = validator.name(), "chain step");
            validator.validate(subject)?;
        }
        Ok(())
    }

    fn as_contextual(&self) -> Option<&dyn ContextualValidator> {
        Some(self)
    }
}

impl ContextualValidator for ValidatorChain {
    fn validate_with_context(
        &self,
        subject: &dyn Any,
        context: &ValidationContext,
    ) -> Result<(), OutputError> {
        for validator in &self.validators {
            validate_in_context(validator.as_ref(), subject, context)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.validators.iter().map(|v| v.name()).collect();
        f.debug_struct("ValidatorChain")
            .field("name", &self.name)
            .field("validators", &names)
            .finish()
    }
}

type Condition = dyn Fn(&dyn Any) -> bool + Send + Sync;

/// Runs the inner validator only when the predicate holds.
pub struct ConditionalValidator {
    inner: Box<dyn Validator>,
    condition: Box<Condition>,
}

impl ConditionalValidator {
    pub fn new<F>(inner: impl Validator + 'static, condition: F) -> Self
    where
        F: Fn(&dyn Any) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(inner),
            condition: Box::new(condition),
        }
    }

    /// Whether the inner validator would run for this subject.
    pub fn applies_to(&self, subject: &dyn Any) -> bool {
        (self.condition)(subject)
    }
}

impl Validator for ConditionalValidator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        if !self.applies_to(subject) {
            tracing::trace!(validator = self.inner.name(), "condition not met, skipping");
            return Ok(());
        }
        self.inner.validate(subject)
    }

    fn as_contextual(&self) -> Option<&dyn ContextualValidator> {
        Some(self)
    }

    fn performance(&self) -> Option<&dyn PerformanceAware> {
        self.inner.performance()
    }
}

impl ContextualValidator for ConditionalValidator {
    fn validate_with_context(
        &self,
        subject: &dyn Any,
        context: &ValidationContext,
    ) -> Result<(), OutputError> {
        if !self.applies_to(subject) {
            return Ok(());
        }
        validate_in_context(self.inner.as_ref(), subject, context)
    }
}

type CheckFn = dyn Fn(&dyn Any) -> Result<(), OutputError> + Send + Sync;
type ContextCheckFn = dyn Fn(&dyn Any, &ValidationContext) -> Result<(), OutputError> + Send + Sync;

/// A validator made from a name and a closure.
pub struct NamedValidator {
    name: String,
    check: Box<CheckFn>,
    with_context: Option<Box<ContextCheckFn>>,
}

impl NamedValidator {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&dyn Any) -> Result<(), OutputError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
            with_context: None,
        }
    }

    /// A closure validator that also receives the validation context.
    ///
    /// Without a context it runs against an empty one.
    pub fn contextual<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&dyn Any, &ValidationContext) -> Result<(), OutputError> + Send + Sync + 'static,
    {
        let check = std::sync::Arc::new(check);
        let plain = std::sync::Arc::clone(&check);
        Self {
            name: name.into(),
            check: Box::new(move |subject: &dyn Any| {
                plain(subject, &ValidationContext::default())
            }),
            with_context: Some(Box::new(
                move |subject: &dyn Any, context: &ValidationContext| check(subject, context),
            )),
        }
    }
}

impl Validator for NamedValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        (self.check)(subject)
    }

    fn as_contextual(&self) -> Option<&dyn ContextualValidator> {
        self.with_context.is_some().then_some(self as &dyn ContextualValidator)
    }
}

impl ContextualValidator for NamedValidator {
    fn validate_with_context(
        &self,
        subject: &dyn Any,
        context: &ValidationContext,
    ) -> Result<(), OutputError> {
        match &self.with_context {
            Some(check) => check(subject, context),
            None => (self.check)(subject),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use outguard_error::{ErrorCode, Severity};

    use super::*;
    use crate::{DataTypeValidator, RequiredColumnsValidator, Table, ValueKind};

    fn counting(name: &'static str, calls: Arc<AtomicUsize>, fail: bool) -> NamedValidator {
        NamedValidator::new(name, move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(OutputError::new(ErrorCode::CONSTRAINT_VIOLATION, Severity::Error, name))
            } else {
                Ok(())
            }
        })
    }

    #[test]
    fn test_chain_stops_at_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = ValidatorChain::new("chain")
            .then(counting("first", Arc::clone(&calls), false))
            .then(counting("second", Arc::clone(&calls), true))
            .then(counting("third", Arc::clone(&calls), true));

        let err = chain.validate(&()).unwrap_err();
        assert_eq!(err.message(), "second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_chain_guards_dependent_checks() {
        let chain = ValidatorChain::new("schema")
            .then(RequiredColumnsValidator::new(["Age"]))
            .then(DataTypeValidator::new().with_column("Age", ValueKind::Int));
        let err = chain.validate(&Table::new(["Name"])).unwrap_err();
        assert_eq!(err.code(), &ErrorCode::MISSING_COLUMN);
    }

    #[test]
    fn test_conditional_skips_when_predicate_false() {
        let calls = Arc::new(AtomicUsize::new(0));
        let validator = ConditionalValidator::new(counting("inner", Arc::clone(&calls), true), |s| {
            s.downcast_ref::<Table>().is_some_and(|t| !t.is_empty())
        });

        assert!(validator.validate(&Table::new(["A"])).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let mut table = Table::new(["A"]);
        table.push([("A", 1)]);
        assert!(validator.validate(&table).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_contextual_named_validator_sees_context() {
        let validator = NamedValidator::contextual("needs_tenant", |_, ctx| {
            if ctx.get("tenant").is_some() {
                Ok(())
            } else {
                Err(OutputError::validation(ErrorCode::MISSING_REQUIRED, "no tenant"))
            }
        });

        assert!(validator.as_contextual().is_some());
        assert!(validator.validate(&()).is_err());
        let ctx = ValidationContext::new().with_value("tenant", "acme");
        assert!(validate_in_context(&validator, &(), &ctx).is_ok());
    }
}
