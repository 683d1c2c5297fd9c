//! Fluent construction of [`OutputError`] values.
//!
//! ```
//! use outguard_error::{ErrorBuilder, ErrorCode, Severity};
//!
//! let err = ErrorBuilder::new(ErrorCode::INVALID_FORMAT, "unsupported format 'xml'")
//!     .with_severity(Severity::Error)
//!     .with_field("format")
//!     .with_suggestions(["Use one of: json, csv, html, markdown"])
//!     .build();
//! assert_eq!(err.code(), &ErrorCode::INVALID_FORMAT);
//! ```

use std::error::Error as StdError;
use std::sync::Arc;

use serde_json::Value;

use crate::code::ErrorCode;
use crate::context::ErrorContext;
use crate::error::{Cause, ErrorKind, OutputError};
use crate::severity::Severity;
use crate::violation::Violation;

/// Builder for base, validation and processing errors.
#[derive(Debug, Clone)]
pub struct ErrorBuilder {
    code: ErrorCode,
    message: String,
    severity: Severity,
    context: ErrorContext,
    suggestions: Vec<String>,
    cause: Option<Cause>,
}

impl ErrorBuilder {
    /// Start a builder. Severity defaults to `Error`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
            context: ErrorContext::default(),
            suggestions: Vec::new(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Replace the whole context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.context.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.context.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions
            .extend(suggestions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Switch to a validation builder keeping everything set so far.
    pub fn validation(self) -> ValidationErrorBuilder {
        ValidationErrorBuilder {
            base: self,
            violations: Vec::new(),
        }
    }

    /// Build a base error.
    pub fn build(self) -> OutputError {
        self.finish(ErrorKind::Base)
    }

    /// Build a validation error with no violations.
    pub fn build_validation(self) -> OutputError {
        self.finish(ErrorKind::Validation {
            violations: Vec::new(),
        })
    }

    /// Build a processing error.
    pub fn build_processing(self, retryable: bool) -> OutputError {
        self.finish(ErrorKind::Processing {
            retryable,
            partial_result: None,
        })
    }

    fn finish(self, kind: ErrorKind) -> OutputError {
        OutputError {
            code: self.code,
            severity: self.severity,
            message: self.message,
            context: self.context,
            suggestions: self.suggestions,
            cause: self.cause,
            kind,
        }
    }
}

/// Builder for validation errors carrying violations.
#[derive(Debug, Clone)]
pub struct ValidationErrorBuilder {
    base: ErrorBuilder,
    violations: Vec<Violation>,
}

impl ValidationErrorBuilder {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ErrorBuilder::new(code, message).validation()
    }

    #[must_use]
    pub fn with_violation(mut self, violation: Violation) -> Self {
        self.violations.push(violation);
        self
    }

    #[must_use]
    pub fn with_violations(mut self, violations: impl IntoIterator<Item = Violation>) -> Self {
        self.violations.extend(violations);
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.base = self.base.with_severity(severity);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.base = self.base.with_field(field);
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.base = self.base.with_operation(operation);
        self
    }

    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base = self.base.with_suggestions(suggestions);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.base = self.base.with_context(context);
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.base = self.base.with_value(value);
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.base = self.base.with_index(index);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.base = self.base.with_metadata(key, value);
        self
    }

    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.base = self.base.with_cause(cause);
        self
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn build(self) -> OutputError {
        self.base.finish(ErrorKind::Validation {
            violations: self.violations,
        })
    }
}
