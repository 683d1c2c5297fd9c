//! The [`OutputError`] type.
//!
//! Every error in the framework carries a stable [`ErrorCode`], a
//! [`Severity`], an [`ErrorContext`], human-actionable suggestions and an
//! optional wrapped cause. The [`ErrorKind`] adds the data specific to
//! validation, processing and composite errors.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::code::ErrorCode;
use crate::context::ErrorContext;
use crate::severity::Severity;
use crate::violation::Violation;

/// Shared handle to an underlying cause.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Specialization data for an [`OutputError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Plain error with no extra data.
    Base,
    /// Data shape or content problem.
    Validation {
        /// Constraint failures in detection order.
        violations: Vec<Violation>,
    },
    /// Failure while doing the work.
    Processing {
        /// Whether retrying the same operation may succeed.
        retryable: bool,
        /// Output produced before the failure, for best-effort salvage.
        partial_result: Option<Value>,
    },
    /// Several underlying errors reported as one.
    Composite {
        /// Members in the order they were produced.
        errors: Vec<OutputError>,
    },
}

impl ErrorKind {
    /// Tag used in the JSON form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Validation { .. } => "validation",
            Self::Processing { .. } => "processing",
            Self::Composite { .. } => "composite",
        }
    }
}

/// Structured error with code, severity, context, suggestions and cause.
#[derive(Debug, Clone)]
pub struct OutputError {
    pub(crate) code: ErrorCode,
    pub(crate) severity: Severity,
    pub(crate) message: String,
    pub(crate) context: ErrorContext,
    pub(crate) suggestions: Vec<String>,
    pub(crate) cause: Option<Cause>,
    pub(crate) kind: ErrorKind,
}

impl OutputError {
    /// Create a base error.
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            context: ErrorContext::default(),
            suggestions: Vec::new(),
            cause: None,
            kind: ErrorKind::Base,
        }
    }

    /// Create a validation error with no violations yet (severity `Error`).
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation {
                violations: Vec::new(),
            },
            ..Self::new(code, Severity::Error, message)
        }
    }

    /// Create a processing error (severity `Error`).
    pub fn processing(code: ErrorCode, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: ErrorKind::Processing {
                retryable,
                partial_result: None,
            },
            ..Self::new(code, Severity::Error, message)
        }
    }

    /// Aggregate several errors into one.
    ///
    /// The composite takes the code and severity of its worst member (the
    /// first one at the highest severity). Returns `None` for an empty list.
    pub fn composite(errors: Vec<OutputError>) -> Option<Self> {
        let worst = errors
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.severity.cmp(&b.severity).then(ib.cmp(ia)))
            .map(|(_, e)| e)?;
        let code = worst.code.clone();
        let severity = worst.severity;
        let message = composite_message(&errors);

        let mut suggestions: Vec<String> = Vec::new();
        for suggestion in errors.iter().flat_map(|e| e.suggestions.iter()) {
            if !suggestions.contains(suggestion) {
                suggestions.push(suggestion.clone());
            }
        }

        Some(Self {
            code,
            severity,
            message,
            context: ErrorContext::default(),
            suggestions,
            cause: None,
            kind: ErrorKind::Composite { errors },
        })
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// The wrapped cause, if any.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.kind, ErrorKind::Processing { .. })
    }

    /// Violations carried by a validation error (empty otherwise).
    pub fn violations(&self) -> &[Violation] {
        match &self.kind {
            ErrorKind::Validation { violations } => violations,
            _ => &[],
        }
    }

    /// A validation error with more than one violation, or a composite.
    pub fn is_composite(&self) -> bool {
        match &self.kind {
            ErrorKind::Validation { violations } => violations.len() > 1,
            ErrorKind::Composite { .. } => true,
            _ => false,
        }
    }

    /// Whether retrying may succeed. Only processing errors can be retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Processing { retryable: true, .. })
    }

    pub fn partial_result(&self) -> Option<&Value> {
        match &self.kind {
            ErrorKind::Processing { partial_result, .. } => partial_result.as_ref(),
            _ => None,
        }
    }

    /// Members of a composite error (empty otherwise).
    pub fn errors(&self) -> &[OutputError] {
        match &self.kind {
            ErrorKind::Composite { errors } => errors,
            _ => &[],
        }
    }

    /// Number of members of a composite error; `1` for any other error.
    pub fn count(&self) -> usize {
        match &self.kind {
            ErrorKind::Composite { errors } => errors.len(),
            _ => 1,
        }
    }

    /// Iterate over composite members, or over `self` for a single error.
    pub fn iter(&self) -> impl Iterator<Item = &OutputError> {
        let members = self.errors();
        let single = members.is_empty().then_some(self);
        members.iter().chain(single)
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_cause<E>(self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.with_shared_cause(Arc::new(cause))
    }

    #[must_use]
    pub fn with_shared_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attach a partial result. No-op unless this is a processing error.
    #[must_use]
    pub fn with_partial_result(mut self, result: impl Into<Value>) -> Self {
        if let ErrorKind::Processing { partial_result, .. } = &mut self.kind {
            *partial_result = Some(result.into());
        }
        self
    }

    /// Append violations. A base error becomes a validation error.
    #[must_use]
    pub fn with_violations(mut self, extra: impl IntoIterator<Item = Violation>) -> Self {
        match &mut self.kind {
            ErrorKind::Validation { violations } => violations.extend(extra),
            ErrorKind::Base => {
                self.kind = ErrorKind::Validation {
                    violations: extra.into_iter().collect(),
                };
            }
            _ => {}
        }
        self
    }
}

fn composite_message(errors: &[OutputError]) -> String {
    let parts: Vec<String> = errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect();
    format!("{} errors occurred: {}", errors.len(), parts.join("; "))
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(field) = &self.context.field {
            write!(f, " (field: {field})")?;
        }
        if let Some(operation) = &self.context.operation {
            write!(f, " (operation: {operation})")?;
        }
        if !self.suggestions.is_empty() {
            f.write_str("\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {suggestion}")?;
            }
        }
        if let Some(cause) = &self.cause {
            write!(f, "\nCaused by: {cause}")?;
        }
        Ok(())
    }
}

impl StdError for OutputError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Causes compare by their rendered text.
impl PartialEq for OutputError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.severity == other.severity
            && self.message == other.message
            && self.context == other.context
            && self.suggestions == other.suggestions
            && self.kind == other.kind
            && self.cause.as_ref().map(ToString::to_string)
                == other.cause.as_ref().map(ToString::to_string)
    }
}
