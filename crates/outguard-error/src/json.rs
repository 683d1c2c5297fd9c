//! JSON form of [`OutputError`].
//!
//! Empty optional fields are omitted. The cause is flattened to its display
//! text; reading it back yields a message-only cause.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::code::ErrorCode;
use crate::context::ErrorContext;
use crate::error::{ErrorKind, OutputError};
use crate::severity::Severity;
use crate::violation::Violation;

/// Wire representation of an [`OutputError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "ErrorContext::is_empty")]
    pub context: ErrorContext,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_result: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorRecord>,
}

/// A cause read back from JSON; only its text survives.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FlattenedCause(pub String);

impl From<&OutputError> for ErrorRecord {
    fn from(err: &OutputError) -> Self {
        let mut record = ErrorRecord {
            kind: err.kind.as_str().to_string(),
            code: err.code.clone(),
            severity: err.severity,
            message: err.message.clone(),
            context: err.context.clone(),
            suggestions: err.suggestions.clone(),
            cause: err.cause.as_ref().map(ToString::to_string),
            violations: Vec::new(),
            retryable: None,
            partial_result: None,
            errors: Vec::new(),
        };
        match &err.kind {
            ErrorKind::Base => {}
            ErrorKind::Validation { violations } => record.violations = violations.clone(),
            ErrorKind::Processing {
                retryable,
                partial_result,
            } => {
                record.retryable = Some(*retryable);
                record.partial_result = partial_result.clone();
            }
            ErrorKind::Composite { errors } => {
                record.errors = errors.iter().map(ErrorRecord::from).collect();
            }
        }
        record
    }
}

impl From<ErrorRecord> for OutputError {
    fn from(record: ErrorRecord) -> Self {
        let kind = match record.kind.as_str() {
            "validation" => ErrorKind::Validation {
                violations: record.violations,
            },
            "processing" => ErrorKind::Processing {
                retryable: record.retryable.unwrap_or(false),
                partial_result: record.partial_result,
            },
            "composite" => ErrorKind::Composite {
                errors: record.errors.into_iter().map(OutputError::from).collect(),
            },
            _ => ErrorKind::Base,
        };
        let mut err = OutputError::new(record.code, record.severity, record.message)
            .with_context(record.context)
            .with_suggestions(record.suggestions);
        err.kind = kind;
        if let Some(cause) = record.cause {
            err = err.with_cause(FlattenedCause(cause));
        }
        err
    }
}

impl Serialize for OutputError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ErrorRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OutputError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ErrorRecord::deserialize(deserializer).map(OutputError::from)
    }
}

impl OutputError {
    /// Indented JSON document for this error.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
