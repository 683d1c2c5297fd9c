//! The recovery strategy contract.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use outguard_error::OutputError;
use serde::Serialize;
use serde_json::Value as Json;

use crate::backoff::{Sleeper, ThreadSleeper};

/// Priority used when a strategy does not choose one.
pub const DEFAULT_PRIORITY: u32 = 10;

/// What a successful recovery produced.
///
/// The caller decides how to use it, e.g. rendering with the substituted
/// format or value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recovered {
    /// Render with this format instead.
    Format(String),
    /// Use this value for the named field.
    Value { field: String, value: Json },
    /// Output of a re-invoked operation.
    Output(Json),
}

type Operation = dyn Fn(u32) -> Result<Json, OutputError> + Send + Sync;

/// Caller-supplied inputs for [`RecoveryStrategy::apply`].
#[derive(Clone)]
pub struct RecoveryContext {
    current_format: Option<String>,
    operation: Option<Arc<Operation>>,
    deadline: Option<Instant>,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RecoveryContext {
    fn default() -> Self {
        Self {
            current_format: None,
            operation: None,
            deadline: None,
            sleeper: Arc::new(ThreadSleeper),
        }
    }
}

impl RecoveryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The format that failed.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.current_format = Some(format.into());
        self
    }

    /// The operation to re-invoke when retrying. It receives the 1-based
    /// attempt number.
    #[must_use]
    pub fn with_operation<F>(mut self, operation: F) -> Self
    where
        F: Fn(u32) -> Result<Json, OutputError> + Send + Sync + 'static,
    {
        self.operation = Some(Arc::new(operation));
        self
    }

    /// No retry sleep may end after this instant.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn current_format(&self) -> Option<&str> {
        self.current_format.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    pub fn has_operation(&self) -> bool {
        self.operation.is_some()
    }

    /// Invoke the operation, if one was supplied.
    pub fn invoke(&self, attempt: u32) -> Option<Result<Json, OutputError>> {
        self.operation.as_ref().map(|op| op(attempt))
    }
}

impl fmt::Debug for RecoveryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryContext")
            .field("current_format", &self.current_format)
            .field("has_operation", &self.operation.is_some())
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

/// A named, priority-ranked remediation for some class of errors.
///
/// Strategies hold only configuration. Anything that changes during an
/// `apply` call lives on that call's stack, so one instance can serve
/// concurrent callers.
pub trait RecoveryStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Lower runs first.
    fn priority(&self) -> u32 {
        DEFAULT_PRIORITY
    }

    /// Whether this strategy applies to the error.
    fn can_handle(&self, error: &OutputError) -> bool;

    fn apply(
        &self,
        error: &OutputError,
        context: &RecoveryContext,
    ) -> Result<Recovered, OutputError>;
}
