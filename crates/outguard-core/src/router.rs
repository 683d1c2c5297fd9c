//! Routes errors through recovery, the handler and the reporter.
//!
//! For each error:
//!
//! 1. The reporter (if any) records it, whatever happens next.
//! 2. Non-fatal errors some recovery strategy accepts are recovered. A
//!    recovered error never reaches the handler.
//! 3. Anything left goes through the handler's policy unchanged, including
//!    errors whose recovery failed.

use std::any::Any;
use std::sync::Arc;

use outguard_error::{OutputError, Severity};
use outguard_recovery::{DefaultRecoveryHandler, Recovery, RecoveryContext};
use outguard_report::ErrorReporter;
use outguard_validate::{ValidationContext, ValidationRunner};

use crate::handler::ErrorHandler;

#[derive(Debug)]
pub struct ErrorRouter {
    handler: Arc<ErrorHandler>,
    recovery: Option<DefaultRecoveryHandler>,
    reporter: Option<Arc<ErrorReporter>>,
}

impl ErrorRouter {
    pub fn new(handler: Arc<ErrorHandler>) -> Self {
        Self {
            handler,
            recovery: None,
            reporter: None,
        }
    }

    #[must_use]
    pub fn with_recovery(mut self, recovery: DefaultRecoveryHandler) -> Self {
        self.recovery = Some(recovery);
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn handler(&self) -> &Arc<ErrorHandler> {
        &self.handler
    }

    pub fn reporter(&self) -> Option<&Arc<ErrorReporter>> {
        self.reporter.as_ref()
    }

    /// Route one error.
    ///
    /// Returns `Ok(Some(_))` when recovered, `Ok(None)` when the handler let
    /// processing continue, and `Err` when the caller must stop.
    pub fn route(
        &self,
        error: OutputError,
        context: &RecoveryContext,
    ) -> Result<Option<Recovery>, OutputError> {
        if let Some(reporter) = &self.reporter {
            reporter.report(error.clone());
        }

        if let Some(recovery) = &self.recovery
            && error.severity() < Severity::Fatal
            && recovery.can_recover(&error)
        {
            // The handler judges the original error, not the strategy's.
            match recovery.recover(&error, context) {
                Ok(recovered) => return Ok(Some(recovered)),
                Err(last) => tracing::debug!(
                    code = %error.code(),
                    last = %last.code(),
                    reason = last.message(),
                    "recovery failed"
                ),
            }
        }

        self.handler.handle(error).map(|()| None)
    }

    /// Validate a subject and route any failure.
    ///
    /// Members of a composite error are routed one by one, so handler and
    /// reporter counts reflect individual failures. Returns the recoveries
    /// applied; stops at the first error the handler surfaces.
    pub fn validate_and_route(
        &self,
        runner: &ValidationRunner,
        subject: &dyn Any,
        context: Option<&ValidationContext>,
    ) -> Result<Vec<Recovery>, OutputError> {
        let outcome = match context {
            Some(context) => runner.run_with_context(subject, context),
            None => runner.run(subject),
        };
        let Err(error) = outcome else {
            return Ok(Vec::new());
        };

        let members = match error.errors() {
            [] => vec![error],
            members => members.to_vec(),
        };

        let recovery_context = RecoveryContext::new();
        let mut recoveries = Vec::new();
        for member in members {
            if let Some(recovered) = self.route(member, &recovery_context)? {
                recoveries.push(recovered);
            }
        }
        Ok(recoveries)
    }
}
