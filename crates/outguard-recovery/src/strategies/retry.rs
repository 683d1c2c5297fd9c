//! Retry with exponential backoff.

use std::time::Instant;

use outguard_error::{ErrorBuilder, ErrorCode, OutputError};

use crate::backoff::ExponentialBackoff;
use crate::strategy::{Recovered, RecoveryContext, RecoveryStrategy};

/// Re-invokes the failing operation from the recovery context.
///
/// Makes up to `max_attempts` attempts, sleeping `backoff.delay(n)` before
/// each retry. Stops early when the next sleep would pass the context
/// deadline. Returns the last operation error once attempts run out.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    backoff: ExponentialBackoff,
    priority: u32,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(ExponentialBackoff::default())
    }
}

impl RetryStrategy {
    pub const NAME: &'static str = "retry";

    pub fn new(backoff: ExponentialBackoff) -> Self {
        Self {
            backoff,
            priority: 20,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn backoff(&self) -> &ExponentialBackoff {
        &self.backoff
    }
}

impl RecoveryStrategy for RetryStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn can_handle(&self, error: &OutputError) -> bool {
        error.is_retryable()
    }

    fn apply(
        &self,
        error: &OutputError,
        context: &RecoveryContext,
    ) -> Result<Recovered, OutputError> {
        if !context.has_operation() {
            return Err(ErrorBuilder::new(
                ErrorCode::INCOMPATIBLE_CONFIG,
                "retry recovery needs an operation to re-invoke",
            )
            .with_operation(Self::NAME)
            .with_suggestions(["Supply the failing operation in the recovery context"])
            .with_cause(error.clone())
            .build());
        }

        let mut last = error.clone();
        for attempt in 1..=self.backoff.max_attempts {
            if attempt > 1 {
                let delay = self.backoff.delay(attempt - 2);
                if let Some(deadline) = context.deadline()
                    && Instant::now()
                        .checked_add(delay)
                        .is_none_or(|end| end > deadline)
                {
                    tracing::warn!(attempt, "retry deadline reached");
                    break;
                }
                context.sleeper().sleep(delay);
            }

            match context.invoke(attempt) {
                Some(Ok(output)) => {
                    tracing::debug!(attempt, "retry succeeded");
                    return Ok(Recovered::Output(output));
                }
                Some(Err(err)) => {
                    tracing::debug!(attempt, code = %err.code(), "retry attempt failed");
                    last = err;
                }
                None => break,
            }
        }

        tracing::warn!(
            attempts = self.backoff.max_attempts,
            code = %last.code(),
            "retries exhausted"
        );
        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::backoff::RecordingSleeper;

    fn timeout() -> OutputError {
        OutputError::processing(ErrorCode::NETWORK_TIMEOUT, "upstream timed out", true)
    }

    #[test]
    fn test_always_failing_operation_uses_every_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let sleeper = Arc::new(RecordingSleeper::new());
        let counter = Arc::clone(&calls);
        let ctx = RecoveryContext::new()
            .with_sleeper(sleeper.clone())
            .with_operation(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(timeout())
            });

        let strategy = RetryStrategy::new(ExponentialBackoff::from_millis(100, 5_000, 3));
        let err = strategy.apply(&timeout(), &ctx).unwrap_err();

        assert_eq!(err.code(), &ErrorCode::NETWORK_TIMEOUT);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            sleeper.sleeps(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        assert!(sleeper.total() >= Duration::from_millis(300));
    }

    #[test]
    fn test_returns_output_on_later_success() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let ctx = RecoveryContext::new()
            .with_sleeper(sleeper.clone())
            .with_operation(|attempt| {
                if attempt < 2 {
                    Err(timeout())
                } else {
                    Ok(json!({ "attempt": attempt }))
                }
            });

        let strategy = RetryStrategy::new(ExponentialBackoff::from_millis(10, 50, 5));
        assert_eq!(
            strategy.apply(&timeout(), &ctx),
            Ok(Recovered::Output(json!({ "attempt": 2 })))
        );
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(10)]);
    }

    #[test]
    fn test_deadline_stops_retrying() {
        let sleeper = Arc::new(RecordingSleeper::new());
        let ctx = RecoveryContext::new()
            .with_sleeper(sleeper.clone())
            .with_deadline(Instant::now())
            .with_operation(|_| Err(timeout()));

        let strategy = RetryStrategy::new(ExponentialBackoff::from_millis(100, 5_000, 10));
        assert!(strategy.apply(&timeout(), &ctx).is_err());
        assert!(sleeper.sleeps().is_empty());
    }

    #[test]
    fn test_unbounded_delay_stops_at_deadline() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let sleeper = Arc::new(RecordingSleeper::new());
        let ctx = RecoveryContext::new()
            .with_sleeper(sleeper.clone())
            .with_deadline(Instant::now() + Duration::from_secs(3600))
            .with_operation(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(timeout())
            });

        let strategy = RetryStrategy::new(ExponentialBackoff::new(Duration::MAX, Duration::MAX, 3));
        assert!(strategy.apply(&timeout(), &ctx).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[test]
    fn test_needs_an_operation() {
        let err = RetryStrategy::default()
            .apply(&timeout(), &RecoveryContext::new())
            .unwrap_err();
        assert_eq!(err.code(), &ErrorCode::INCOMPATIBLE_CONFIG);
    }

    #[test]
    fn test_only_handles_retryable_errors() {
        let strategy = RetryStrategy::default();
        assert!(strategy.can_handle(&timeout()));
        assert!(!strategy.can_handle(&OutputError::processing(
            ErrorCode::FILE_WRITE,
            "disk full",
            false
        )));
    }
}
