//! Default recovery handler.

use std::fmt;

use outguard_error::OutputError;
use serde::Serialize;

use crate::strategy::{Recovered, RecoveryContext, RecoveryStrategy};

/// A successful recovery and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recovery {
    pub strategy: String,
    pub result: Recovered,
}

/// Holds strategies ordered by priority and tries them in turn.
#[derive(Default)]
pub struct DefaultRecoveryHandler {
    strategies: Vec<Box<dyn RecoveryStrategy>>,
}

impl DefaultRecoveryHandler {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, strategy: impl RecoveryStrategy + 'static) -> Self {
        self.register(Box::new(strategy));
        self
    }

    /// Add a strategy. Equal priorities keep registration order.
    pub fn register(&mut self, strategy: Box<dyn RecoveryStrategy>) {
        let at = self
            .strategies
            .partition_point(|s| s.priority() <= strategy.priority());
        self.strategies.insert(at, strategy);
    }

    /// Strategy names in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Whether any registered strategy accepts the error.
    pub fn can_recover(&self, error: &OutputError) -> bool {
        self.strategies.iter().any(|s| s.can_handle(error))
    }

    /// Try every accepting strategy in priority order.
    ///
    /// Returns the first recovery, or the last strategy error. An error no
    /// strategy accepts comes back unchanged.
    pub fn recover(
        &self,
        error: &OutputError,
        context: &RecoveryContext,
    ) -> Result<Recovery, OutputError> {
        let mut last = None;
        for strategy in self.strategies.iter().filter(|s| s.can_handle(error)) {
            let span = tracing::debug_span!("recovery", strategy = strategy.name());
            let _guard = span.enter();

            match strategy.apply(error, context) {
                Ok(result) => {
                    tracing::info!(code = %error.code(), "recovered");
                    return Ok(Recovery {
                        strategy: strategy.name().to_string(),
                        result,
                    });
                }
                Err(err) => {
                    tracing::debug!(code = %err.code(), "strategy failed");
                    last = Some(err);
                }
            }
        }
        Err(last.unwrap_or_else(|| error.clone()))
    }
}

impl fmt::Debug for DefaultRecoveryHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultRecoveryHandler")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use outguard_error::ErrorCode;

    use super::*;
    use crate::{DefaultValueStrategy, FormatFallbackStrategy, RetryStrategy};

    #[test]
    fn test_strategies_sorted_by_priority() {
        let handler = DefaultRecoveryHandler::new()
            .with(RetryStrategy::default())
            .with(FormatFallbackStrategy::new(["csv"]))
            .with(DefaultValueStrategy::new())
            .with(FormatFallbackStrategy::new(["json"]).with_priority(10));
        assert_eq!(
            handler.strategy_names(),
            vec!["default_value", "format_fallback", "format_fallback", "retry"]
        );
    }

    #[test]
    fn test_unhandled_error_comes_back_unchanged() {
        let handler = DefaultRecoveryHandler::new().with(FormatFallbackStrategy::new(["csv"]));
        let err = OutputError::processing(ErrorCode::PERMISSION_DENIED, "no access", false);
        assert!(!handler.can_recover(&err));
        assert_eq!(handler.recover(&err, &RecoveryContext::new()), Err(err));
    }

    #[test]
    fn test_recovery_names_strategy() {
        let handler = DefaultRecoveryHandler::new().with(FormatFallbackStrategy::new(["xlsx", "csv"]));
        let err = OutputError::validation(ErrorCode::INVALID_FORMAT, "xlsx rejected");
        let recovery = handler
            .recover(&err, &RecoveryContext::new().with_format("xlsx"))
            .unwrap();
        assert_eq!(recovery.strategy, "format_fallback");
        assert_eq!(recovery.result, Recovered::Format("csv".to_string()));
    }
}
