//! Strategy composition.

use outguard_error::{ErrorCode, OutputError};

use crate::strategy::{DEFAULT_PRIORITY, Recovered, RecoveryContext, RecoveryStrategy};

/// Tries strategies in order and returns the first success.
///
/// Only strategies that accept the error are tried. When none succeed the
/// last error observed is returned.
pub struct CompositeStrategy {
    name: String,
    strategies: Vec<Box<dyn RecoveryStrategy>>,
    priority: u32,
}

impl CompositeStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: Vec::new(),
            priority: DEFAULT_PRIORITY,
        }
    }

    #[must_use]
    pub fn with(mut self, strategy: impl RecoveryStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl RecoveryStrategy for CompositeStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn can_handle(&self, error: &OutputError) -> bool {
        self.strategies.iter().any(|s| s.can_handle(error))
    }

    fn apply(
        &self,
        error: &OutputError,
        context: &RecoveryContext,
    ) -> Result<Recovered, OutputError> {
        let mut last = None;
        for strategy in self.strategies.iter().filter(|s| s.can_handle(error)) {
            match strategy.apply(error, context) {
                Ok(recovered) => return Ok(recovered),
                Err(err) => {
                    tracing::debug!(
                        composite = %self.name,
                        strategy = strategy.name(),
                        code = %err.code(),
                        "strategy failed"
                    );
                    last = Some(err);
                }
            }
        }
        Err(last.unwrap_or_else(|| {
            OutputError::processing(
                ErrorCode::UNEXPECTED,
                format!("no strategy in '{}' applies to [{}]", self.name, error.code()),
                false,
            )
            .with_cause(error.clone())
        }))
    }
}

impl std::fmt::Debug for CompositeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("CompositeStrategy")
            .field("name", &self.name)
            .field("strategies", &names)
            .field("priority", &self.priority)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::default_value::DefaultValueStrategy;
    use crate::strategies::format::FormatFallbackStrategy;

    #[test]
    fn test_first_success_wins() {
        let composite = CompositeStrategy::new("formats")
            .with(FormatFallbackStrategy::new(["csv"]))
            .with(FormatFallbackStrategy::new(["csv", "json"]));
        let err = OutputError::validation(ErrorCode::INVALID_FORMAT, "csv rejected");
        let ctx = RecoveryContext::new().with_format("csv");
        assert_eq!(
            composite.apply(&err, &ctx),
            Ok(Recovered::Format("json".to_string()))
        );
    }

    #[test]
    fn test_last_error_when_all_fail() {
        let composite = CompositeStrategy::new("formats")
            .with(FormatFallbackStrategy::new(["xml", "json"]))
            .with(FormatFallbackStrategy::new(["json"]));
        let err = OutputError::validation(ErrorCode::INVALID_FORMAT, "json rejected");
        let ctx = RecoveryContext::new().with_format("json");
        let failure = composite.apply(&err, &ctx).unwrap_err();
        assert!(failure.message().contains("'json'"));
    }

    #[test]
    fn test_can_handle_if_any_member_can() {
        let composite = CompositeStrategy::new("mixed")
            .with(DefaultValueStrategy::new().with_default("Qty", 0))
            .with(FormatFallbackStrategy::new(["csv"]));
        assert!(composite.can_handle(&OutputError::validation(ErrorCode::INVALID_FORMAT, "x")));
        assert!(!composite.can_handle(&OutputError::validation(ErrorCode::FILE_WRITE, "x")));
    }
}
