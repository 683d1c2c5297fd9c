//! Format fallback.

use outguard_error::{ErrorBuilder, ErrorCode, OutputError};

use crate::strategy::{DEFAULT_PRIORITY, Recovered, RecoveryContext, RecoveryStrategy};

/// Substitutes the next format from an ordered list when a format is
/// rejected.
///
/// Without a current format in the context the first listed format is
/// offered. A current format missing from the list restarts from the top,
/// skipping that format.
#[derive(Debug, Clone)]
pub struct FormatFallbackStrategy {
    formats: Vec<String>,
    priority: u32,
}

impl FormatFallbackStrategy {
    pub const NAME: &'static str = "format_fallback";

    pub fn new<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formats: formats.into_iter().map(Into::into).collect(),
            priority: DEFAULT_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// The format to try after `current`.
    pub fn next_format(&self, current: Option<&str>) -> Option<&str> {
        let next = match current {
            None => self.formats.first(),
            Some(current) => match self.formats.iter().position(|f| f == current) {
                Some(pos) => self.formats.get(pos + 1),
                None => self.formats.iter().find(|f| f.as_str() != current),
            },
        };
        next.map(String::as_str)
    }
}

impl RecoveryStrategy for FormatFallbackStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn can_handle(&self, error: &OutputError) -> bool {
        error.code() == &ErrorCode::INVALID_FORMAT
    }

    fn apply(
        &self,
        error: &OutputError,
        context: &RecoveryContext,
    ) -> Result<Recovered, OutputError> {
        let current = context.current_format();
        match self.next_format(current) {
            Some(next) => {
                tracing::warn!(
                    from = current,
                    to = next,
                    code = %error.code(),
                    "falling back to another format"
                );
                Ok(Recovered::Format(next.to_string()))
            }
            None => Err(ErrorBuilder::new(
                ErrorCode::INVALID_FORMAT,
                format!(
                    "no fallback format left after '{}'",
                    current.unwrap_or("<none>")
                ),
            )
            .with_operation(Self::NAME)
            .with_suggestions(["Add another format to the fallback list"])
            .with_cause(error.clone())
            .build()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> FormatFallbackStrategy {
        FormatFallbackStrategy::new(["xlsx", "csv", "json"])
    }

    #[test]
    fn test_walks_list_in_order() {
        let s = strategy();
        assert_eq!(s.next_format(None), Some("xlsx"));
        assert_eq!(s.next_format(Some("xlsx")), Some("csv"));
        assert_eq!(s.next_format(Some("csv")), Some("json"));
        assert_eq!(s.next_format(Some("json")), None);
        assert_eq!(s.next_format(Some("pdf")), Some("xlsx"));
    }

    #[test]
    fn test_only_handles_format_errors() {
        let s = strategy();
        assert!(s.can_handle(&OutputError::validation(ErrorCode::INVALID_FORMAT, "bad")));
        assert!(!s.can_handle(&OutputError::validation(ErrorCode::MISSING_COLUMN, "bad")));
    }

    #[test]
    fn test_exhausted_list_is_an_error() {
        let err = OutputError::validation(ErrorCode::INVALID_FORMAT, "json rejected");
        let ctx = RecoveryContext::new().with_format("json");
        let failure = strategy().apply(&err, &ctx).unwrap_err();
        assert_eq!(failure.code(), &ErrorCode::INVALID_FORMAT);
        assert!(failure.message().contains("'json'"));
        assert!(failure.cause().is_some());
    }

    #[test]
    fn test_substitutes_next_format() {
        let err = OutputError::validation(ErrorCode::INVALID_FORMAT, "xlsx rejected");
        let ctx = RecoveryContext::new().with_format("xlsx");
        assert_eq!(
            strategy().apply(&err, &ctx),
            Ok(Recovered::Format("csv".to_string()))
        );
    }
}
