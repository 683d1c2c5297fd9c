//! Recovery strategies for output errors.
//!
//! A [`DefaultRecoveryHandler`] holds [`RecoveryStrategy`] implementations
//! ordered by priority (lower first) and applies the first one that succeeds:
//!
//! - [`DefaultValueStrategy`] (priority 5): substitute a configured default
//! - [`FormatFallbackStrategy`] (priority 10): try the next output format
//! - [`RetryStrategy`] (priority 20): re-invoke a retryable operation with
//!   [`ExponentialBackoff`]
//! - [`CompositeStrategy`]: first success among several strategies
//!
//! # Example
//!
//! ```
//! use outguard_error::{ErrorCode, OutputError};
//! use outguard_recovery::{DefaultRecoveryHandler, FormatFallbackStrategy, Recovered, RecoveryContext};
//!
//! let handler = DefaultRecoveryHandler::new().with(FormatFallbackStrategy::new(["xlsx", "csv"]));
//! let err = OutputError::validation(ErrorCode::INVALID_FORMAT, "xlsx rejected");
//! let recovery = handler.recover(&err, &RecoveryContext::new().with_format("xlsx")).unwrap();
//! assert_eq!(recovery.result, Recovered::Format("csv".into()));
//! ```

mod backoff;
mod handler;
pub mod strategies;
mod strategy;

pub use backoff::{ExponentialBackoff, RecordingSleeper, Sleeper, ThreadSleeper};
pub use handler::{DefaultRecoveryHandler, Recovery};
pub use strategies::composite::CompositeStrategy;
pub use strategies::default_value::DefaultValueStrategy;
pub use strategies::format::FormatFallbackStrategy;
pub use strategies::retry::RetryStrategy;
pub use strategy::{DEFAULT_PRIORITY, Recovered, RecoveryContext, RecoveryStrategy};
