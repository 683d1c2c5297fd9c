//! Promote arbitrary errors into the taxonomy.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::code::ErrorCode;
use crate::error::OutputError;

/// Message used when a foreign error is wrapped.
pub const UNEXPECTED_MESSAGE: &str = "unexpected error";

/// Convert any error into an [`OutputError`].
///
/// An `OutputError` is returned unchanged, so wrapping is idempotent. Any
/// other error becomes a non-retryable processing error with code
/// [`ErrorCode::UNEXPECTED`] and the original as its cause.
pub fn wrap_error<E>(err: E) -> OutputError
where
    E: Into<Box<dyn StdError + Send + Sync + 'static>>,
{
    match err.into().downcast::<OutputError>() {
        Ok(output) => *output,
        Err(other) => OutputError::processing(ErrorCode::UNEXPECTED, UNEXPECTED_MESSAGE, false)
            .with_shared_cause(Arc::from(other))
            .with_suggestions(["Check the underlying cause for details"]),
    }
}
