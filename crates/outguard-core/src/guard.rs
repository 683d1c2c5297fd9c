//! Converts panics into typed errors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use outguard_error::{ErrorBuilder, ErrorCode, OutputError, Severity};

/// Run `f`, turning a panic into a `Fatal` processing error
/// ([`ErrorCode::UNEXPECTED`]) instead of unwinding into the caller.
///
/// The panic hook still runs, so the panic message is printed as usual.
pub fn guard<T, F>(operation: &str, f: F) -> Result<T, OutputError>
where
    F: FnOnce() -> Result<T, OutputError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            tracing::error!(operation, panic = %detail, "operation panicked");
            Err(ErrorBuilder::new(
                ErrorCode::UNEXPECTED,
                format!("{operation} panicked: {detail}"),
            )
            .with_severity(Severity::Fatal)
            .with_operation(operation)
            .with_suggestions(["Report this failure together with the input that caused it"])
            .build_processing(false))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
