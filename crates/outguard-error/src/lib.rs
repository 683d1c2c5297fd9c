//! Structured error taxonomy for data output.
//!
//! This crate defines the error values shared by every other `outguard`
//! crate:
//!
//! - **Codes** ([`ErrorCode`]): stable, category-namespaced identifiers
//! - **Severity** ([`Severity`]): `Info < Warning < Error < Fatal`
//! - **Context** ([`ErrorContext`]): operation, field, value, index, metadata
//! - **Errors** ([`OutputError`]): base, validation, processing and composite
//! - **Builders** ([`ErrorBuilder`], [`ValidationErrorBuilder`])
//! - **Wrapping** ([`wrap_error`]): idempotent promotion of foreign errors
//!
//! # Example
//!
//! ```
//! use outguard_error::{ErrorCode, OutputError, Violation, wrap_error};
//!
//! let err = OutputError::validation(ErrorCode::MISSING_COLUMN, "missing columns")
//!     .with_violations([Violation::new("Email", serde_json::Value::Null, "required", "missing")]);
//! assert_eq!(wrap_error(err.clone()), err);
//! ```

mod builder;
mod code;
mod context;
mod error;
mod json;
mod severity;
mod violation;
mod wrap;

pub use builder::{ErrorBuilder, ValidationErrorBuilder};
pub use code::{ErrorCategory, ErrorCode};
pub use context::ErrorContext;
pub use error::{Cause, ErrorKind, OutputError};
pub use json::{ErrorRecord, FlattenedCause};
pub use severity::{Severity, UnknownSeverity};
pub use violation::{Violation, cell_path, row_path};
pub use wrap::{UNEXPECTED_MESSAGE, wrap_error};

/// Result type alias for operations that fail with an [`OutputError`].
pub type Result<T> = std::result::Result<T, OutputError>;
