//! Error handling pipeline for data output.
//!
//! Ties the other `outguard` crates together:
//!
//! - [`ErrorHandler`]: strict, lenient or interactive policy per error
//! - [`ErrorRouter`]: recovery first, then the handler, with every error
//!   also sent to a shared reporter
//! - [`MigrationHelper`]: legacy abort-on-error compatibility
//! - [`guard`]: panics become `Fatal` errors
//! - [`OutguardConfig`]: TOML configuration building all of the above
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use outguard_core::{ErrorHandler, ErrorRouter};
//! use outguard_validate::{RequiredColumnsValidator, Table, ValidationRunner};
//!
//! let handler = Arc::new(ErrorHandler::lenient());
//! let router = ErrorRouter::new(Arc::clone(&handler));
//! let runner = ValidationRunner::collect_all().with(RequiredColumnsValidator::new(["Id", "Email"]));
//!
//! let table = Table::new(["Id"]);
//! assert!(router.validate_and_route(&runner, &table, None).is_ok());
//! assert_eq!(handler.summary().by_code["OUT-2001"], 1);
//! ```

pub mod config;
mod guard;
mod handler;
mod migration;
mod router;

pub use config::{ConfigError, OutguardConfig};
pub use guard::guard;
pub use handler::{Decision, ErrorHandler, ErrorMode, ErrorSummary, Prompter, UnknownMode};
pub use migration::{CompatMode, MigrationHelper};
pub use router::ErrorRouter;

// Re-exports so embedders can depend on this crate alone.
pub use outguard_error as error;
pub use outguard_recovery as recovery;
pub use outguard_report as report;
pub use outguard_validate as validate;
