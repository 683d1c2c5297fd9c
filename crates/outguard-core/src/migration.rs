//! Compatibility switch for callers moving off abort-on-error behaviour.

use outguard_error::{OutputError, Severity};
use serde::{Deserialize, Serialize};

use crate::handler::ErrorHandler;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatMode {
    /// Any surfaced error becomes an abort signal (`Fatal`).
    Legacy,
    /// Surfaced errors are returned unchanged.
    #[default]
    Modern,
}

/// Strict handling with a legacy/modern switch on top.
#[derive(Debug, Default)]
pub struct MigrationHelper {
    mode: CompatMode,
    handler: ErrorHandler,
}

impl MigrationHelper {
    pub fn new(mode: CompatMode) -> Self {
        Self {
            mode,
            handler: ErrorHandler::strict(),
        }
    }

    pub fn mode(&self) -> CompatMode {
        self.mode
    }

    /// Handle an error under strict policy.
    ///
    /// In legacy mode a surfaced error is promoted to `Fatal`, which every
    /// handler mode treats as unrecoverable.
    pub fn handle(&self, error: OutputError) -> Result<(), OutputError> {
        match self.handler.handle(error) {
            Ok(()) => Ok(()),
            Err(error) if self.mode == CompatMode::Legacy => {
                tracing::error!(code = %error.code(), "aborting (legacy mode)");
                Err(error.with_severity(Severity::Fatal))
            }
            Err(error) => Err(error),
        }
    }

    /// Whether an error returned by [`handle`](Self::handle) means the
    /// caller must abort.
    pub fn is_abort(error: &OutputError) -> bool {
        error.severity() == Severity::Fatal
    }
}
