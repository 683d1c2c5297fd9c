//! Reporter infrastructure errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for export and monitoring operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors raised while exporting reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Report file could not be written.
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    /// Get a user-friendly suggestion for this error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "Check for non-finite numbers in the reported values",
            Self::Write { .. } => "Check that the directory exists and is writable",
        }
    }
}
