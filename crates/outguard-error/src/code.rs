//! Stable error codes.
//!
//! Codes are namespaced by category prefix so callers can match on them
//! programmatically while the human-readable message is free to change:
//!
//! - `OUT-1xxx`: configuration
//! - `OUT-2xxx`: validation
//! - `OUT-3xxx`: processing
//! - `OUT-4xxx`: runtime

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad family an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad setup, e.g. incompatible format options.
    Configuration,
    /// Data shape or content problems.
    Validation,
    /// Failures while doing the work.
    Processing,
    /// Environment failures: network, permissions, missing resources.
    Runtime,
}

impl ErrorCategory {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration",
            Self::Validation => "Validation",
            Self::Processing => "Processing",
            Self::Runtime => "Runtime",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque, stable identifier for a kind of failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    // Configuration
    pub const INVALID_FORMAT: Self = Self::from_static("OUT-1001");
    pub const MISSING_REQUIRED: Self = Self::from_static("OUT-1002");
    pub const INCOMPATIBLE_CONFIG: Self = Self::from_static("OUT-1003");
    pub const INVALID_FILE_PATH: Self = Self::from_static("OUT-1004");

    // Validation
    pub const MISSING_COLUMN: Self = Self::from_static("OUT-2001");
    pub const INVALID_DATA_TYPE: Self = Self::from_static("OUT-2002");
    pub const CONSTRAINT_VIOLATION: Self = Self::from_static("OUT-2003");
    pub const EMPTY_DATASET: Self = Self::from_static("OUT-2004");
    pub const MALFORMED_DATA: Self = Self::from_static("OUT-2005");

    // Processing
    pub const FILE_WRITE: Self = Self::from_static("OUT-3001");
    pub const OBJECT_STORE_UPLOAD: Self = Self::from_static("OUT-3002");
    pub const TEMPLATE_RENDER: Self = Self::from_static("OUT-3003");
    pub const TRANSFORMATION: Self = Self::from_static("OUT-3004");
    pub const UNEXPECTED: Self = Self::from_static("OUT-3005");

    // Runtime
    pub const NETWORK_TIMEOUT: Self = Self::from_static("OUT-4001");
    pub const PERMISSION_DENIED: Self = Self::from_static("OUT-4002");
    pub const RESOURCE_NOT_FOUND: Self = Self::from_static("OUT-4003");
    pub const SERVICE_UNAVAILABLE: Self = Self::from_static("OUT-4004");

    /// Every code defined by this crate, in numeric order.
    pub const ALL: [Self; 18] = [
        Self::INVALID_FORMAT,
        Self::MISSING_REQUIRED,
        Self::INCOMPATIBLE_CONFIG,
        Self::INVALID_FILE_PATH,
        Self::MISSING_COLUMN,
        Self::INVALID_DATA_TYPE,
        Self::CONSTRAINT_VIOLATION,
        Self::EMPTY_DATASET,
        Self::MALFORMED_DATA,
        Self::FILE_WRITE,
        Self::OBJECT_STORE_UPLOAD,
        Self::TEMPLATE_RENDER,
        Self::TRANSFORMATION,
        Self::UNEXPECTED,
        Self::NETWORK_TIMEOUT,
        Self::PERMISSION_DENIED,
        Self::RESOURCE_NOT_FOUND,
        Self::SERVICE_UNAVAILABLE,
    ];

    /// Create a code from a static string.
    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    /// Create a code from an owned string (e.g. an application-defined code).
    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category derived from the first digit of the numeric suffix.
    ///
    /// Returns `None` for codes outside the `…-1xxx`..`…-4xxx` ranges.
    pub fn category(&self) -> Option<ErrorCategory> {
        let digits = self.0.rsplit('-').next()?;
        match digits.chars().next()? {
            '1' => Some(ErrorCategory::Configuration),
            '2' => Some(ErrorCategory::Validation),
            '3' => Some(ErrorCategory::Processing),
            '4' => Some(ErrorCategory::Runtime),
            _ => None,
        }
    }

    /// Short description of the built-in codes.
    pub fn description(&self) -> Option<&'static str> {
        let text = match self.as_str() {
            "OUT-1001" => "invalid output format",
            "OUT-1002" => "missing required configuration",
            "OUT-1003" => "incompatible configuration options",
            "OUT-1004" => "invalid file path",
            "OUT-2001" => "missing column",
            "OUT-2002" => "invalid data type",
            "OUT-2003" => "constraint violation",
            "OUT-2004" => "empty dataset",
            "OUT-2005" => "malformed data",
            "OUT-3001" => "file write failed",
            "OUT-3002" => "object store upload failed",
            "OUT-3003" => "template rendering failed",
            "OUT-3004" => "transformation failed",
            "OUT-3005" => "unexpected error",
            "OUT-4001" => "network timeout",
            "OUT-4002" => "permission denied",
            "OUT-4003" => "resource not found",
            "OUT-4004" => "service unavailable",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ErrorCode {
    fn from(code: &'static str) -> Self {
        Self::from_static(code)
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_prefix() {
        assert_eq!(
            ErrorCode::INVALID_FORMAT.category(),
            Some(ErrorCategory::Configuration)
        );
        assert_eq!(
            ErrorCode::MISSING_COLUMN.category(),
            Some(ErrorCategory::Validation)
        );
        assert_eq!(
            ErrorCode::FILE_WRITE.category(),
            Some(ErrorCategory::Processing)
        );
        assert_eq!(
            ErrorCode::NETWORK_TIMEOUT.category(),
            Some(ErrorCategory::Runtime)
        );
        assert_eq!(ErrorCode::new("APP-9001").category(), None);
        assert_eq!(ErrorCode::new("garbage").category(), None);
    }

    #[test]
    fn test_owned_and_static_codes_compare_equal() {
        assert_eq!(ErrorCode::new("OUT-2001"), ErrorCode::MISSING_COLUMN);
    }

    #[test]
    fn test_all_codes_have_descriptions() {
        for code in ErrorCode::ALL {
            assert!(code.description().is_some(), "{code} has no description");
        }
    }
}
