//! TOML configuration for a handling pipeline.
//!
//! ```toml
//! [handler]
//! mode = "lenient"
//!
//! [validation]
//! mode = "collect_all"
//! required_columns = ["Id", "Amount"]
//! column_types = { Id = "int", Amount = "float" }
//! positive = ["Amount"]
//! ranges = { Discount = { min = 0.0, max = 100.0 } }
//!
//! [recovery]
//! fallback_formats = ["xlsx", "csv"]
//! defaults = { Currency = "EUR" }
//! retry = { base_ms = 100, max_ms = 5000, max_attempts = 3 }
//!
//! [monitoring]
//! service_name = "billing-export"
//! threshold = { total_errors = 50, min_severity = "fatal", window_secs = 300 }
//! ```
//!
//! Every section and field is optional.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use outguard_error::Severity;
use outguard_recovery::{
    DefaultRecoveryHandler, DefaultValueStrategy, ExponentialBackoff, FormatFallbackStrategy,
    RetryStrategy,
};
use outguard_report::AlertThreshold;
use outguard_validate::{
    Constraint, ConstraintValidator, DataTypeValidator, EmptyDatasetValidator,
    MalformedDataValidator, RequiredColumnsValidator, UnknownKind, ValidationMode,
    ValidationRunner, ValueKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error;

use crate::handler::{ErrorHandler, ErrorMode};

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config text is not valid TOML for this schema.
    #[error("invalid config: {source}")]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    /// Config could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A column type name is not a known value kind.
    #[error("column '{column}': {source}")]
    UnknownKind {
        column: String,
        #[source]
        source: UnknownKind,
    },

    /// A range has `min` above `max`.
    #[error("column '{column}': range min {min} is greater than max {max}")]
    InvalidRange { column: String, min: f64, max: f64 },
}

impl ConfigError {
    /// Get a user-friendly suggestion for this error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Read { .. } => "Check that the config path exists and is readable",
            Self::Parse { .. } => "Fix the TOML syntax or remove the unknown key",
            Self::Serialize(_) => "Remove non-finite numbers from the configuration",
            Self::UnknownKind { .. } => {
                "Use one of: nil, bool, int, uint, float, string, time, list, any"
            }
            Self::InvalidRange { .. } => "Swap the range bounds so min <= max",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerConfig {
    pub mode: ErrorMode,
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub mode: ValidationMode,
    pub required_columns: Vec<String>,
    /// Column name to value kind name (`int`, `float`, `string`, ...).
    pub column_types: BTreeMap<String, String>,
    pub allow_empty: bool,
    pub strict_malformed: bool,
    pub ranges: BTreeMap<String, RangeConfig>,
    pub positive: Vec<String>,
    pub non_empty: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub base_ms: u64,
    pub max_ms: u64,
    /// Total attempts; 0 disables retry recovery.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_ms: 100,
            max_ms: 5_000,
            max_attempts: 3,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::from_millis(self.base_ms, self.max_ms, self.max_attempts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecoveryConfig {
    pub fallback_formats: Vec<String>,
    pub defaults: BTreeMap<String, Json>,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    pub error_rate: Option<f64>,
    pub total_errors: Option<usize>,
    pub min_severity: Option<Severity>,
    pub window_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitoringConfig {
    pub service_name: String,
    pub webhook_url: Option<String>,
    pub threshold: ThresholdConfig,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "outguard".to_string(),
            webhook_url: None,
            threshold: ThresholdConfig::default(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutguardConfig {
    pub handler: HandlerConfig,
    pub validation: ValidationConfig,
    pub recovery: RecoveryConfig,
    pub monitoring: MonitoringConfig,
}

impl OutguardConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Parse { path: None, source })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn error_handler(&self) -> ErrorHandler {
        ErrorHandler::new(self.handler.mode)
    }

    /// Build a runner with every configured check.
    ///
    /// The empty-dataset and malformed-data checks are always present; the
    /// others only when they have something to check.
    pub fn validation_runner(&self) -> Result<ValidationRunner> {
        let v = &self.validation;
        let mut runner = ValidationRunner::new(v.mode)
            .with(EmptyDatasetValidator::new(v.allow_empty))
            .with(MalformedDataValidator::new(v.strict_malformed));

        if !v.required_columns.is_empty() {
            runner.push(Box::new(RequiredColumnsValidator::new(
                v.required_columns.iter().cloned(),
            )));
        }

        if !v.column_types.is_empty() {
            let mut types = BTreeMap::new();
            for (column, kind) in &v.column_types {
                let kind: ValueKind =
                    kind.parse().map_err(|source| ConfigError::UnknownKind {
                        column: column.clone(),
                        source,
                    })?;
                types.insert(column.clone(), kind);
            }
            runner.push(Box::new(DataTypeValidator::from_map(types)));
        }

        let mut constraints = ConstraintValidator::new();
        for column in &v.positive {
            constraints.add(Constraint::positive_number(column.clone()));
        }
        for column in &v.non_empty {
            constraints.add(Constraint::non_empty_string(column.clone()));
        }
        for (column, range) in &v.ranges {
            if range.min > range.max {
                return Err(ConfigError::InvalidRange {
                    column: column.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
            constraints.add(Constraint::numeric_range(column.clone(), range.min, range.max));
        }
        if !constraints.constraints().is_empty() {
            runner.push(Box::new(constraints));
        }

        Ok(runner)
    }

    pub fn recovery_handler(&self) -> DefaultRecoveryHandler {
        let r = &self.recovery;
        let mut handler = DefaultRecoveryHandler::new();
        if !r.defaults.is_empty() {
            handler.register(Box::new(DefaultValueStrategy::from_map(r.defaults.clone())));
        }
        if !r.fallback_formats.is_empty() {
            handler.register(Box::new(FormatFallbackStrategy::new(
                r.fallback_formats.iter().cloned(),
            )));
        }
        if r.retry.max_attempts > 0 {
            handler.register(Box::new(RetryStrategy::new(r.retry.backoff())));
        }
        handler
    }

    pub fn alert_threshold(&self) -> AlertThreshold {
        let t = &self.monitoring.threshold;
        AlertThreshold {
            error_rate: t.error_rate,
            total_errors: t.total_errors,
            min_severity: t.min_severity,
            window: t.window_secs.map(Duration::from_secs),
        }
    }
}
