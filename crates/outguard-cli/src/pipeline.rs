//! Validation pipeline over CSV files.
//!
//! One [`ErrorRouter`] is shared by every file so the handler and reporter
//! see the whole run. A surfaced error stops the file it came from; later
//! files are still checked.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use outguard_core::{ErrorHandler, ErrorMode, ErrorRouter, ErrorSummary, OutguardConfig};
use outguard_error::{OutputError, Severity};
use outguard_recovery::{Recovery, RecoveryContext};
use outguard_report::{ErrorReporter, ExtendedErrorSummary, MonitoringIntegration, TracingLogger};
use outguard_validate::{ValidationContext, ValidationMode};
use tracing::{info, info_span, warn};

use crate::ingest::read_table;

/// How one file fared.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// No validator failed.
    Passed,
    /// Errors were recovered or collected; processing went on.
    Continued {
        recovered: Vec<Recovery>,
        collected: usize,
    },
    /// The handler surfaced this error.
    Failed(OutputError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Record slots read, including malformed rows.
    pub records: usize,
    pub status: FileStatus,
}

#[derive(Debug)]
pub struct ValidationOutcome {
    pub files: Vec<FileOutcome>,
    /// Errors the handler collected across all files.
    pub collected: ErrorSummary,
    /// Everything reported, recovered errors included.
    pub report: ExtendedErrorSummary,
    /// Whether a configured alert threshold was breached.
    pub alert: bool,
    pub metrics_path: Option<PathBuf>,
}

impl ValidationOutcome {
    /// Whether the run should exit unsuccessfully.
    pub fn has_errors(&self) -> bool {
        self.files
            .iter()
            .any(|f| matches!(f.status, FileStatus::Failed(_)))
            || self
                .collected
                .by_severity
                .range(Severity::Error..)
                .any(|(_, count)| *count > 0)
    }
}

/// Validate each file with the pipeline built from `config`.
///
/// `handler` decides what surfaces; it is normally `config.error_handler()`,
/// possibly with a prompter attached.
pub fn validate_files(
    files: &[PathBuf],
    config: &OutguardConfig,
    handler: ErrorHandler,
    metrics_path: Option<&Path>,
) -> Result<ValidationOutcome> {
    let runner = config
        .validation_runner()
        .context("build validation runner")?;
    let handler = Arc::new(handler);
    let reporter = Arc::new(ErrorReporter::new(Arc::new(TracingLogger)));
    let router = ErrorRouter::new(Arc::clone(&handler))
        .with_recovery(config.recovery_handler())
        .with_reporter(Arc::clone(&reporter));

    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
        let span = info_span!("file", path = %path.display());
        let _guard = span.enter();
        let before = handler.get_collected_errors().len();

        let (records, result) = match read_table(path) {
            Ok(table) => {
                let context = ValidationContext::new()
                    .with_operation("validate")
                    .with_value("file", path.display().to_string());
                let records = table.len();
                (records, router.validate_and_route(&runner, &table, Some(&context)))
            }
            Err(err) => {
                warn!(error = %err, "could not read input");
                let routed = router
                    .route(err.into_output_error(), &RecoveryContext::new())
                    .map(|recovered| recovered.into_iter().collect::<Vec<_>>());
                (0, routed)
            }
        };

        let collected = handler.get_collected_errors().len() - before;
        let status = match result {
            Ok(recovered) if recovered.is_empty() && collected == 0 => FileStatus::Passed,
            Ok(recovered) => FileStatus::Continued {
                recovered,
                collected,
            },
            Err(err) => FileStatus::Failed(err),
        };
        info!(records, ?status, "file checked");
        outcomes.push(FileOutcome {
            path: path.clone(),
            records,
            status,
        });
    }

    let monitoring = MonitoringIntegration::new(Arc::clone(&reporter), &config.monitoring.service_name);
    let monitoring = match &config.monitoring.webhook_url {
        Some(url) => monitoring.with_webhook(url.clone()),
        None => monitoring,
    };
    let alert = monitoring.check_thresholds(&config.alert_threshold());
    if monitoring.webhook_url().is_some() {
        monitoring.send_metrics().context("send error metrics")?;
    }

    if let Some(path) = metrics_path {
        reporter
            .write_metrics(path)
            .with_context(|| format!("write metrics to {}", path.display()))?;
    }

    Ok(ValidationOutcome {
        files: outcomes,
        collected: handler.summary(),
        report: reporter.summary(),
        alert,
        metrics_path: metrics_path.map(Path::to_path_buf),
    })
}

/// Apply command-line overrides on top of a loaded config.
pub fn apply_overrides(config: &mut OutguardConfig, mode: Option<ErrorMode>, collect_all: bool) {
    if let Some(mode) = mode {
        config.handler.mode = mode;
    }
    if collect_all {
        config.validation.mode = ValidationMode::CollectAll;
    }
}
