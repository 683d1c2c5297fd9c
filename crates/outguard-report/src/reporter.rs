//! Long-lived error aggregation.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use outguard_error::{ErrorCode, OutputError};
use serde::Serialize;
use serde_json::Value as Json;

use crate::clock::{Clock, SystemClock};
use crate::error::{ReportError, Result};
use crate::logger::{Fields, JsonLogger, LogLevel, Logger};
use crate::summary::{ErrorMetrics, ExtendedErrorSummary};

/// One reported error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedError {
    pub error: OutputError,
    pub timestamp: DateTime<Utc>,
    pub operation: Option<String>,
}

#[derive(Debug)]
struct ReportLog {
    entries: Vec<ReportedError>,
    window_start: DateTime<Utc>,
}

/// Append-only log of reported errors with summaries and metrics.
///
/// `report` takes the write lock; queries share the read lock, so an
/// aggregation never sees a half-appended entry. Entries keep the order in
/// which `report` calls acquired the lock.
pub struct ErrorReporter {
    log: RwLock<ReportLog>,
    logger: Arc<dyn Logger>,
    clock: Arc<dyn Clock>,
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(Arc::new(JsonLogger::stderr()))
    }
}

impl ErrorReporter {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_clock(logger, Arc::new(SystemClock))
    }

    pub fn with_clock(logger: Arc<dyn Logger>, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now();
        Self {
            log: RwLock::new(ReportLog {
                entries: Vec::new(),
                window_start,
            }),
            logger,
            clock,
        }
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Record an error and forward it to the logger.
    pub fn report(&self, error: OutputError) {
        let fields = log_fields(&error);
        let level = LogLevel::from(error.severity());
        let message = error.message().to_string();

        {
            let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
            log.entries.push(ReportedError {
                operation: error.context().operation.clone(),
                timestamp: self.clock.now(),
                error,
            });
        }

        self.logger.log(level, &message, &fields);
    }

    pub fn len(&self) -> usize {
        self.read(|log| log.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.read(|log| log.window_start)
    }

    /// Every reported error, oldest first.
    pub fn history(&self) -> Vec<ReportedError> {
        self.read(|log| log.entries.clone())
    }

    /// Errors reported at or after `since`.
    pub fn errors_since(&self, since: DateTime<Utc>) -> Vec<ReportedError> {
        self.read(|log| {
            log.entries
                .iter()
                .filter(|e| e.timestamp >= since)
                .cloned()
                .collect()
        })
    }

    pub fn errors_by_code(&self, code: &ErrorCode) -> Vec<ReportedError> {
        self.read(|log| {
            log.entries
                .iter()
                .filter(|e| e.error.code() == code)
                .cloned()
                .collect()
        })
    }

    pub fn summary(&self) -> ExtendedErrorSummary {
        let now = self.clock.now();
        self.read(|log| ExtendedErrorSummary::compute(&log.entries, log.window_start, now))
    }

    /// Summary over errors reported at or after `since`.
    ///
    /// The rate is measured from `since` or the window start, whichever is
    /// later.
    pub fn summary_since(&self, since: DateTime<Utc>) -> ExtendedErrorSummary {
        let now = self.clock.now();
        self.read(|log| {
            let recent: Vec<ReportedError> = log
                .entries
                .iter()
                .filter(|e| e.timestamp >= since)
                .cloned()
                .collect();
            ExtendedErrorSummary::compute(&recent, log.window_start.max(since), now)
        })
    }

    pub fn get_metrics(&self) -> ErrorMetrics {
        let now = self.clock.now();
        self.read(|log| ErrorMetrics::compute(&log.entries, log.window_start, now))
    }

    /// Clear the log and restart the window.
    pub fn reset(&self) {
        let now = self.clock.now();
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        log.entries.clear();
        log.window_start = now;
    }

    /// Summary as indented JSON.
    pub fn export_summary_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }

    /// Metrics as indented JSON.
    pub fn export_metrics_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.get_metrics())?)
    }

    /// Write the metrics JSON to a file.
    pub fn write_metrics(&self, path: &Path) -> Result<()> {
        let json = self.export_metrics_json()?;
        fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote error metrics");
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&ReportLog) -> T) -> T {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        f(&log)
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("len", &self.len())
            .field("window_start", &self.window_start())
            .finish_non_exhaustive()
    }
}

fn log_fields(error: &OutputError) -> Fields {
    let mut fields = Fields::new();
    fields.insert("code".into(), Json::from(error.code().as_str()));
    fields.insert("severity".into(), Json::from(error.severity().as_str()));
    fields.insert("kind".into(), Json::from(error.kind().as_str()));
    if let Some(category) = error.code().category() {
        fields.insert("category".into(), Json::from(category.label()));
    }
    let context = error.context();
    if let Some(operation) = &context.operation {
        fields.insert("operation".into(), Json::from(operation.as_str()));
    }
    if let Some(field) = &context.field {
        fields.insert("field".into(), Json::from(field.as_str()));
    }
    if !error.suggestions().is_empty() {
        fields.insert("suggestions".into(), Json::from(error.suggestions().to_vec()));
    }
    if error.count() > 1 {
        fields.insert("count".into(), Json::from(error.count()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use outguard_error::{ErrorBuilder, Severity};

    use super::*;
    use crate::clock::ManualClock;
    use crate::logger::MemoryLogger;

    fn setup() -> (ErrorReporter, Arc<MemoryLogger>, Arc<ManualClock>) {
        let logger = Arc::new(MemoryLogger::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap(),
        ));
        let reporter = ErrorReporter::with_clock(logger.clone(), clock.clone());
        (reporter, logger, clock)
    }

    #[test]
    fn test_report_logs_at_mapped_level() {
        let (reporter, logger, _) = setup();
        reporter.report(
            ErrorBuilder::new(ErrorCode::MISSING_COLUMN, "missing Email")
                .with_severity(Severity::Warning)
                .with_operation("validate")
                .build(),
        );

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].message, "missing Email");
        assert_eq!(entries[0].fields["code"], "OUT-2001");
        assert_eq!(entries[0].fields["operation"], "validate");
        assert_eq!(reporter.history()[0].operation.as_deref(), Some("validate"));
    }

    #[test]
    fn test_history_queries() {
        let (reporter, _, clock) = setup();
        reporter.report(OutputError::validation(ErrorCode::EMPTY_DATASET, "empty"));
        clock.advance(TimeDelta::minutes(10));
        let cutoff = clock.now();
        reporter.report(OutputError::validation(ErrorCode::MISSING_COLUMN, "a"));
        reporter.report(OutputError::validation(ErrorCode::EMPTY_DATASET, "empty again"));

        assert_eq!(reporter.len(), 3);
        assert_eq!(reporter.errors_since(cutoff).len(), 2);
        assert_eq!(reporter.errors_by_code(&ErrorCode::EMPTY_DATASET).len(), 2);
    }

    #[test]
    fn test_reset_restarts_window() {
        let (reporter, _, clock) = setup();
        reporter.report(OutputError::validation(ErrorCode::EMPTY_DATASET, "empty"));
        clock.advance(TimeDelta::hours(1));
        reporter.reset();
        assert!(reporter.is_empty());
        assert_eq!(reporter.window_start(), clock.now());
        assert_eq!(reporter.summary().error_rate, 0.0);
    }

    #[test]
    fn test_error_rate_per_minute() {
        let (reporter, _, clock) = setup();
        for _ in 0..6 {
            reporter.report(OutputError::validation(ErrorCode::EMPTY_DATASET, "empty"));
        }
        assert_eq!(reporter.summary().error_rate, 0.0);
        clock.advance(TimeDelta::minutes(3));
        let summary = reporter.summary();
        assert_eq!(summary.duration(), TimeDelta::minutes(3));
        assert!((summary.error_rate - 2.0).abs() < f64::EPSILON);
    }
}
