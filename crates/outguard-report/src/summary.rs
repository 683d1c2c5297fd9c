//! Aggregations over the reporter log.

use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};
use outguard_error::{ErrorCode, Severity};
use serde::{Deserialize, Serialize};

use crate::reporter::ReportedError;

/// Width of one trend window.
pub const TREND_WINDOW_MINUTES: i64 = 5;

/// Occurrence statistics for one error code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorFrequency {
    pub code: ErrorCode,
    pub count: usize,
    pub last_seen: DateTime<Utc>,
    /// Highest severity reported for this code.
    pub severity: Severity,
    /// Message of the first occurrence.
    pub sample_message: String,
}

/// Summary of every error in the reporter log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedErrorSummary {
    pub total_errors: usize,
    pub by_code: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub first_occurrence: Option<DateTime<Utc>>,
    pub last_occurrence: Option<DateTime<Utc>>,
    /// Milliseconds from the start of the window to the time of the summary.
    pub duration_ms: i64,
    /// Errors per minute over `duration_ms`; zero when the duration is zero.
    pub error_rate: f64,
    pub suggestions: Vec<String>,
    /// Per-code frequencies, most frequent first.
    pub top_errors: Vec<ErrorFrequency>,
}

impl ExtendedErrorSummary {
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.duration_ms)
    }

    /// Count of errors at or above `min`.
    pub fn count_at_least(&self, min: Severity) -> usize {
        self.by_severity
            .iter()
            .filter(|(severity, _)| **severity >= min)
            .map(|(_, count)| count)
            .sum()
    }

    pub(crate) fn compute(
        entries: &[ReportedError],
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut by_code: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
        let mut suggestions: Vec<String> = Vec::new();
        let mut frequencies: Vec<ErrorFrequency> = Vec::new();

        for entry in entries {
            let error = &entry.error;
            *by_code.entry(error.code().to_string()).or_default() += 1;
            *by_severity.entry(error.severity()).or_default() += 1;

            for suggestion in error.suggestions() {
                if !suggestions.contains(suggestion) {
                    suggestions.push(suggestion.clone());
                }
            }

            match frequencies.iter_mut().find(|f| &f.code == error.code()) {
                Some(freq) => {
                    freq.count += 1;
                    freq.last_seen = freq.last_seen.max(entry.timestamp);
                    freq.severity = freq.severity.max(error.severity());
                }
                None => frequencies.push(ErrorFrequency {
                    code: error.code().clone(),
                    count: 1,
                    last_seen: entry.timestamp,
                    severity: error.severity(),
                    sample_message: error.message().to_string(),
                }),
            }
        }

        // Stable: equal counts keep first-seen order.
        frequencies.sort_by(|a, b| b.count.cmp(&a.count));

        let duration = (now - window_start).max(TimeDelta::zero());
        let duration_ms = duration.num_milliseconds();
        let minutes = duration_ms as f64 / 60_000.0;
        let error_rate = if duration_ms == 0 {
            0.0
        } else {
            entries.len() as f64 / minutes
        };

        Self {
            total_errors: entries.len(),
            by_code,
            by_severity,
            first_occurrence: entries.iter().map(|e| e.timestamp).min(),
            last_occurrence: entries.iter().map(|e| e.timestamp).max(),
            duration_ms,
            error_rate,
            suggestions,
            top_errors: frequencies,
        }
    }
}

/// Error count in one trend window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub start: DateTime<Utc>,
    pub count: usize,
}

/// Summary plus time-bucketed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub summary: ExtendedErrorSummary,
    /// Error counts keyed by hour of day (0-23), observed hours only.
    pub hourly: BTreeMap<u32, usize>,
    /// Counts per fixed window from the first to the last error, with empty
    /// windows present as zero.
    pub trend: Vec<TrendPoint>,
}

impl ErrorMetrics {
    pub(crate) fn compute(
        entries: &[ReportedError],
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut hourly: BTreeMap<u32, usize> = BTreeMap::new();
        for entry in entries {
            *hourly.entry(entry.timestamp.hour()).or_default() += 1;
        }

        Self {
            summary: ExtendedErrorSummary::compute(entries, window_start, now),
            hourly,
            trend: trend(entries),
        }
    }
}

fn window_of(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let width = TimeDelta::minutes(TREND_WINDOW_MINUTES);
    timestamp.duration_trunc(width).unwrap_or(timestamp)
}

fn trend(entries: &[ReportedError]) -> Vec<TrendPoint> {
    let mut counts: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for entry in entries {
        *counts.entry(window_of(entry.timestamp)).or_default() += 1;
    }

    let (Some(first), Some(last)) = (
        counts.keys().next().copied(),
        counts.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let width = TimeDelta::minutes(TREND_WINDOW_MINUTES);
    let mut points = Vec::new();
    let mut start = first;
    while start <= last {
        points.push(TrendPoint {
            start,
            count: counts.get(&start).copied().unwrap_or(0),
        });
        start += width;
    }
    points
}
