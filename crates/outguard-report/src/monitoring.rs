//! Monitoring integration.
//!
//! Wraps a shared [`ErrorReporter`] with a service name and an optional
//! webhook target. Payloads are handed to the reporter's logger; delivering
//! them to the webhook is left to the host.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use outguard_error::Severity;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::logger::Fields;
use crate::reporter::ErrorReporter;
use crate::summary::{ErrorMetrics, ExtendedErrorSummary};

/// Limits that trigger an alert. Unset limits never trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertThreshold {
    /// Errors per minute.
    pub error_rate: Option<f64>,
    pub total_errors: Option<usize>,
    /// Alert on any error at or above this severity.
    pub min_severity: Option<Severity>,
    /// Only errors this recent count. `None` uses the whole log.
    pub window: Option<Duration>,
}

impl AlertThreshold {
    /// Names of the limits a summary exceeds.
    pub fn breaches(&self, summary: &ExtendedErrorSummary) -> Vec<&'static str> {
        let mut breached = Vec::new();
        if self.error_rate.is_some_and(|limit| summary.error_rate > limit) {
            breached.push("error_rate");
        }
        if self
            .total_errors
            .is_some_and(|limit| summary.total_errors > limit)
        {
            breached.push("total_errors");
        }
        if self
            .min_severity
            .is_some_and(|min| summary.count_at_least(min) > 0)
        {
            breached.push("min_severity");
        }
        breached
    }
}

/// Document sent to a monitoring backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringPayload {
    pub service: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub metrics: ErrorMetrics,
}

#[derive(Debug, Clone)]
pub struct MonitoringIntegration {
    reporter: Arc<ErrorReporter>,
    service_name: String,
    webhook_url: Option<String>,
}

impl MonitoringIntegration {
    pub fn new(reporter: Arc<ErrorReporter>, service_name: impl Into<String>) -> Self {
        Self {
            reporter,
            service_name: service_name.into(),
            webhook_url: None,
        }
    }

    #[must_use]
    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn reporter(&self) -> &Arc<ErrorReporter> {
        &self.reporter
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    pub fn build_payload(&self) -> MonitoringPayload {
        MonitoringPayload {
            service: self.service_name.clone(),
            timestamp: self.reporter.now(),
            webhook_url: self.webhook_url.clone(),
            metrics: self.reporter.get_metrics(),
        }
    }

    /// Build a payload and hand it to the reporter's logger.
    pub fn send_metrics(&self) -> Result<MonitoringPayload> {
        let payload = self.build_payload();
        let mut fields = Fields::new();
        fields.insert("service".into(), self.service_name.clone().into());
        if let Some(url) = &self.webhook_url {
            fields.insert("webhook_url".into(), url.clone().into());
        }
        fields.insert("payload".into(), serde_json::to_value(&payload)?);
        self.reporter.logger().info("error metrics", &fields);
        Ok(payload)
    }

    /// Whether the current log breaches any configured limit.
    pub fn check_thresholds(&self, threshold: &AlertThreshold) -> bool {
        // A window reaching past the representable range covers the whole log.
        let since = threshold
            .window
            .and_then(|window| TimeDelta::from_std(window).ok())
            .and_then(|window| self.reporter.now().checked_sub_signed(window));
        let summary = match since {
            Some(since) => self.reporter.summary_since(since),
            None => self.reporter.summary(),
        };
        let breached = threshold.breaches(&summary);
        if !breached.is_empty() {
            tracing::warn!(
                service = %self.service_name,
                breached = ?breached,
                total = summary.total_errors,
                rate = summary.error_rate,
                "alert threshold exceeded"
            );
        }
        !breached.is_empty()
    }
}
