//! Error reporting and monitoring.
//!
//! - [`ErrorReporter`]: append-only, thread-safe log of reported errors with
//!   [`ExtendedErrorSummary`] and [`ErrorMetrics`] aggregations
//! - [`Logger`]: leveled structured logging contract with [`JsonLogger`],
//!   [`TracingLogger`] and [`MemoryLogger`]
//! - [`MonitoringIntegration`]: payloads for external monitoring and
//!   [`AlertThreshold`] checks
//!
//! Time comes from a [`Clock`] so summaries can be tested deterministically.

mod clock;
mod error;
mod logger;
mod monitoring;
mod reporter;
mod summary;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ReportError, Result};
pub use logger::{Fields, JsonLogger, LogEntry, LogLevel, Logger, MemoryLogger, TracingLogger};
pub use monitoring::{AlertThreshold, MonitoringIntegration, MonitoringPayload};
pub use reporter::{ErrorReporter, ReportedError};
pub use summary::{
    ErrorFrequency, ErrorMetrics, ExtendedErrorSummary, TREND_WINDOW_MINUTES, TrendPoint,
};
