//! The logger contract used by the reporter and monitoring.
//!
//! Four leveled methods, each taking a message and a string-keyed field
//! map. [`JsonLogger`] is the default and writes one JSON object per call.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use outguard_error::Severity;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::clock::{Clock, SystemClock};

/// Structured fields attached to a log call.
pub type Fields = BTreeMap<String, Json>;

/// Log level, one per logger method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::Info,
            Severity::Warning => Self::Warn,
            Severity::Error => Self::Error,
            Severity::Fatal => Self::Fatal,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Logger: Send + Sync {
    fn info(&self, message: &str, fields: &Fields);
    fn warn(&self, message: &str, fields: &Fields);
    fn error(&self, message: &str, fields: &Fields);
    /// Records a fatal condition. Does not terminate the process.
    fn fatal(&self, message: &str, fields: &Fields);

    fn log(&self, level: LogLevel, message: &str, fields: &Fields) {
        match level {
            LogLevel::Info => self.info(message, fields),
            LogLevel::Warn => self.warn(message, fields),
            LogLevel::Error => self.error(message, fields),
            LogLevel::Fatal => self.fatal(message, fields),
        }
    }
}

/// Writes one JSON object per call: `level`, `msg`, `time`, then the fields.
pub struct JsonLogger<W: Write + Send> {
    out: Mutex<W>,
    clock: Arc<dyn Clock>,
}

impl JsonLogger<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> JsonLogger<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, level: LogLevel, message: &str, fields: &Fields) {
        let mut entry = serde_json::Map::new();
        entry.insert("level".into(), level.as_str().into());
        entry.insert("msg".into(), message.into());
        entry.insert("time".into(), self.clock.now().to_rfc3339().into());
        for (key, value) in fields {
            entry.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let written = serde_json::to_writer(&mut *out, &Json::Object(entry))
            .map_err(io::Error::from)
            .and_then(|()| out.write_all(b"\n"));
        if let Err(err) = written {
            tracing::warn!(error = %err, "failed to write log entry");
        }
    }
}

impl<W: Write + Send> Logger for JsonLogger<W> {
    fn info(&self, message: &str, fields: &Fields) {
        self.write(LogLevel::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: &Fields) {
        self.write(LogLevel::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: &Fields) {
        self.write(LogLevel::Error, message, fields);
    }

    fn fatal(&self, message: &str, fields: &Fields) {
        self.write(LogLevel::Fatal, message, fields);
    }
}

/// Forwards entries to `tracing` events. Fatal maps to `error!` with
/// `fatal = true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

fn render(fields: &Fields) -> String {
    serde_json::to_string(fields).unwrap_or_default()
}

impl Logger for TracingLogger {
    fn info(&self, message: &str, fields: &Fields) {
        tracing::info!(fields = %render(fields), "{message}");
    }

    fn warn(&self, message: &str, fields: &Fields) {
        tracing::warn!(fields = %render(fields), "{message}");
    }

    fn error(&self, message: &str, fields: &Fields) {
        tracing::error!(fields = %render(fields), "{message}");
    }

    fn fatal(&self, message: &str, fields: &Fields) {
        tracing::error!(fatal = true, fields = %render(fields), "{message}");
    }
}

/// One captured log call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub fields: Fields,
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, level: LogLevel, message: &str, fields: &Fields) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level,
                message: message.to_string(),
                fields: fields.clone(),
            });
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str, fields: &Fields) {
        self.push(LogLevel::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: &Fields) {
        self.push(LogLevel::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: &Fields) {
        self.push(LogLevel::Error, message, fields);
    }

    fn fatal(&self, message: &str, fields: &Fields) {
        self.push(LogLevel::Fatal, message, fields);
    }
}
