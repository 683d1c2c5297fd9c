//! CSV files to [`Table`]s.
//!
//! Cells are typed by content: empty cells are null, then booleans,
//! integers, floats and RFC 3339 timestamps are tried before falling back to
//! text. A row whose width differs from the header becomes a missing record
//! slot, which the malformed-data check reports.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use outguard_error::{ErrorBuilder, ErrorCode, OutputError};
use outguard_validate::{Table, Value};
use thiserror::Error;

/// Result type alias for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised while reading CSV input.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Header row could not be read.
    #[error("failed to read header of {path}: {source}")]
    Header {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A data row could not be read.
    #[error("failed to read row {row} of {path}: {source}")]
    Row {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },
}

impl IngestError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::Header { path, .. } | Self::Row { path, .. } => path,
        }
    }

    /// Error code used when routing this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Open { source, .. } if source.is_io_error() => ErrorCode::RESOURCE_NOT_FOUND,
            Self::Open { .. } => ErrorCode::INVALID_FILE_PATH,
            Self::Header { .. } | Self::Row { .. } => ErrorCode::MALFORMED_DATA,
        }
    }

    /// Get a user-friendly suggestion for this error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Open { .. } => "Check that the file exists and is readable",
            Self::Header { .. } => "Make sure the first line is a comma-separated header",
            Self::Row { .. } => "Check the file encoding and quoting around that row",
        }
    }

    /// Convert into a taxonomy error keeping this one as the cause.
    pub fn into_output_error(self) -> OutputError {
        let builder = ErrorBuilder::new(self.code(), self.to_string())
            .with_operation("ingest")
            .with_value(self.path().display().to_string())
            .with_suggestions([self.suggestion()]);
        builder.with_cause(self).build_processing(false)
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Type a raw CSV cell.
pub fn parse_cell(raw: &str) -> Value {
    let cell = raw.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(b) = cell.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = cell.parse::<f64>()
        && f.is_finite()
    {
        return Value::Float(f);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Value::Timestamp(ts.with_timezone(&Utc));
    }
    Value::Text(cell.to_string())
}

/// Read a CSV file with a header row into a table titled by the file stem.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let keys: Vec<String> = reader
        .headers()
        .map_err(|source| IngestError::Header {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(normalize_header)
        .collect();

    let title = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    let mut table = Table::new(keys.iter().cloned()).with_title(title);

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|source| IngestError::Row {
            path: path.to_path_buf(),
            row,
            source,
        })?;
        if record.len() != keys.len() {
            tracing::debug!(row, expected = keys.len(), found = record.len(), "row width mismatch");
            table.push_missing();
            continue;
        }
        table.push(
            keys.iter()
                .zip(record.iter())
                .map(|(key, cell)| (key.clone(), parse_cell(cell))),
        );
    }

    tracing::debug!(path = %path.display(), records = table.len(), "read table");
    Ok(table)
}
