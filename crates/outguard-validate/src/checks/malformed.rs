//! Malformed record checks.
//!
//! - A missing record slot is always malformed.
//! - In strict mode every declared key must be present in every record.
//! - Text containing control characters (other than tab, newline and
//!   carriage return) or corruption markers is malformed.

use std::any::Any;

use outguard_error::{ErrorCode, OutputError, ValidationErrorBuilder, Violation, cell_path, row_path};
use serde_json::Value as Json;

use crate::subject::{Table, Value};
use crate::validator::{PerformanceAware, Validator, narrow};

/// Unicode replacement character left behind by lossy decoding.
const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Rejects missing records, missing keys (strict) and corrupted text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MalformedDataValidator {
    strict: bool,
}

impl MalformedDataValidator {
    pub const NAME: &'static str = "malformed_data";

    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Malformed text in `value`, descending into lists as `path[i]`.
fn malformed_texts<'a>(value: &'a Value, path: String, found: &mut Vec<(String, &'a str)>) {
    match value {
        Value::Text(text) if is_malformed_text(text) => found.push((path, text.as_str())),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                malformed_texts(item, format!("{path}[{i}]"), found);
            }
        }
        _ => {}
    }
}

/// Whether a string contains control characters or corruption markers.
pub fn is_malformed_text(text: &str) -> bool {
    text.chars().any(|c| {
        c == '\0' || c == REPLACEMENT_CHAR || (c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    })
}

impl Validator for MalformedDataValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        let table = narrow::<Table>(subject, Self::NAME)?;
        let mut violations = Vec::new();

        for (idx, slot) in table.records.iter().enumerate() {
            let Some(record) = slot else {
                violations.push(Violation::new(
                    row_path("row", idx),
                    Json::Null,
                    "not_null",
                    "record is nil",
                ));
                continue;
            };

            if self.strict {
                for key in table.keys.iter().filter(|key| !record.contains_key(*key)) {
                    violations.push(Violation::new(
                        cell_path("row", idx, key),
                        Json::Null,
                        "required_key",
                        format!("key '{key}' is missing"),
                    ));
                }
            }

            for (key, value) in record {
                let mut found = Vec::new();
                malformed_texts(value, cell_path("row", idx, key), &mut found);
                for (path, text) in found {
                    violations.push(Violation::new(
                        path,
                        text,
                        "well_formed",
                        "value contains control characters or corruption markers",
                    ));
                }
            }
        }

        if violations.is_empty() {
            return Ok(());
        }

        Err(ValidationErrorBuilder::new(
            ErrorCode::MALFORMED_DATA,
            format!("{} malformed values found", violations.len()),
        )
        .with_operation(Self::NAME)
        .with_suggestions([
            "Remove empty records before rendering",
            "Clean control characters and invalid encodings from text values",
        ])
        .with_violations(violations)
        .build())
    }

    fn performance(&self) -> Option<&dyn PerformanceAware> {
        Some(self)
    }
}

impl PerformanceAware for MalformedDataValidator {
    fn estimated_cost(&self) -> u32 {
        5
    }

    fn fail_fast(&self) -> bool {
        false
    }
}
