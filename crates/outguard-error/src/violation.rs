//! Single constraint failures inside a validation error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One constraint failure.
///
/// Field paths follow `name[index]` for row-level failures and
/// `name[index].subfield` for cell-level failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    #[serde(default)]
    pub value: Value,
    pub constraint: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<Value>,
        constraint: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

/// Path for a whole record, e.g. `row[3]`.
pub fn row_path(name: &str, index: usize) -> String {
    format!("{name}[{index}]")
}

/// Path for a cell inside a record, e.g. `row[3].Age`.
pub fn cell_path(name: &str, index: usize, subfield: &str) -> String {
    format!("{name}[{index}].{subfield}")
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.constraint)
    }
}
