//! Empty dataset check.

use std::any::Any;

use outguard_error::{ErrorCode, OutputError, ValidationErrorBuilder, Violation};

use crate::subject::Table;
use crate::validator::{PerformanceAware, Validator, narrow};

/// Field name reported when a dataset has no records.
pub const CONTENTS_FIELD: &str = "Contents";

/// Rejects tables with zero records unless empty output is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDatasetValidator {
    allow_empty: bool,
}

impl EmptyDatasetValidator {
    pub const NAME: &'static str = "empty_dataset";

    pub fn new(allow_empty: bool) -> Self {
        Self { allow_empty }
    }

    /// Validator that rejects empty tables.
    pub fn forbid() -> Self {
        Self::new(false)
    }

    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }
}

impl Validator for EmptyDatasetValidator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&self, subject: &dyn Any) -> Result<(), OutputError> {
        let table = narrow::<Table>(subject, Self::NAME)?;
        if self.allow_empty || !table.is_empty() {
            return Ok(());
        }

        Err(
            ValidationErrorBuilder::new(ErrorCode::EMPTY_DATASET, "dataset contains no records")
                .with_field(CONTENTS_FIELD)
                .with_operation(Self::NAME)
                .with_violation(Violation::new(
                    CONTENTS_FIELD,
                    0,
                    "non_empty",
                    "at least one record is required",
                ))
                .with_suggestions([
                    "Check that the data source returned records",
                    "Allow empty datasets if empty output is acceptable",
                ])
                .build(),
        )
    }

    fn performance(&self) -> Option<&dyn PerformanceAware> {
        Some(self)
    }
}

impl PerformanceAware for EmptyDatasetValidator {
    fn estimated_cost(&self) -> u32 {
        1
    }

    fn fail_fast(&self) -> bool {
        true
    }
}
