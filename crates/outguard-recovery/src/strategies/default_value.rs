//! Default value substitution.

use std::collections::BTreeMap;

use outguard_error::{ErrorCode, OutputError};
use serde_json::Value as Json;

use crate::strategy::{Recovered, RecoveryContext, RecoveryStrategy};

/// Substitutes a configured default for a missing or invalid field.
///
/// The field is taken from the error context, or failing that from the
/// first violation naming a configured field.
#[derive(Debug, Clone, Default)]
pub struct DefaultValueStrategy {
    defaults: BTreeMap<String, Json>,
    priority: u32,
}

impl DefaultValueStrategy {
    pub const NAME: &'static str = "default_value";

    const CODES: [ErrorCode; 3] = [
        ErrorCode::MISSING_REQUIRED,
        ErrorCode::MISSING_COLUMN,
        ErrorCode::INVALID_DATA_TYPE,
    ];

    pub fn new() -> Self {
        Self {
            defaults: BTreeMap::new(),
            priority: 5,
        }
    }

    pub fn from_map(defaults: BTreeMap<String, Json>) -> Self {
        Self {
            defaults,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<Json>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn defaults(&self) -> &BTreeMap<String, Json> {
        &self.defaults
    }

    fn field_for<'a>(&self, error: &'a OutputError) -> Option<&'a str> {
        if let Some(field) = error.context().field.as_deref() {
            return self.defaults.contains_key(field).then_some(field);
        }
        error
            .violations()
            .iter()
            .map(|v| v.field.as_str())
            .find(|field| self.defaults.contains_key(*field))
    }
}

impl RecoveryStrategy for DefaultValueStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn can_handle(&self, error: &OutputError) -> bool {
        Self::CODES.contains(error.code()) && self.field_for(error).is_some()
    }

    fn apply(
        &self,
        error: &OutputError,
        _context: &RecoveryContext,
    ) -> Result<Recovered, OutputError> {
        let Some((field, value)) = self
            .field_for(error)
            .and_then(|field| self.defaults.get_key_value(field))
        else {
            return Err(error.clone());
        };
        tracing::warn!(field = %field, code = %error.code(), "substituting default value");
        Ok(Recovered::Value {
            field: field.clone(),
            value: value.clone(),
        })
    }
}
