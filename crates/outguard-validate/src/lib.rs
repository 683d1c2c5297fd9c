//! Pluggable validation for data about to be rendered.
//!
//! Validators inspect an opaque subject (`&dyn Any`) and either pass or fail
//! with an [`OutputError`](outguard_error::OutputError). Built-in checks
//! narrow the subject to a [`Table`]:
//!
//! | Validator                    | Code       | Cost | Fail-fast |
//! |------------------------------|------------|------|-----------|
//! | [`EmptyDatasetValidator`]    | `OUT-2004` | 1    | yes       |
//! | [`RequiredColumnsValidator`] | `OUT-2001` | 2    | yes       |
//! | [`MalformedDataValidator`]   | `OUT-2005` | 5    | no        |
//! | [`DataTypeValidator`]        | `OUT-2002` | 10   | no        |
//! | [`ConstraintValidator`]      | `OUT-2003` | 20   | no        |
//!
//! A [`ValidationRunner`] executes many validators in fail-fast or
//! collect-all mode.

pub mod checks;
mod compose;
mod runner;
mod subject;
mod validator;

pub use checks::constraint::{Constraint, ConstraintValidator};
pub use checks::datatype::DataTypeValidator;
pub use checks::empty::{CONTENTS_FIELD, EmptyDatasetValidator};
pub use checks::malformed::{MalformedDataValidator, is_malformed_text};
pub use checks::required::RequiredColumnsValidator;
pub use compose::{ConditionalValidator, NamedValidator, ValidatorChain};
pub use runner::{ValidationMode, ValidationRunner};
pub use subject::{Record, Table, UnknownKind, Value, ValueKind, record_to_json};
pub use validator::{
    ContextualValidator, PerformanceAware, ValidationContext, Validator, narrow,
    validate_in_context,
};
