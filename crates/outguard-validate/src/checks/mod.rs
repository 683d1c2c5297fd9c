//! Built-in validators.

pub mod constraint;
pub mod datatype;
pub mod empty;
pub mod malformed;
pub mod required;
