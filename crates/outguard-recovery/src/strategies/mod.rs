//! Built-in recovery strategies.

pub mod composite;
pub mod default_value;
pub mod format;
pub mod retry;
