//! Library side of the `outguard` command-line tool.

pub mod ingest;
pub mod logging;
pub mod pipeline;
