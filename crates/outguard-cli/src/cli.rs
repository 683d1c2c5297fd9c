//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use outguard_core::ErrorMode;

#[derive(Parser)]
#[command(
    name = "outguard",
    version,
    about = "Validate tabular data and report errors before it is written out",
    long_about = "Validate CSV files with a configurable error-handling pipeline.\n\n\
                  Errors are recovered where a strategy applies, then handled in\n\
                  strict, lenient or interactive mode and summarised at the end."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate CSV files and print an error summary.
    Validate(ValidateArgs),

    /// List the built-in error codes.
    Codes,

    /// Print the effective configuration as TOML.
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// CSV files with a header row.
    #[arg(value_name = "CSV", required = true)]
    pub files: Vec<PathBuf>,

    /// TOML configuration file.
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Error handling mode (overrides the config).
    #[arg(long = "mode", value_enum)]
    pub mode: Option<ModeArg>,

    /// Run every validator instead of stopping at the first failure.
    #[arg(long = "collect-all")]
    pub collect_all: bool,

    /// Write error metrics as JSON to this file.
    #[arg(long = "report-json", value_name = "FILE")]
    pub report_json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// TOML configuration file to load (defaults are printed otherwise).
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Strict,
    Lenient,
    Interactive,
}

impl From<ModeArg> for ErrorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => Self::Strict,
            ModeArg::Lenient => Self::Lenient,
            ModeArg::Interactive => Self::Interactive,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
