use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use outguard_core::{Decision, ErrorMode, OutguardConfig, Prompter};
use outguard_error::{ErrorCode, OutputError};
use outguard_cli::pipeline::{ValidationOutcome, apply_overrides, validate_files};
use tracing::info_span;

use crate::cli::{ConfigArgs, ValidateArgs};
use crate::summary::apply_table_style;

pub fn run_validate(args: &ValidateArgs) -> Result<ValidationOutcome> {
    let span = info_span!("validate", files = args.files.len());
    let _guard = span.enter();

    let mut config =
        OutguardConfig::load_or_default(args.config.as_deref()).context("load config")?;
    apply_overrides(&mut config, args.mode.map(ErrorMode::from), args.collect_all);

    let mut handler = config.error_handler();
    if config.handler.mode == ErrorMode::Interactive && io::stdin().is_terminal() {
        handler = handler.with_prompter(StdinPrompter);
    }
    validate_files(&args.files, &config, handler, args.report_json.as_deref())
}

pub fn run_codes() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Code", "Category", "Description"]);
    apply_table_style(&mut table);
    for code in ErrorCode::ALL {
        let category = code.category().map_or("-", |c| c.label());
        let description = code.description().unwrap_or_default();
        table.add_row(vec![
            Cell::new(code.as_str()),
            Cell::new(category),
            Cell::new(description),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_config(args: &ConfigArgs) -> Result<()> {
    let config =
        OutguardConfig::load_or_default(args.config.as_deref()).context("load config")?;
    print!("{}", config.to_toml_string().context("serialize config")?);
    Ok(())
}

/// Asks on stderr whether to continue past an error.
struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn decide(&self, error: &OutputError) -> Decision {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "{error}\ncontinue? [y/N] ");
        let _ = stderr.flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return Decision::Abort;
        }
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Decision::Continue,
            _ => Decision::Abort,
        }
    }
}
