use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use outguard_cli::pipeline::{FileStatus, ValidationOutcome};
use outguard_error::Severity;

pub fn print_summary(outcome: &ValidationOutcome) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Records"),
        header_cell("Recovered"),
        header_cell("Collected"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);

    let mut total_records = 0usize;
    for file in &outcome.files {
        total_records += file.records;
        let (recovered, collected, status) = match &file.status {
            FileStatus::Passed => (0, 0, status_cell("PASS", Color::Green)),
            FileStatus::Continued {
                recovered,
                collected,
            } => (recovered.len(), *collected, status_cell("ISSUES", Color::Yellow)),
            FileStatus::Failed(err) => (0, 0, status_cell(err.code().as_str(), Color::Red)),
        };
        table.add_row(vec![
            Cell::new(file.path.display()),
            Cell::new(file.records),
            count_cell(recovered, Color::Green),
            count_cell(collected, Color::Yellow),
            status,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(outcome.collected.total, Color::Yellow),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_failures(outcome);
    print_error_table(outcome);

    if !outcome.report.suggestions.is_empty() {
        println!();
        println!("Suggestions:");
        for suggestion in &outcome.report.suggestions {
            println!("  - {suggestion}");
        }
    }
    if outcome.alert {
        println!();
        println!("Alert threshold exceeded.");
    }
    if let Some(path) = &outcome.metrics_path {
        println!("Metrics: {}", path.display());
    }
}

fn print_failures(outcome: &ValidationOutcome) {
    for file in &outcome.files {
        if let FileStatus::Failed(err) = &file.status {
            println!();
            println!("{}:", file.path.display());
            for line in err.to_string().lines() {
                println!("  {line}");
            }
        }
    }
}

fn print_error_table(outcome: &ValidationOutcome) {
    let errors = &outcome.report.top_errors;
    if errors.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Severity"),
        header_cell("Count"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for frequency in errors {
        table.add_row(vec![
            Cell::new(frequency.code.as_str()),
            severity_cell(frequency.severity),
            Cell::new(frequency.count).fg(severity_color(frequency.severity)),
            Cell::new(&frequency.sample_message),
        ]);
    }
    println!();
    println!("Errors:");
    println!("{table}");
}

fn status_cell(label: &str, color: Color) -> Cell {
    Cell::new(label).fg(color).add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    let cell = Cell::new(severity.as_str().to_uppercase()).fg(severity_color(severity));
    if severity == Severity::Fatal {
        cell.add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Fatal | Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
