use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use tidelog_core::ingestion::{FileStatus, IngestionBatch};
use tidelog_parser::FileValidationResult;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn files_table(batch: &IngestionBatch) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "File",
        "Family",
        "Status",
        "Date format",
        "Time column",
        "Rows (valid/total)",
        "Errors",
    ]);

    for report in &batch.reports {
        let parsed = batch
            .parsed
            .iter()
            .find(|file| file.file_name == report.path && report.status != FileStatus::Duplicate);
        let status = match report.status {
            FileStatus::Parsed => Cell::new("parsed").fg(Color::Green),
            FileStatus::Failed => Cell::new("failed").fg(Color::Red),
            FileStatus::Duplicate => Cell::new(format!(
                "duplicate of {}",
                report.duplicate_of.as_deref().unwrap_or("?")
            ))
            .fg(Color::Yellow),
        };
        let date_format = parsed
            .and_then(|file| file.result.date_format)
            .map(|format| format.to_string())
            .unwrap_or_default();
        let time_column = parsed
            .map(|file| file.result.time_column().to_string())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(&report.path),
            Cell::new(report.family),
            status,
            Cell::new(date_format),
            Cell::new(time_column),
            Cell::new(format!("{}/{}", report.valid_rows, report.total_rows)),
            Cell::new(report.errors.len()),
        ]);
    }
    table
}

pub fn print_file_errors(batch: &IngestionBatch) {
    for report in batch.reports.iter().filter(|r| !r.errors.is_empty()) {
        println!("\n{}:", report.path);
        for error in &report.errors {
            println!("  - {error}");
        }
    }
}

pub fn validation_table(validation: &FileValidationResult) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Level", "Message"]);
    for error in &validation.errors {
        table.add_row(vec![Cell::new("error").fg(Color::Red), Cell::new(error)]);
    }
    for warning in &validation.warnings {
        table.add_row(vec![Cell::new("warning").fg(Color::Yellow), Cell::new(warning)]);
    }
    if validation.errors.is_empty() && validation.warnings.is_empty() {
        table.add_row(vec![Cell::new("ok").fg(Color::Green), Cell::new("ready to merge")]);
    }
    table
}
