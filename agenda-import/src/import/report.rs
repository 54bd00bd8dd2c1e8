//! CSV validation report

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use super::dates::format_date;
use super::validation::Preview;

const REPORT_HEADER: [&str; 6] = ["row", "status", "title", "date", "category", "errors"];

/// Write one report line per data row to any writer
pub fn write_report_to<W: Write>(preview: &Preview, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record(REPORT_HEADER)
        .context("Failed to write report header")?;

    for (row_number, result) in preview.numbered() {
        let status = if result.is_valid() { "valid" } else { "invalid" };
        let date = match result.date.date {
            Some(d) => format_date(d),
            None => result.date.raw.clone(),
        };

        wtr.write_record([
            row_number.to_string(),
            status.to_string(),
            result.title.clone(),
            date,
            result.category.to_string(),
            result.errors.join("; "),
        ])
        .with_context(|| format!("Failed to write report row {}", row_number))?;
    }

    wtr.flush().context("Failed to flush report")?;
    Ok(())
}

/// Write the report to a CSV file
pub fn write_report(preview: &Preview, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    write_report_to(preview, file)?;

    log::info!("Validation report written to: {}", path.display());
    Ok(())
}
