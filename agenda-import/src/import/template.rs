//! Example import file with the canonical headers

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use super::decoder::ContainerKind;
use super::fields::Field;

/// Sample rows: title, date, category, description
const SAMPLE_ROWS: &[[&str; 4]] = &[
    ["Reunião de equipe", "15/02/2026", "reuniao", "Alinhamento semanal"],
    ["Entregar relatório", "20/02/2026", "tarefa", ""],
    ["Ligar para o cliente", "25/02/2026", "lembrete", "Confirmar proposta"],
];

/// Canonical header labels in column order
pub fn template_headers() -> [&'static str; 4] {
    Field::ALL.map(|f| f.canonical_label())
}

/// Template as CSV text
pub fn template_csv() -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record(template_headers())
        .context("Failed to write template header")?;
    for row in SAMPLE_ROWS {
        wtr.write_record(row)
            .context("Failed to write template row")?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush template: {}", e))?;
    String::from_utf8(bytes).context("Template is not valid UTF-8")
}

/// Template as an xlsx workbook
pub fn template_xlsx() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Eventos")?;

    let header_format = Format::new().set_bold();
    for (col, header) in template_headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    // Dates stay text so the sheet shows dd/MM/yyyy regardless of locale
    for (row_idx, row) in SAMPLE_ROWS.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string((row_idx + 1) as u32, col as u16, *value)?;
            }
        }
    }

    sheet.autofit();
    workbook
        .save_to_buffer()
        .context("Failed to build template workbook")
}

/// Write the template, choosing CSV or xlsx from the extension
pub fn write_template(path: &Path) -> Result<()> {
    let kind = ContainerKind::from_path(path)?;

    let bytes = match kind {
        ContainerKind::Delimited => template_csv()?.into_bytes(),
        ContainerKind::Spreadsheet => template_xlsx()?,
    };

    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write template: {}", path.display()))?;

    log::info!("Template written to: {}", path.display());
    Ok(())
}
