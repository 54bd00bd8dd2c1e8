//! Decode delimited text and spreadsheet files into raw rows
//!
//! The first physical row is always the header. Only the first worksheet of
//! a spreadsheet is read. Any container-level failure aborts the decode
//! before a single row is produced.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use super::dates::{date_from_serial, parse_date_text};
use super::value::{CellValue, RawRow};

/// Container format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// CSV / TSV text
    Delimited,
    /// xlsx, xlsm, xlsb, xls or ods workbook
    Spreadsheet,
}

impl ContainerKind {
    /// Infer the container kind from a file extension
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(ContainerKind::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(ContainerKind::Spreadsheet),
            _ => Err(DecodeError::UnsupportedFormat(ext)),
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Delimited => write!(f, "delimited text"),
            ContainerKind::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// Fatal decode failure; the run stops before validation
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// File extension maps to no known container
    UnsupportedFormat(String),
    /// Delimited text could not be read
    Text(String),
    /// Workbook container could not be opened
    Workbook(String),
    /// Workbook opened but contains no worksheet
    NoWorksheet,
    /// Worksheet could not be read
    Worksheet { sheet: String, message: String },
    /// Reading the file from disk failed
    Io(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::UnsupportedFormat(ext) if ext.is_empty() => {
                write!(f, "Unsupported file: no extension (expected csv, tsv, xlsx, xls or ods)")
            }
            DecodeError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported file type '.{}' (expected csv, tsv, xlsx, xls or ods)", ext)
            }
            DecodeError::Text(msg) => write!(f, "Failed to read delimited file: {}", msg),
            DecodeError::Workbook(msg) => write!(f, "Failed to open spreadsheet: {}", msg),
            DecodeError::NoWorksheet => write!(f, "Spreadsheet contains no worksheets"),
            DecodeError::Worksheet { sheet, message } => {
                write!(f, "Failed to read sheet '{}': {}", sheet, message)
            }
            DecodeError::Io(msg) => write!(f, "Failed to read file: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode raw file content into rows
pub fn decode(bytes: &[u8], kind: ContainerKind) -> Result<Vec<RawRow>, DecodeError> {
    let rows = match kind {
        ContainerKind::Delimited => decode_delimited(bytes)?,
        ContainerKind::Spreadsheet => decode_spreadsheet(bytes)?,
    };
    log::debug!("Decoded {} data rows from {}", rows.len(), kind);
    Ok(rows)
}

// ============================================================================
// Delimited text
// ============================================================================

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Pick the delimiter that occurs most often in the header line
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let mut best = (b',', header.matches(',').count());
    for candidate in [b';', b'\t'] {
        let count = header.matches(candidate as char).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

fn decode_delimited(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::Text(e.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());

    let header_record = reader
        .headers()
        .map_err(|e| DecodeError::Text(e.to_string()))?;
    let header_line = header_record.position().map(|p| p.line()).unwrap_or(1);
    let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DecodeError::Text(e.to_string()))?;
        // Empty lines never reach us as records; the line number keeps their slot
        let line = record
            .position()
            .map(|p| p.line().saturating_sub(header_line) as usize)
            .unwrap_or(rows.len() + 1);

        let cells = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(idx, h)| {
                let value = match record.get(idx) {
                    Some(s) if !s.is_empty() => CellValue::Text(s.to_string()),
                    _ => CellValue::Empty,
                };
                (h.clone(), value)
            })
            .collect();

        let row = RawRow::new(cells).at_line(line);
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

// ============================================================================
// Spreadsheets
// ============================================================================

/// Convert a workbook cell into a cell value
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) if dt.is_datetime() => match date_from_serial(dt.as_f64()) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => match parse_date_text(s) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

fn header_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => cell_to_value(other).as_text(),
    }
}

fn decode_spreadsheet(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DecodeError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::NoWorksheet)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DecodeError::Worksheet {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

    let mut physical_rows = range.rows();
    let headers: Vec<String> = match physical_rows.next() {
        Some(header) => header.iter().map(header_label).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    // The range starts at the header row, so row offsets are data row numbers
    for (idx, row) in physical_rows.enumerate() {
        let cells = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(idx, h)| {
                let value = row.get(idx).map(cell_to_value).unwrap_or(CellValue::Empty);
                (h.clone(), value)
            })
            .collect();

        let row = RawRow::new(cells).at_line(idx + 1);
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    #[test]
    fn test_kind_from_path() {
        assert_eq!(ContainerKind::from_path(Path::new("a.CSV")), Ok(ContainerKind::Delimited));
        assert_eq!(ContainerKind::from_path(Path::new("a.xlsx")), Ok(ContainerKind::Spreadsheet));
        assert_eq!(ContainerKind::from_path(Path::new("a.ods")), Ok(ContainerKind::Spreadsheet));
        assert!(matches!(
            ContainerKind::from_path(Path::new("a.pdf")),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_decode_csv() {
        let csv = "titulo,data,tipo\nReunião,15/02/2026,reuniao\nTarefa,20/02/2026,tarefa\n";
        let rows = decode(csv.as_bytes(), ContainerKind::Delimited).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("titulo"), Some(&CellValue::Text("Reunião".into())));
        assert_eq!(rows[1].get("tipo"), Some(&CellValue::Text("tarefa".into())));
    }

    #[test]
    fn test_decode_semicolon_csv_with_bom() {
        let csv = "\u{FEFF}Título;Data;Descrição\n\"Almoço, equipe\";01/03/2026;\n";
        let rows = decode(csv.as_bytes(), ContainerKind::Delimited).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Título"), Some(&CellValue::Text("Almoço, equipe".into())));
        assert_eq!(rows[0].get("Descrição"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_header_only_is_empty_not_error() {
        let rows = decode(b"titulo,data\n", ContainerKind::Delimited).unwrap();
        assert!(rows.is_empty());
        let rows = decode(b"", ContainerKind::Delimited).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_blank_rows_skipped_short_rows_padded() {
        let csv = "titulo,data,tipo\n,,\nSolo\n";
        let rows = decode(csv.as_bytes(), ContainerKind::Delimited).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("data"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_skipped_rows_keep_file_row_numbers() {
        let csv = "titulo,data\nA,01/01/2026\n,\n\nB,32/01/2026\n";
        let rows = decode(csv.as_bytes(), ContainerKind::Delimited).unwrap();
        let lines: Vec<Option<usize>> = rows.iter().map(RawRow::line).collect();
        assert_eq!(lines, vec![Some(1), Some(4)]);
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let result = decode(&[b't', 0xFF, 0xFE, b'\n'], ContainerKind::Delimited);
        assert!(matches!(result, Err(DecodeError::Text(_))));
    }

    #[test]
    fn test_corrupt_spreadsheet_is_decode_error() {
        let result = decode(b"definitely not a zip", ContainerKind::Spreadsheet);
        assert!(matches!(result, Err(DecodeError::Workbook(_))));
    }

    #[test]
    fn test_decode_xlsx() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");

        sheet.write_string(0, 0, "Título").unwrap();
        sheet.write_string(0, 1, "Data").unwrap();
        sheet.write_string(0, 2, "Tipo").unwrap();

        sheet.write_string(1, 0, "Kickoff").unwrap();
        let date = ExcelDateTime::from_ymd(2026, 2, 15).unwrap();
        sheet.write_datetime_with_format(1, 1, &date, &date_format).unwrap();
        sheet.write_string(1, 2, "tarefa").unwrap();

        sheet.write_string(2, 0, "Serial").unwrap();
        sheet.write_number(2, 1, 45678.0).unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let rows = decode(&bytes, ContainerKind::Spreadsheet).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Título"), Some(&CellValue::Text("Kickoff".into())));
        assert_eq!(
            rows[0].get("Data"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()))
        );
        assert_eq!(rows[1].get("Data"), Some(&CellValue::Number(45678.0)));
        assert_eq!(rows[1].get("Tipo"), Some(&CellValue::Empty));
        assert_eq!(rows[1].line(), Some(2));
    }

    #[test]
    fn test_xlsx_blank_row_keeps_row_numbers() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "titulo").unwrap();
        sheet.write_string(1, 0, "first").unwrap();
        sheet.write_string(3, 0, "third").unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let rows = decode(&bytes, ContainerKind::Spreadsheet).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("titulo"), Some(&CellValue::Text("third".into())));
        assert_eq!(rows[1].line(), Some(3));
    }
}
