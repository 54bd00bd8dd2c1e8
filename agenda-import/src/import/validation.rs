//! Per-row validation
//!
//! Combines field resolution, date normalization and category mapping into a
//! verdict per row. Problems are collected as human-readable strings; a row
//! with several problems reports all of them.

use chrono::NaiveDate;

use super::category::{Category, map_category_cell};
use super::dates::{NormalizedDate, normalize_date};
use super::fields::{Field, HeaderMapping, resolve_field, resolve_headers};
use super::value::RawRow;

pub const ERR_TITLE_REQUIRED: &str = "title required";
pub const ERR_INVALID_DATE: &str = "invalid date (expected dd/MM/yyyy)";

/// A fully valid record, ready to be stamped and stored
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub title: String,
    pub date: NaiveDate,
    pub category: Category,
    pub description: String,
}

/// Verdict for one raw row
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    /// Trimmed title (may be empty on invalid rows)
    pub title: String,
    pub date: NormalizedDate,
    pub category: Category,
    /// Trimmed description, empty when absent
    pub description: String,
    /// Ordered error reasons; empty means valid
    pub errors: Vec<String>,
    /// 1-based data row number in the file (header excluded)
    pub line: usize,
}

impl RowResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The canonical record, only for valid rows
    pub fn record(&self) -> Option<CanonicalRecord> {
        if !self.is_valid() {
            return None;
        }

        Some(CanonicalRecord {
            title: self.title.clone(),
            date: self.date.date?,
            category: self.category,
            description: self.description.clone(),
        })
    }
}

/// Validate a single row
pub fn validate_row(row: &RawRow) -> RowResult {
    let title = resolve_field(row, Field::Title).as_text().trim().to_string();
    let date = normalize_date(&resolve_field(row, Field::Date));
    let category = map_category_cell(&resolve_field(row, Field::Category));
    let description = resolve_field(row, Field::Description)
        .as_text()
        .trim()
        .to_string();

    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push(ERR_TITLE_REQUIRED.to_string());
    }
    if !date.ok() {
        errors.push(ERR_INVALID_DATE.to_string());
    }

    RowResult {
        title,
        date,
        category,
        description,
        errors,
        line: row.line().unwrap_or(1),
    }
}

/// Validate rows, preserving input order
///
/// Rows that were not decoded from a file are numbered by position.
pub fn validate_rows(rows: &[RawRow]) -> Vec<RowResult> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| RowResult {
            line: row.line().unwrap_or(idx + 1),
            ..validate_row(row)
        })
        .collect()
}

/// Validated rows of one file, shown to the user before importing
#[derive(Debug, Clone, Default)]
pub struct Preview {
    /// Column labels of the file (empty when there are no data rows)
    pub headers: Vec<String>,
    pub results: Vec<RowResult>,
}

impl Preview {
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let headers = rows
            .first()
            .map(|r| r.labels().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            headers,
            results: validate_rows(rows),
        }
    }

    /// How the file's columns map onto the import fields
    pub fn header_mapping(&self) -> HeaderMapping {
        resolve_headers(self.headers.iter().map(String::as_str))
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn valid_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_valid()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.total() - self.valid_count()
    }

    /// Valid records in file order
    pub fn valid_records(&self) -> Vec<CanonicalRecord> {
        self.results.iter().filter_map(RowResult::record).collect()
    }

    /// Invalid rows with their 1-based data row number (header excluded)
    pub fn invalid_rows(&self) -> impl Iterator<Item = (usize, &RowResult)> {
        self.numbered().filter(|(_, r)| !r.is_valid())
    }

    /// All rows with the data row number they have in the file
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &RowResult)> {
        self.results.iter().map(|r| (r.line, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::decoder::{ContainerKind, decode};
    use crate::import::value::CellValue;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells.iter().map(|(l, v)| (*l, *v)).collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let rows = vec![
            row(&[("titulo", "Reunião"), ("data", "15/02/2026"), ("tipo", "reuniao")]),
            row(&[("titulo", ""), ("data", "20/02/2026"), ("tipo", "tarefa")]),
            row(&[("titulo", "Lembrete X"), ("data", "31/13/2026"), ("tipo", "lembrete")]),
        ];

        let preview = Preview::from_rows(&rows);
        let results = &preview.results;

        assert!(results[0].is_valid());
        assert_eq!(results[0].category, Category::Meeting);

        assert!(!results[1].is_valid());
        assert_eq!(results[1].errors, vec![ERR_TITLE_REQUIRED.to_string()]);

        assert!(!results[2].is_valid());
        assert_eq!(results[2].errors, vec![ERR_INVALID_DATE.to_string()]);
        assert_eq!(results[2].date.raw, "31/13/2026");

        let records = preview.valid_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Reunião");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());

        let invalid: Vec<usize> = preview.invalid_rows().map(|(n, _)| n).collect();
        assert_eq!(invalid, vec![2, 3]);

        let mapping = preview.header_mapping();
        assert_eq!(mapping.missing, vec![Field::Description]);
    }

    #[test]
    fn test_row_numbers_follow_the_file_after_blank_rows() {
        let csv = "titulo,data\nA,01/01/2026\n,\nB,32/01/2026\n";
        let rows = decode(csv.as_bytes(), ContainerKind::Delimited).unwrap();
        let preview = Preview::from_rows(&rows);

        let invalid: Vec<usize> = preview.invalid_rows().map(|(n, _)| n).collect();
        assert_eq!(invalid, vec![3]);
        let all: Vec<usize> = preview.numbered().map(|(n, _)| n).collect();
        assert_eq!(all, vec![1, 3]);
    }

    #[test]
    fn test_multiple_errors_accumulate() {
        let result = validate_row(&row(&[("titulo", "   "), ("data", "someday")]));
        assert_eq!(
            result.errors,
            vec![ERR_TITLE_REQUIRED.to_string(), ERR_INVALID_DATE.to_string()]
        );
        assert_eq!(result.record(), None);
    }

    #[test]
    fn test_unknown_category_never_invalidates() {
        let result = validate_row(&row(&[
            ("title", "Dentist"),
            ("date", "2026-03-10"),
            ("type", "appointment"),
        ]));
        assert!(result.is_valid());
        assert_eq!(result.category, Category::Meeting);
    }

    #[test]
    fn test_title_and_description_trimmed() {
        let result = validate_row(&row(&[
            ("Título", "  Planning  "),
            ("Data", "01/03/2026"),
            ("Descrição", "  quarterly  "),
        ]));
        let record = result.record().unwrap();
        assert_eq!(record.title, "Planning");
        assert_eq!(record.description, "quarterly");
    }

    #[test]
    fn test_numeric_cells() {
        let r: RawRow = vec![
            ("titulo".to_string(), CellValue::Number(2026.0)),
            ("data".to_string(), CellValue::Number(45678.0)),
        ]
        .into_iter()
        .collect();
        let result = validate_row(&r);
        assert!(result.is_valid());
        assert_eq!(result.title, "2026");
        assert_eq!(result.date.date, NaiveDate::from_ymd_opt(2025, 1, 21));
    }

    #[test]
    fn test_missing_description_is_fine() {
        let result = validate_row(&row(&[("titulo", "Call"), ("data", "02/03/2026")]));
        assert!(result.is_valid());
        assert_eq!(result.description, "");
    }
}
