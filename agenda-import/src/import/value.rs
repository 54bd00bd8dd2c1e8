//! Cell value and raw row representation produced by the decoder

use chrono::NaiveDate;

/// An untyped spreadsheet cell, as it came out of the file
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing or blank cell
    Empty,
    /// Text cell (every delimited-text cell is text)
    Text(String),
    /// Numeric cell (spreadsheet numbers, including date serials)
    Number(f64),
    /// Native calendar date from a spreadsheet date cell
    Date(NaiveDate),
}

impl CellValue {
    /// Check if this value is empty (blank text counts as empty)
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringify the value for resolution and error reporting
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                // Whole numbers render without a trailing ".0"
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

/// One physical data row: column label -> cell, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based data row number in the file (header excluded), when decoded from one
    line: Option<usize>,
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, CellValue)>) -> Self {
        Self { line: None, cells }
    }

    /// Tag the row with its data row number in the source file
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Exact-label lookup
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    /// Cells in physical column order
    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(l, _)| l.as_str())
    }

    /// True when every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}

impl<L: Into<String>, V: Into<CellValue>> FromIterator<(L, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        Self {
            line: None,
            cells: iter.into_iter().map(|(l, v)| (l.into(), v.into())).collect(),
        }
    }
}
