//! Date normalization for cells of unknown representation
//!
//! Spreadsheet tools emit dates as numeric serials (calculated cells), as
//! locale-dependent strings (typed by hand) or as native date cells. The
//! normalizer tries an ordered list of strategies and the first success wins:
//!
//! 1. Spreadsheet serial: days since 1899-12-30
//! 2. Text patterns: `dd/MM/yyyy`, `yyyy-MM-dd`, `MM/dd/yyyy`, `dd-MM-yyyy`
//! 3. Native date cells
//!
//! Every strategy is a pure function returning `Option<NaiveDate>`.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use super::value::CellValue;

/// Canonical serialization format for calendar dates
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Result of normalizing a date cell
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDate {
    /// The resolved calendar date, if any strategy succeeded
    pub date: Option<NaiveDate>,
    /// The stringified input, kept for error reporting
    pub raw: String,
}

impl NormalizedDate {
    pub fn ok(&self) -> bool {
        self.date.is_some()
    }
}

/// A single "attempt parse" strategy
type Strategy = fn(&CellValue) -> Option<NaiveDate>;

/// Strategies in the order they are tried
const STRATEGIES: &[(&str, Strategy)] = &[
    ("spreadsheet serial", from_serial_cell),
    ("text pattern", from_text_cell),
    ("native date", from_native_cell),
];

/// Normalize a resolved date cell into a calendar date
pub fn normalize_date(value: &CellValue) -> NormalizedDate {
    let raw = value.as_text();

    for (name, strategy) in STRATEGIES {
        if let Some(date) = strategy(value) {
            log::trace!("Date '{}' resolved via {} to {}", raw, name, date);
            return NormalizedDate {
                date: Some(date),
                raw,
            };
        }
    }

    NormalizedDate { date: None, raw }
}

/// Format a date in the canonical `yyyy-MM-dd` form
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

// ============================================================================
// Spreadsheet serials
// ============================================================================

fn spreadsheet_epoch() -> NaiveDate {
    // 1899-12-30 absorbs the Lotus 1900 leap-year bug for serials >= 61
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Convert a spreadsheet day serial to a calendar date
///
/// The fractional (time-of-day) part is dropped. Serials that land outside
/// years 1..=9999 are rejected so the canonical format stays four digits.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }

    let days = serial.trunc();
    if days.abs() > 4_000_000.0 {
        return None;
    }

    let date = spreadsheet_epoch().checked_add_signed(Duration::try_days(days as i64)?)?;
    let year = chrono::Datelike::year(&date);
    if !(1..=9999).contains(&year) {
        return None;
    }
    Some(date)
}

fn from_serial_cell(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Number(n) => date_from_serial(*n),
        // Delimited files carry serials as text
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit() || c == '.') {
                return None;
            }
            date_from_serial(trimmed.parse::<f64>().ok()?)
        }
        _ => None,
    }
}

// ============================================================================
// Text patterns
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Order {
    DayMonthYear,
    YearMonthDay,
    MonthDayYear,
}

struct TextPattern {
    name: &'static str,
    regex: Regex,
    order: Order,
}

static TEXT_PATTERNS: Lazy<Vec<TextPattern>> = Lazy::new(|| {
    let pattern = |name, re: &str, order| TextPattern {
        name,
        regex: Regex::new(re).unwrap_or_else(|e| panic!("invalid date pattern {}: {}", name, e)),
        order,
    };

    vec![
        pattern("dd/MM/yyyy", r"^(\d{1,2})/(\d{1,2})/(\d{4})$", Order::DayMonthYear),
        // Allows a trailing time component (ISO timestamps from exports)
        pattern(
            "yyyy-MM-dd",
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ][0-9:.]+(?:Z|[+-]\d{2}:?\d{2})?)?$",
            Order::YearMonthDay,
        ),
        pattern("MM/dd/yyyy", r"^(\d{1,2})/(\d{1,2})/(\d{4})$", Order::MonthDayYear),
        pattern("dd-MM-yyyy", r"^(\d{1,2})-(\d{1,2})-(\d{4})$", Order::DayMonthYear),
    ]
});

impl TextPattern {
    fn parse(&self, text: &str) -> Option<NaiveDate> {
        let caps = self.regex.captures(text)?;
        let parts: Vec<u32> = (1..=3)
            .map(|i| caps.get(i).and_then(|m| m.as_str().parse().ok()))
            .collect::<Option<Vec<_>>>()?;

        let (year, month, day) = match self.order {
            Order::DayMonthYear => (parts[2], parts[1], parts[0]),
            Order::YearMonthDay => (parts[0], parts[1], parts[2]),
            Order::MonthDayYear => (parts[2], parts[0], parts[1]),
        };

        NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
    }
}

/// Try the text patterns in order against a single string
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    TEXT_PATTERNS.iter().find_map(|p| {
        let date = p.parse(text)?;
        log::trace!("'{}' matched {}", text, p.name);
        Some(date)
    })
}

fn from_text_cell(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Text(s) => parse_date_text(s),
        _ => None,
    }
}

fn from_native_cell(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_45678() {
        let expected = ymd(1899, 12, 30) + Duration::days(45678);
        let result = normalize_date(&CellValue::Number(45678.0));
        assert_eq!(result.date, Some(expected));
        assert_eq!(expected, ymd(2025, 1, 21));
    }

    #[test]
    fn test_serial_drops_time_of_day() {
        assert_eq!(date_from_serial(45678.75), Some(ymd(2025, 1, 21)));
    }

    #[test]
    fn test_serial_out_of_range() {
        assert_eq!(date_from_serial(f64::NAN), None);
        assert_eq!(date_from_serial(f64::INFINITY), None);
        assert_eq!(date_from_serial(1.0e12), None);
        assert_eq!(date_from_serial(-700_000.0), None);
    }

    #[test]
    fn test_serial_as_text() {
        let result = normalize_date(&CellValue::Text(" 45678 ".into()));
        assert_eq!(result.date, Some(ymd(2025, 1, 21)));
    }

    #[test]
    fn test_text_patterns() {
        assert_eq!(parse_date_text("15/02/2026"), Some(ymd(2026, 2, 15)));
        assert_eq!(parse_date_text("2026-02-15"), Some(ymd(2026, 2, 15)));
        assert_eq!(parse_date_text("2026-02-15T10:30:00"), Some(ymd(2026, 2, 15)));
        assert_eq!(parse_date_text("15-02-2026"), Some(ymd(2026, 2, 15)));
        assert_eq!(parse_date_text("1/2/2026"), Some(ymd(2026, 2, 1)));
    }

    #[test]
    fn test_day_first_wins_over_month_first() {
        // Ambiguous: dd/MM/yyyy is tried first
        assert_eq!(parse_date_text("03/04/2026"), Some(ymd(2026, 4, 3)));
        // Only valid as MM/dd/yyyy
        assert_eq!(parse_date_text("02/28/2026"), Some(ymd(2026, 2, 28)));
    }

    #[test]
    fn test_invalid_text() {
        assert_eq!(parse_date_text("31/13/2026"), None);
        assert_eq!(parse_date_text("30/02/2026"), None);
        assert_eq!(parse_date_text("15/02/26"), None);
        assert_eq!(parse_date_text("tomorrow"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_native_date() {
        let result = normalize_date(&CellValue::Date(ymd(2026, 3, 1)));
        assert!(result.ok());
        assert_eq!(result.date, Some(ymd(2026, 3, 1)));
    }

    #[test]
    fn test_failure_keeps_raw_value() {
        let result = normalize_date(&CellValue::Text("31/13/2026".into()));
        assert!(!result.ok());
        assert_eq!(result.raw, "31/13/2026");

        let result = normalize_date(&CellValue::Empty);
        assert!(!result.ok());
        assert_eq!(result.raw, "");
    }

    #[test]
    fn test_canonical_format_round_trip() {
        for date in [ymd(2026, 2, 15), ymd(1999, 12, 31), ymd(2024, 2, 29), ymd(1, 1, 1)] {
            let text = format_date(date);
            let back = normalize_date(&CellValue::Text(text.clone()));
            assert_eq!(back.date, Some(date), "round trip failed for {}", text);
        }
    }
}
