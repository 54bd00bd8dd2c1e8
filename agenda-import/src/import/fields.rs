//! Column label resolution onto the canonical import fields
//!
//! Spreadsheets arrive with whatever headers the user typed: "Título",
//! "TITLE", "nome"... Each logical field declares an ordered alias list and
//! labels are compared after folding case, surrounding whitespace and
//! diacritics.

use super::value::{CellValue, RawRow};

/// One of the four logical import fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Date,
    Category,
    Description,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Date, Field::Category, Field::Description];

    /// Accepted column aliases, in priority order
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Title => &["titulo", "título", "title", "nome", "name", "evento", "event"],
            Field::Date => &["data", "date", "dia", "day"],
            Field::Category => &["tipo", "type", "categoria", "category"],
            Field::Description => &[
                "descricao",
                "descrição",
                "description",
                "detalhes",
                "details",
                "observacao",
                "notes",
            ],
        }
    }

    /// Header label used in templates and reports
    pub fn canonical_label(&self) -> &'static str {
        self.aliases()[0]
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Title => write!(f, "title"),
            Field::Date => write!(f, "date"),
            Field::Category => write!(f, "category"),
            Field::Description => write!(f, "description"),
        }
    }
}

/// Fold a label for comparison: trim, lower-case and strip diacritics
pub fn fold_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect()
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Resolve a logical field against a row
///
/// Aliases are tried in declaration order; within one alias the row's
/// columns are scanned left to right. The first matching column holding a
/// non-empty cell wins. Returns `CellValue::Empty` when nothing matches.
pub fn resolve_field(row: &RawRow, field: Field) -> CellValue {
    for alias in field.aliases() {
        let alias = fold_label(alias);
        let hit = row
            .cells()
            .find(|(label, value)| fold_label(label) == alias && !value.is_empty());

        if let Some((_, value)) = hit {
            return value.clone();
        }
    }

    CellValue::Empty
}

/// How a header row maps onto the logical fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMapping {
    /// (field, matched header label) for every field that has a column
    pub resolved: Vec<(Field, String)>,
    /// Fields with no matching column
    pub missing: Vec<Field>,
    /// Header labels that no field uses
    pub unmapped: Vec<String>,
}

/// Report which header each field would resolve to
///
/// This is header-level only; per-row resolution may still fall through to
/// a lower-priority alias when the preferred column is blank.
pub fn resolve_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> HeaderMapping {
    let headers: Vec<&str> = headers.into_iter().collect();
    let mut mapping = HeaderMapping::default();
    let mut used = vec![false; headers.len()];

    for field in Field::ALL {
        let mut found = None;
        for alias in field.aliases() {
            let alias = fold_label(alias);
            if let Some(idx) = headers.iter().position(|h| fold_label(h) == alias) {
                found = Some(idx);
                break;
            }
        }

        match found {
            Some(idx) => {
                used[idx] = true;
                mapping.resolved.push((field, headers[idx].to_string()));
            }
            None => mapping.missing.push(field),
        }
    }

    // Secondary alias columns are still read as fallbacks, so they count as used
    for (idx, header) in headers.iter().enumerate() {
        let folded = fold_label(header);
        let is_alias = Field::ALL
            .iter()
            .any(|f| f.aliases().iter().any(|a| fold_label(a) == folded));
        if !used[idx] && !is_alias {
            mapping.unmapped.push(header.to_string());
        }
    }

    mapping
}
