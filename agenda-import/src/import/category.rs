//! Free-text category labels onto the closed category set

use serde::{Deserialize, Serialize};

use super::fields::fold_label;
use super::value::CellValue;

/// Canonical event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Meeting,
    Task,
    Reminder,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meeting => "meeting",
            Category::Task => "task",
            Category::Reminder => "reminder",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synonyms per category, already folded (accents are stripped on lookup)
const SYNONYMS: &[(&str, Category)] = &[
    ("reuniao", Category::Meeting),
    ("meeting", Category::Meeting),
    ("tarefa", Category::Task),
    ("task", Category::Task),
    ("lembrete", Category::Reminder),
    ("reminder", Category::Reminder),
];

/// Map a category label; unknown or empty labels become the default
pub fn map_category(label: &str) -> Category {
    let folded = fold_label(label);
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == folded)
        .map(|(_, category)| *category)
        .unwrap_or_default()
}

/// Map a resolved category cell
pub fn map_category_cell(value: &CellValue) -> Category {
    map_category(&value.as_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms() {
        assert_eq!(map_category("reuniao"), Category::Meeting);
        assert_eq!(map_category("Reunião"), Category::Meeting);
        assert_eq!(map_category(" MEETING "), Category::Meeting);
        assert_eq!(map_category("tarefa"), Category::Task);
        assert_eq!(map_category("Task"), Category::Task);
        assert_eq!(map_category("lembrete"), Category::Reminder);
        assert_eq!(map_category("reminder"), Category::Reminder);
    }

    #[test]
    fn test_unknown_defaults_to_meeting() {
        assert_eq!(map_category(""), Category::Meeting);
        assert_eq!(map_category("aniversário"), Category::Meeting);
        assert_eq!(map_category_cell(&CellValue::Number(3.0)), Category::Meeting);
        assert_eq!(map_category_cell(&CellValue::Empty), Category::Meeting);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Reminder).unwrap(), "\"reminder\"");
        let parsed: Category = serde_json::from_str("\"task\"").unwrap();
        assert_eq!(parsed, Category::Task);
    }
}
