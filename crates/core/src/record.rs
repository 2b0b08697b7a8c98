use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::CellValue;

/// Grid of raw text cells as detected on one page, before any cleaning.
/// Rows may be shorter (or longer) than the header row.
pub type RawTable = Vec<Vec<String>>;

/// An ordered field-name → value mapping built by zipping a table header
/// with one cleaned data row.
///
/// Insertion order is preserved. Inserting a name that already exists
/// overwrites the earlier value — duplicate header names are an accepted
/// property of the input, not deduplicated. The empty string is a legal
/// field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowRecord {
    fields: Vec<(String, CellValue)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, CellValue)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        let mut record = RowRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// Category of a best-effort fragment pulled from page text when no table
/// was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Email,
    Phones,
    Dates,
    RawText,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentKind::Email => write!(f, "email"),
            FragmentKind::Phones => write!(f, "phones"),
            FragmentKind::Dates => write!(f, "dates"),
            FragmentKind::RawText => write!(f, "raw_text"),
        }
    }
}

/// One grouping of fallback-extracted values. Fragments are exported for
/// review but never persisted as invoices — reconciling them into typed
/// rows is out of scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub values: Vec<String>,
}

impl Fragment {
    pub fn new(kind: FragmentKind, values: Vec<String>) -> Self {
        Self { kind, values }
    }
}

/// A record produced while walking one document. Consumers pattern-match
/// on the variant rather than probing a mapping for key presence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageRecord {
    Row(RowRecord),
    Fragment(Fragment),
}

impl PageRecord {
    pub fn as_row(&self) -> Option<&RowRecord> {
        match self {
            PageRecord::Row(row) => Some(row),
            PageRecord::Fragment(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_first_seen_order() {
        let mut r = RowRecord::new();
        r.insert("b", CellValue::Int(1));
        r.insert("a", CellValue::Int(2));
        let names: Vec<_> = r.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_name_overwrites_earlier_value() {
        let mut r = RowRecord::new();
        r.insert("qty", CellValue::Int(1));
        r.insert("qty", CellValue::Int(9));
        assert_eq!(r.len(), 1);
        assert_eq!(r.get("qty"), Some(&CellValue::Int(9)));
    }

    #[test]
    fn empty_string_is_a_usable_field_name() {
        let mut r = RowRecord::new();
        r.insert("", CellValue::Text("x".into()));
        assert_eq!(r.get(""), Some(&CellValue::Text("x".into())));
    }

    #[test]
    fn from_iterator_applies_overwrite_policy() {
        let r: RowRecord = vec![
            ("item".to_string(), CellValue::Text("A".into())),
            ("item".to_string(), CellValue::Text("B".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(r.get("item"), Some(&CellValue::Text("B".into())));
    }

    #[test]
    fn fragment_kind_display_matches_wire_names() {
        assert_eq!(FragmentKind::RawText.to_string(), "raw_text");
        assert_eq!(FragmentKind::Email.to_string(), "email");
    }
}
