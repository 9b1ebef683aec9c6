//! Resolves a sheet's actual column headers onto the canonical fields we understand.
//!
//! Spreadsheet authors rename columns freely ("Amount", "Amount (LKR)", "Donation Value"),
//! so each canonical field carries a ranked list of header aliases. Resolution happens once
//! per dataset, against the header row, and the resulting `ColumnMap` is reused for every
//! data row.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A canonical field of some record kind, with the header aliases that can name it.
///
/// The donation and expense pipelines differ only in their field sets and row rules, so
/// the resolver is generic over this trait rather than duplicated per kind.
pub(crate) trait Field: Copy + Eq + Hash + Debug + 'static {
    /// Every field of the record kind, in declaration order.
    const ALL: &'static [Self];

    /// Ranked header aliases for this field, most specific first.
    fn aliases(self) -> &'static [&'static str];

    /// A looser last-resort match: accept any header containing this substring. Used for
    /// the expense attachment columns, where sheet wording varies too much for alias lists.
    fn contains_fallback(self) -> Option<&'static str> {
        None
    }
}

/// The result of resolving a header row: canonical field -> column index.
///
/// At most one column maps to each field. A field with no matching header stays absent and
/// answers `None` for every row, which normalization treats as an always-empty cell rather
/// than an error.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub(crate) struct ColumnMap<F: Field> {
    columns: HashMap<F, usize>,
}

impl<F: Field> ColumnMap<F> {
    /// Resolves the observed headers against every field's alias list.
    pub(crate) fn resolve(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();
        let mut columns = HashMap::new();
        for &field in F::ALL {
            match resolve_field(&normalized, field) {
                Some(ix) => {
                    columns.insert(field, ix);
                }
                None => debug!("No column resolved for {field:?}, headers: {headers:?}"),
            }
        }
        Self { columns }
    }

    /// The resolved column index for `field`, if any.
    pub(crate) fn column(&self, field: F) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// The cell for `field` in `row`, or `None` when the field is unresolved.
    pub(crate) fn cell<'a>(&self, field: F, row: &'a [String]) -> Option<&'a str> {
        self.column(field)
            .and_then(|ix| row.get(ix))
            .map(|s| s.as_str())
    }
}

/// Finds the column for one field. An exact normalized match on any alias wins immediately;
/// otherwise aliases are tried in declared order and, for each, the first header (in sheet
/// order) containing the alias is taken. The per-field contains fallback runs last.
fn resolve_field<F: Field>(normalized_headers: &[String], field: F) -> Option<usize> {
    for alias in field.aliases() {
        let alias = normalize(alias);
        if let Some(ix) = normalized_headers.iter().position(|h| *h == alias) {
            return Some(ix);
        }
    }
    for alias in field.aliases() {
        let alias = normalize(alias);
        if let Some(ix) = normalized_headers.iter().position(|h| h.contains(&alias)) {
            return Some(ix);
        }
    }
    if let Some(needle) = field.contains_fallback() {
        if let Some(ix) = normalized_headers.iter().position(|h| h.contains(needle)) {
            return Some(ix);
        }
    }
    None
}

/// Normalizes a header or alias for comparison: lowercase, trimmed, internal whitespace
/// runs collapsed to a single space.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
    enum TestField {
        When,
        Who,
        HowMuch,
    }

    impl Field for TestField {
        const ALL: &'static [Self] = &[TestField::When, TestField::Who, TestField::HowMuch];

        fn aliases(self) -> &'static [&'static str] {
            match self {
                TestField::When => &["timestamp", "date"],
                TestField::Who => &["name", "donor"],
                TestField::HowMuch => &["amount", "value"],
            }
        }

        fn contains_fallback(self) -> Option<&'static str> {
            match self {
                TestField::Who => Some("person"),
                _ => None,
            }
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Donor   Full  Name "), "donor full name");
    }

    #[test]
    fn test_exact_match_beats_contains() {
        // "Updated" contains "date", but the exact alias match on "Date" wins.
        let h = headers(&["Updated", "Date"]);
        let map = ColumnMap::<TestField>::resolve(&h);
        assert_eq!(map.column(TestField::When), Some(1));
    }

    #[test]
    fn test_contains_match_in_header_order() {
        let h = headers(&["Submission Timestamp", "Donor Full Name", "Amount (LKR)"]);
        let map = ColumnMap::<TestField>::resolve(&h);
        assert_eq!(map.column(TestField::When), Some(0));
        assert_eq!(map.column(TestField::Who), Some(1));
        assert_eq!(map.column(TestField::HowMuch), Some(2));
    }

    #[test]
    fn test_earlier_alias_wins() {
        // "amount" is declared before "value", so the Value column loses.
        let h = headers(&["Value", "Amount"]);
        let map = ColumnMap::<TestField>::resolve(&h);
        assert_eq!(map.column(TestField::HowMuch), Some(1));
    }

    #[test]
    fn test_unresolved_field_is_none() {
        let h = headers(&["Completely", "Unrelated"]);
        let map = ColumnMap::<TestField>::resolve(&h);
        assert_eq!(map.column(TestField::HowMuch), None);
        let row = vec!["a".to_string(), "b".to_string()];
        assert_eq!(map.cell(TestField::HowMuch, &row), None);
    }

    #[test]
    fn test_contains_fallback() {
        let h = headers(&["Responsible Person"]);
        let map = ColumnMap::<TestField>::resolve(&h);
        assert_eq!(map.column(TestField::Who), Some(0));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let h = headers(&["Date", "Donor", "Amount"]);
        let first = ColumnMap::<TestField>::resolve(&h);
        let second = ColumnMap::<TestField>::resolve(&h);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cell_lookup() {
        let h = headers(&["Date", "Name"]);
        let map = ColumnMap::<TestField>::resolve(&h);
        let row = vec!["2024-01-01".to_string(), "Alice".to_string()];
        assert_eq!(map.cell(TestField::When, &row), Some("2024-01-01"));
        assert_eq!(map.cell(TestField::Who, &row), Some("Alice"));
    }
}
