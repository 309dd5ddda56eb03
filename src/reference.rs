//! Reference rows and the lookup index built over the match column.

use std::collections::HashMap;

use crate::normalize::normalize;

/// One spreadsheet row: an ordered mapping from column name to cell value.
///
/// Missing columns read as empty strings, never as errors, so templates and
/// match lookups degrade gracefully on sparse sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRow {
    cells: Vec<(String, String)>,
}

impl ReferenceRow {
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Append a column/value pair, keeping spreadsheet column order.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.push((column.into(), value.into()));
    }

    /// Cell value for `column`, or an empty string when the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> &str {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map_or("", |(_, value)| value.as_str())
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.cells.iter().any(|(name, _)| name == column)
    }

    /// Column names in spreadsheet order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for ReferenceRow {
    fn from_iter<T: IntoIterator<Item = (C, V)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}

/// Lookup structure over the reference rows, keyed by the chosen match column.
///
/// `by_exact` maps each row's trimmed match-column value to the row;
/// duplicate values overwrite earlier entries (last-write-wins) and the
/// overwrite count is recorded so callers can warn about ambiguous sheets.
/// The normalized side index serves the fuzzy strategies and keeps an
/// insertion-ordered key list so scans are stable across runs.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    rows: Vec<ReferenceRow>,
    by_exact: HashMap<String, usize>,
    by_normalized: HashMap<String, String>,
    normalized_keys: Vec<(String, String)>,
    duplicate_keys: usize,
}

impl ReferenceIndex {
    /// Build the index from loaded rows and the chosen match column.
    ///
    /// Rows whose match-column value is empty or whitespace-only are
    /// skipped: they cannot be rename targets. A column present in no row
    /// yields an empty index rather than an error; lookups simply find
    /// nothing.
    #[must_use]
    pub fn build(rows: Vec<ReferenceRow>, match_column: &str) -> Self {
        let mut by_exact = HashMap::new();
        let mut by_normalized = HashMap::new();
        let mut normalized_keys = Vec::new();
        let mut duplicate_keys = 0;

        for (row_index, row) in rows.iter().enumerate() {
            let value = row.get(match_column).trim();
            if value.is_empty() {
                continue;
            }
            let key = value.to_string();
            if by_exact.insert(key.clone(), row_index).is_some() {
                duplicate_keys += 1;
            }
            let normalized = normalize(value);
            by_normalized.insert(normalized.clone(), key.clone());
            normalized_keys.push((normalized, key));
        }

        Self {
            rows,
            by_exact,
            by_normalized,
            normalized_keys,
            duplicate_keys,
        }
    }

    /// Row stored under the exact (trimmed) key, if any.
    #[must_use]
    pub fn exact(&self, key: &str) -> Option<&ReferenceRow> {
        self.by_exact.get(key).map(|&index| &self.rows[index])
    }

    /// Exact lookup returning the stored key together with its row.
    #[must_use]
    pub fn exact_entry(&self, key: &str) -> Option<(&str, &ReferenceRow)> {
        self.by_exact
            .get_key_value(key)
            .map(|(stored_key, &index)| (stored_key.as_str(), &self.rows[index]))
    }

    /// Raw key whose normalized form equals `normalized`, if any.
    #[must_use]
    pub fn raw_key_for_normalized(&self, normalized: &str) -> Option<&str> {
        self.by_normalized.get(normalized).map(String::as_str)
    }

    /// Indexed `(normalized, raw)` key pairs in spreadsheet load order.
    pub fn normalized_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.normalized_keys
            .iter()
            .map(|(normalized, raw)| (normalized.as_str(), raw.as_str()))
    }

    /// Number of indexed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_exact.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_exact.is_empty()
    }

    /// How many keys were overwritten by later rows with the same value.
    #[must_use]
    pub const fn duplicate_keys(&self) -> usize {
        self.duplicate_keys
    }
}

#[cfg(test)]
mod reference_row_tests {
    use super::*;

    #[test]
    fn get_returns_value_or_empty() {
        let row: ReferenceRow = [("matricula", "12345"), ("nome", "Ana Silva")].into_iter().collect();
        assert_eq!(row.get("matricula"), "12345");
        assert_eq!(row.get("nome"), "Ana Silva");
        assert_eq!(row.get("setor"), "");
    }

    #[test]
    fn columns_keep_order() {
        let row: ReferenceRow = [("b", "1"), ("a", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }
}
