//! Raw tabular input.
//!
//! Tables arrive as rows of named cells. Cells are loosely typed, exactly as
//! a spreadsheet or JSON export hands them over; typed records are parsed
//! from them in [`crate::records`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// Canonical text form used for identifiers and keys.
    ///
    /// Integral numbers print without a fractional part so that a period
    /// typed as `1` and one typed as `"1"` compare equal.
    pub fn key(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if !n.is_nan() => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether the cell equals the given marker (`*` or `@`).
    pub fn is_marker(&self, marker: &str) -> bool {
        matches!(self, Cell::Text(s) if s.trim() == marker)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(f64::from(n))
    }
}

/// A row maps column names to cells.
pub type Row = BTreeMap<String, Cell>;

/// Builds a [`Row`] from `column => value` pairs.
///
/// ```
/// use flowforge_core::{row, Cell};
///
/// let r = row! { "Period" => 1, "Node" => "O", "Demand" => 100.0 };
/// assert_eq!(r["Node"], Cell::text("O"));
/// ```
#[macro_export]
macro_rules! row {
    ($($column:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut r = $crate::Row::new();
        $(r.insert(::std::string::String::from($column), $crate::Cell::from($value));)*
        r
    }};
}

/// Returns the canonical key of `column` in `row`, or an empty string.
pub fn cell_key(row: &Row, column: &str) -> String {
    row.get(column).map(Cell::key).unwrap_or_default()
}

/// Joins the key cells of a row for diagnostics and grouping.
pub fn row_key(row: &Row, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| cell_key(row, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// An ordered collection of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries a non-empty value in `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.rows
            .iter()
            .any(|r| r.get(column).is_some_and(|c| !c.is_empty()))
    }

    /// Distinct explicit values of `column`, skipping wildcard markers.
    pub fn explicit_values(&self, column: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .rows
            .iter()
            .filter_map(|r| r.get(column))
            .filter(|c| !c.is_empty() && !c.is_marker(crate::ALL) && !c.is_marker(crate::AGGREGATE))
            .map(Cell::key)
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Named input tables for one run (or one scenario of a run).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputTables {
    tables: BTreeMap<String, Table>,
}

impl InputTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses tables from a JSON object of `table name -> [row]`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    /// Builder-style insertion.
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.insert(name, Table::from_rows(rows));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Rows of `name`, empty when the table is absent.
    pub fn rows(&self, name: &str) -> &[Row] {
        self.tables.get(name).map(Table::rows).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Table)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<(String, Table)> for InputTables {
    fn from_iter<I: IntoIterator<Item = (String, Table)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_normalizes_integers() {
        assert_eq!(Cell::Number(3.0).key(), "3");
        assert_eq!(Cell::text(" 3 ").key(), "3");
        assert_eq!(Cell::Number(2.5).key(), "2.5");
    }

    #[test]
    fn test_cell_from_json() {
        let tables = InputTables::from_json_str(
            r#"{"Periods": [{"Period": 1, "Weight": null}, {"Period": "2", "Weight": 0.5}]}"#,
        )
        .unwrap();
        let rows = tables.rows("Periods");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Weight"], Cell::Empty);
        assert_eq!(rows[1]["Period"].as_number(), Some(2.0));
        assert!(tables.rows("Missing").is_empty());
    }

    #[test]
    fn test_explicit_values_skip_markers() {
        let table = Table::from_rows(vec![
            row! { "Mode" => "truck" },
            row! { "Mode" => "*" },
            row! { "Mode" => "@" },
            row! { "Mode" => "rail" },
            row! { "Mode" => "truck" },
        ]);
        assert_eq!(table.explicit_values("Mode"), vec!["rail", "truck"]);
    }
}
