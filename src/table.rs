// 🧮 Raw Tables - In-memory rows with named columns
//
// Every operation consumes the table and hands back a new one, so a stage
// never observes another stage mutating its input.

use crate::error::{Error, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::ops::AddAssign;

// ============================================================================
// CELL
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Text cell, or Null when the trimmed value is empty
    pub fn text(value: impl AsRef<str>) -> Cell {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            Cell::Null
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn opt_text(value: Option<impl AsRef<str>>) -> Cell {
        value.map_or(Cell::Null, |v| Cell::text(v))
    }

    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Cell::Int(i)
                } else if n.is_u64() {
                    // Beyond i64: keep the exact digits
                    Cell::Text(n.to_string())
                } else {
                    n.as_f64().map_or(Cell::Null, Cell::Float)
                }
            }
            Value::String(s) => Cell::text(s),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Display form of the value; None for Null
    pub fn as_string(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }

    /// Identifier form: integers print exactly, integral floats drop the
    /// fraction, text is kept verbatim (leading zeros survive)
    pub fn to_identifier(&self) -> Cell {
        match self {
            Cell::Int(i) => Cell::Text(i.to_string()),
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 => {
                Cell::Text(format!("{}", *f as i64))
            }
            Cell::Float(f) => Cell::Text(f.to_string()),
            Cell::Bool(b) => Cell::Text(b.to_string()),
            Cell::Text(s) => Cell::Text(s.clone()),
            Cell::Null => Cell::Null,
        }
    }

    /// Numeric value; Some(Err) when the cell holds something unparseable
    pub fn to_decimal(&self) -> Option<std::result::Result<Decimal, String>> {
        match self {
            Cell::Null => None,
            Cell::Int(i) => Some(Ok(Decimal::from(*i))),
            Cell::Float(f) => Some(Decimal::from_f64(*f).ok_or_else(|| f.to_string())),
            Cell::Text(s) => Some(crate::normalize::parse_amount(s).ok_or_else(|| s.clone())),
            Cell::Bool(b) => Some(Err(b.to_string())),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::text(value)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        Cell::opt_text(value)
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Text(value.to_string())
    }
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub cells: Vec<Cell>,

    /// Provenance: the data year this row was loaded under
    pub epoch: i32,
}

impl RawRow {
    pub fn new(cells: Vec<Cell>, epoch: i32) -> Self {
        RawRow { cells, epoch }
    }
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Counts of row-level problems carried alongside a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDiagnostics {
    /// Rows dropped for a wrong column count or a required-field parse failure
    pub malformed_rows: usize,

    /// Non-empty date values that no known format could parse
    pub date_parse_failures: usize,

    /// Rows dropped because an earlier row had the same identifier
    pub duplicate_ids_dropped: usize,

    /// Join rows with no matching entity (kept with a null link)
    pub resolution_gaps: usize,
}

impl TableDiagnostics {
    pub fn is_clean(&self) -> bool {
        *self == TableDiagnostics::default()
    }
}

impl AddAssign for TableDiagnostics {
    fn add_assign(&mut self, other: TableDiagnostics) {
        self.malformed_rows += other.malformed_rows;
        self.date_parse_failures += other.date_parse_failures;
        self.duplicate_ids_dropped += other.duplicate_ids_dropped;
        self.resolution_gaps += other.resolution_gaps;
    }
}

// ============================================================================
// TABLE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
    pub diagnostics: TableDiagnostics,
}

impl RawTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        RawTable {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            diagnostics: TableDiagnostics::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Append a row; pads or truncates to the column count
    pub fn push(&mut self, mut cells: Vec<Cell>, epoch: i32) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(RawRow::new(cells, epoch));
    }

    pub fn cell<'a>(&self, row: &'a RawRow, name: &str) -> Option<&'a Cell> {
        self.column_index(name).and_then(|i| row.cells.get(i))
    }

    /// Non-null value of a column as a string
    pub fn value(&self, row: &RawRow, name: &str) -> Option<String> {
        self.cell(row, name).and_then(Cell::as_string)
    }

    /// All non-null values of one column, in row order
    pub fn values(&self, name: &str) -> Vec<String> {
        match self.column_index(name) {
            Some(i) => self
                .rows
                .iter()
                .filter_map(|row| row.cells.get(i).and_then(Cell::as_string))
                .collect(),
            None => Vec::new(),
        }
    }

    // ========================================================================
    // TRANSFORMS
    // ========================================================================

    /// Drop the named columns; names not present are ignored
    pub fn drop_columns(self, names: &[&str]) -> RawTable {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i].as_str()))
            .collect();
        self.project_indices(&keep)
    }

    /// Keep only the named columns, in the given order; absent names are skipped
    pub fn select(self, names: &[&str]) -> RawTable {
        let keep: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        self.project_indices(&keep)
    }

    fn project_indices(self, keep: &[usize]) -> RawTable {
        let columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                let cells = keep
                    .iter()
                    .map(|&i| row.cells.get(i).cloned().unwrap_or(Cell::Null))
                    .collect();
                RawRow::new(cells, row.epoch)
            })
            .collect();
        RawTable {
            columns,
            rows,
            diagnostics: self.diagnostics,
        }
    }

    pub fn rename_column(mut self, from: &str, to: &str) -> RawTable {
        if let Some(i) = self.column_index(from) {
            self.columns[i] = to.to_string();
        }
        self
    }

    /// Keep and rename exactly the mapped columns (source name → new name)
    pub fn project<'a>(self, map: impl IntoIterator<Item = (&'a str, &'a str)>) -> RawTable {
        let mut keep = Vec::new();
        let mut names = Vec::new();
        for (from, to) in map {
            if let Some(i) = self.column_index(from) {
                keep.push(i);
                names.push(to.to_string());
            }
        }
        let mut projected = self.project_indices(&keep);
        projected.columns = names;
        projected
    }

    /// Add (or replace) a column computed from each row
    pub fn with_column<F>(self, name: &str, f: F) -> RawTable
    where
        F: Fn(&RawTable, &RawRow) -> Cell,
    {
        let cells: Vec<Cell> = self.rows.iter().map(|row| f(&self, row)).collect();
        self.set_column(name, cells)
    }

    /// Replace each value of an existing column; no-op when the column is absent
    pub fn map_column<F>(mut self, name: &str, f: F) -> RawTable
    where
        F: Fn(&Cell) -> Cell,
    {
        if let Some(i) = self.column_index(name) {
            for row in &mut self.rows {
                if let Some(cell) = row.cells.get_mut(i) {
                    *cell = f(cell);
                }
            }
        }
        self
    }

    /// Set a column from precomputed cells (one per row)
    pub fn set_column(mut self, name: &str, cells: Vec<Cell>) -> RawTable {
        let index = match self.column_index(name) {
            Some(i) => i,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.cells.push(Cell::Null);
                }
                self.columns.len() - 1
            }
        };
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.cells[index] = cell;
        }
        self
    }

    pub fn filter<F>(mut self, keep: F) -> RawTable
    where
        F: Fn(&RawTable, &RawRow) -> bool,
    {
        let rows = std::mem::take(&mut self.rows);
        self.rows = rows.into_iter().filter(|row| keep(&self, row)).collect();
        self
    }

    /// Keep the rows whose mask entry is true (missing entries keep the row)
    pub fn keep_rows(mut self, mask: &[bool]) -> RawTable {
        let rows = std::mem::take(&mut self.rows);
        self.rows = rows
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask.get(*i).copied().unwrap_or(true))
            .map(|(_, row)| row)
            .collect();
        self
    }

    /// First-seen-wins dedup on the given key columns. Rows whose key is
    /// entirely null are kept. The dropped count lands in the diagnostics.
    pub fn dedup_by(mut self, key: &[&str]) -> RawTable {
        let indices: Vec<usize> = key.iter().filter_map(|k| self.column_index(k)).collect();
        if indices.is_empty() {
            return self;
        }

        let mut seen = HashSet::new();
        let before = self.rows.len();
        let rows = std::mem::take(&mut self.rows);
        self.rows = rows
            .into_iter()
            .filter(|row| {
                let values: Vec<Option<String>> =
                    indices.iter().map(|&i| row.cells[i].as_string()).collect();
                values.iter().all(Option::is_none) || seen.insert(values)
            })
            .collect();
        self.diagnostics.duplicate_ids_dropped += before - self.rows.len();
        self
    }

    /// Stack tables by column name. Columns are the union in first-seen
    /// order; a row missing a column gets Null there.
    pub fn concat(tables: Vec<RawTable>) -> RawTable {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut out = RawTable::new(columns);
        for table in tables {
            let positions: Vec<usize> = table
                .columns
                .iter()
                .map(|c| out.columns.iter().position(|o| o == c).unwrap_or_default())
                .collect();
            for row in table.rows {
                let mut cells = vec![Cell::Null; out.columns.len()];
                for (cell, &pos) in row.cells.into_iter().zip(&positions) {
                    cells[pos] = cell;
                }
                out.rows.push(RawRow::new(cells, row.epoch));
            }
            out.diagnostics += table.diagnostics;
        }
        out
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawTable {
        let mut table = RawTable::new(["ID", "NAME", "CITY"]);
        table.push(vec!["1".into(), "ALICE".into(), "ERIE".into()], 2020);
        table.push(vec!["2".into(), "BOB".into(), Cell::Null], 2020);
        table.push(vec!["1".into(), "ALICIA".into(), "ERIE".into()], 2021);
        table
    }

    #[test]
    fn test_text_cell_trims_and_nulls_blanks() {
        assert_eq!(Cell::text("  x "), Cell::Text("x".to_string()));
        assert_eq!(Cell::text("   "), Cell::Null);
    }

    #[test]
    fn test_identifier_keeps_exact_digits() {
        assert_eq!(Cell::Int(9_007_199_254_740_993).to_identifier(), Cell::Text("9007199254740993".into()));
        assert_eq!(Cell::Float(12345.0).to_identifier(), Cell::Text("12345".into()));
        assert_eq!(Cell::text("000123").to_identifier(), Cell::Text("000123".into()));
    }

    #[test]
    fn test_from_json_huge_unsigned_stays_text() {
        let value: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(Cell::from_json(&value), Cell::Text("18446744073709551615".into()));
    }

    #[test]
    fn test_drop_and_select() {
        let table = sample().drop_columns(&["CITY", "MISSING"]);
        assert_eq!(table.columns, vec!["ID", "NAME"]);

        let table = sample().select(&["NAME", "ID"]);
        assert_eq!(table.columns, vec!["NAME", "ID"]);
        assert_eq!(table.value(&table.rows[0], "NAME"), Some("ALICE".into()));
    }

    #[test]
    fn test_dedup_first_seen_wins() {
        let table = sample().dedup_by(&["ID"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(&table.rows[0], "NAME"), Some("ALICE".into()));
        assert_eq!(table.diagnostics.duplicate_ids_dropped, 1);
    }

    #[test]
    fn test_with_column_and_project() {
        let table = sample()
            .with_column("LOWER", |t, row| Cell::opt_text(t.value(row, "NAME").map(|n| n.to_lowercase())))
            .project([("ID", "id"), ("LOWER", "name")]);

        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.value(&table.rows[1], "name"), Some("bob".into()));
    }

    #[test]
    fn test_concat_unions_columns() {
        let mut other = RawTable::new(["ID", "PARTY"]);
        other.push(vec!["9".into(), "DEM".into()], 2022);
        other.diagnostics.malformed_rows = 2;

        let combined = RawTable::concat(vec![sample(), other]);
        assert_eq!(combined.columns, vec!["ID", "NAME", "CITY", "PARTY"]);
        assert_eq!(combined.len(), 4);
        assert_eq!(combined.cell(&combined.rows[3], "NAME"), Some(&Cell::Null));
        assert_eq!(combined.value(&combined.rows[3], "PARTY"), Some("DEM".into()));
        assert_eq!(combined.rows[3].epoch, 2022);
        assert_eq!(combined.diagnostics.malformed_rows, 2);
    }
}
