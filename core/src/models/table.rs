//! In-memory table representation
//!
//! This module provides the table type the extraction pipeline works with:
//! a named, ordered set of columns and rows of [`Value`]s read from SQLite.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use super::value::Value;
use crate::utils::string::StringUtils;

/// Rows and columns read from a single SQLite table
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Name of the source table
    pub name: String,

    /// Column names, in select order
    pub columns: Vec<String>,

    /// Row values; every row has `columns.len()` cells
    pub rows: Vec<Vec<Value>>,
}

impl Debug for RawTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "RawTable {{ name: {}, columns: {:?}, rows: {} }}",
            self.name,
            self.columns,
            self.rows.len()
        )
    }
}

impl RawTable {
    /// Create a new table
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        RawTable {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose name equals `name`, ignoring case
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Index of the column whose normalized name equals the normalized `key`
    pub fn column_by_key(&self, key: &str) -> Option<usize> {
        let key = StringUtils::normalize_key(key);
        self.columns
            .iter()
            .position(|c| StringUtils::normalize_key(c) == key)
    }

    /// Index of the first column whose normalized name contains `token`
    pub fn find_column(&self, token: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| StringUtils::contains_token(c, token))
    }

    /// Exact normalized match on `key` first, then token containment
    pub fn resolve_column(&self, key: &str, token: &str) -> Option<usize> {
        self.column_by_key(key).or_else(|| self.find_column(token))
    }

    /// Cell at `row`, `col`
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All values of one column
    pub fn column_values(&self, col: usize) -> Vec<&Value> {
        self.rows.iter().filter_map(|r| r.get(col)).collect()
    }

    /// Keep the rows whose `column` holds the integer `expected`.
    ///
    /// Returns `None` when the column does not exist.
    pub fn filter_eq(&self, column: &str, expected: i64) -> Option<RawTable> {
        let idx = self.column_index(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| row.get(idx).and_then(Value::as_i64) == Some(expected))
            .cloned()
            .collect();

        Some(RawTable::new(self.name.clone(), self.columns.clone(), rows))
    }

    /// Keep the rows for which `predicate` holds
    pub fn filter_rows<F>(&self, mut predicate: F) -> RawTable
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect();

        RawTable::new(self.name.clone(), self.columns.clone(), rows)
    }

    /// Copy of the table without its leading column
    pub fn drop_first_column(&self) -> RawTable {
        if self.columns.is_empty() {
            return self.clone();
        }

        let columns = self.columns[1..].to_vec();
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().skip(1).cloned().collect())
            .collect();

        RawTable::new(self.name.clone(), columns, rows)
    }

    /// Concatenate `other` column-wise onto this table.
    ///
    /// Rows are aligned by position; the shorter side is padded with NULLs.
    pub fn hconcat(&self, other: &RawTable) -> RawTable {
        let height = self.rows.len().max(other.rows.len());
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        let rows = (0..height)
            .map(|i| {
                let mut row = pad_row(self.rows.get(i), self.columns.len());
                row.extend(pad_row(other.rows.get(i), other.columns.len()));
                row
            })
            .collect();

        RawTable::new(self.name.clone(), columns, rows)
    }

    /// Set `name` to `value` on every row, adding the column if needed.
    ///
    /// A table without rows gets a single row so the value is not lost.
    pub fn with_column(&self, name: &str, value: Value) -> RawTable {
        let mut table = self.clone();
        if table.rows.is_empty() {
            table.rows.push(vec![Value::Null; table.columns.len()]);
        }

        match table.column_index(name) {
            Some(idx) => {
                for row in &mut table.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                table.columns.push(name.to_string());
                for row in &mut table.rows {
                    row.push(value.clone());
                }
            }
        }

        table
    }

    /// Column names formatted for display
    pub fn display_headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| StringUtils::format_column_name(c))
            .collect()
    }
}

fn pad_row(row: Option<&Vec<Value>>, width: usize) -> Vec<Value> {
    let mut cells = row.cloned().unwrap_or_default();
    cells.resize(width, Value::Null);
    cells
}
