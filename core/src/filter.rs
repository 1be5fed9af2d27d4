//! Summary row filtering
//!
//! Narrows a summary table down by test identifier and test date, the way
//! the browser's search box does.

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};

use crate::models::{RawTable, Value};

/// Date format searched for in date columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Substring filter on the identifier and date columns of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Text the identifier cell must contain
    pub test_id: Option<String>,

    /// Day the date cell must contain
    pub date: Option<NaiveDate>,
}

impl RowFilter {
    /// Filter accepting every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the identifier cell to contain `test_id`
    pub fn with_test_id(mut self, test_id: impl Into<String>) -> Self {
        let test_id = test_id.into();
        self.test_id = if test_id.trim().is_empty() {
            None
        } else {
            Some(test_id.trim().to_string())
        };
        self
    }

    /// Require the date cell to contain `date` as `yyyy-mm-dd`
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Whether no criterion is set
    pub fn is_empty(&self) -> bool {
        self.test_id.is_none() && self.date.is_none()
    }

    /// Rows of `table` that pass the filter
    pub fn apply(&self, table: &RawTable) -> RawTable {
        if self.is_empty() {
            return table.clone();
        }

        let id_col = id_column(&table.columns);
        let date_col = date_column(&table.columns);
        let date = self.date.map(|d| d.format(DATE_FORMAT).to_string());

        table.filter_rows(|row| {
            let id_ok = match &self.test_id {
                Some(id) => cell_text(row, id_col).contains(id.as_str()),
                None => true,
            };
            let date_ok = match &date {
                Some(date) => cell_text(row, date_col).contains(date.as_str()),
                None => true,
            };
            id_ok && date_ok
        })
    }
}

/// First column whose name contains `id`, else the first column
fn id_column(columns: &[String]) -> usize {
    columns
        .iter()
        .position(|c| c.to_lowercase().contains("id"))
        .unwrap_or(0)
}

/// First column whose name contains `date` or `tarih`, else the second
fn date_column(columns: &[String]) -> usize {
    columns
        .iter()
        .position(|c| {
            let c = c.to_lowercase();
            c.contains("date") || c.contains("tarih")
        })
        .unwrap_or(1)
}

fn cell_text(row: &[Value], idx: usize) -> String {
    match row.get(idx) {
        Some(Value::Null) | None => String::new(),
        Some(value) => value.to_string(),
    }
}
