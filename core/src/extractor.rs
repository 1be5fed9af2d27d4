//! Data extraction
//!
//! Pulls the rows belonging to one test out of the tables of a test
//! database. Every table role the test needs ends up with an explicit
//! outcome: either the filtered rows or the reason they are absent.

use std::fmt::{Display, Formatter, Result as FmtResult};
use log::{debug, warn};

use crate::database::TestDatabase;
use crate::error::{CoreError, Result};
use crate::matcher::{tables_with_role, TableRole};
use crate::models::{RawTable, TestRecord};
use crate::schema::{RowFilterKey, TestSchema};
use crate::utils::string::StringUtils;

/// Why a table role produced no rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No table in the database has the role
    TableMissing,

    /// The table exists but no row belongs to the test
    NoMatchingRows,

    /// The table could not be read or lacks the filter column
    ReadFailed(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SkipReason::TableMissing => write!(f, "table missing"),
            SkipReason::NoMatchingRows => write!(f, "no matching rows"),
            SkipReason::ReadFailed(reason) => write!(f, "read failed: {}", reason),
        }
    }
}

/// Outcome of fetching one table role
#[derive(Debug, Clone, PartialEq)]
pub enum TableFetch {
    /// Filtered rows, never empty
    Rows(RawTable),

    /// No rows, with the reason
    Skipped(SkipReason),
}

impl TableFetch {
    /// The rows, if any
    pub fn rows(&self) -> Option<&RawTable> {
        match self {
            TableFetch::Rows(table) => Some(table),
            TableFetch::Skipped(_) => None,
        }
    }
}

/// Per-role fetch outcomes for one test
#[derive(Debug, Clone, PartialEq)]
pub struct RawTables {
    /// Test the rows belong to
    pub record: TestRecord,

    /// Outcome per role, in schema order
    pub fetches: Vec<(TableRole, TableFetch)>,
}

impl RawTables {
    /// Outcome for `role`
    pub fn fetch(&self, role: TableRole) -> Option<&TableFetch> {
        self.fetches
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, fetch)| fetch)
    }

    /// Rows for `role`, if any were found
    pub fn rows(&self, role: TableRole) -> Option<&RawTable> {
        self.fetch(role).and_then(TableFetch::rows)
    }

    /// Measurement rows
    pub fn detail(&self) -> Option<&RawTable> {
        self.rows(TableRole::Detail)
    }

    /// Header rows of the test.
    ///
    /// For per-line tests the per-line row, minus its leading identifier
    /// column, is appended column-wise to the summary row. A missing
    /// summary table is `MissingRequiredTable` and an empty one is
    /// `NoMatchingRows`.
    pub fn require_header(&self) -> Result<RawTable> {
        let summary = match self.fetch(TableRole::Summary) {
            Some(TableFetch::Rows(table)) => table,
            Some(TableFetch::Skipped(SkipReason::NoMatchingRows)) => {
                return Err(CoreError::NoMatchingRows(format!(
                    "no summary row for {} test {}",
                    self.record.test_type, self.record.test_id
                )))
            }
            Some(TableFetch::Skipped(reason)) => {
                return Err(CoreError::MissingRequiredTable(format!(
                    "summary table for {}: {}",
                    self.record.test_type, reason
                )))
            }
            None => {
                return Err(CoreError::MissingRequiredTable(format!(
                    "summary table for {}",
                    self.record.test_type
                )))
            }
        };

        match self.fetch(TableRole::DetailByLine) {
            Some(TableFetch::Rows(by_line)) => Ok(summary.hconcat(&by_line.drop_first_column())),
            Some(TableFetch::Skipped(reason)) => {
                warn!(
                    "Per-line header for test {} line {:?} unavailable ({}), using summary only",
                    self.record.test_id, self.record.line, reason
                );
                Ok(summary.clone())
            }
            None => Ok(summary.clone()),
        }
    }
}

/// Extract the rows of `record` following `schema`
pub fn extract_with(db: &TestDatabase, record: &TestRecord, schema: &TestSchema) -> Result<RawTables> {
    let names = db.table_names()?;

    let fetches = schema
        .filters
        .iter()
        .map(|key| (key.role, fetch_role(db, &names, key, record)))
        .collect();

    Ok(RawTables {
        record: *record,
        fetches,
    })
}

fn fetch_role(db: &TestDatabase, names: &[String], key: &RowFilterKey, record: &TestRecord) -> TableFetch {
    let candidates = tables_with_role(names, key.role);
    let table_name = match candidates.as_slice() {
        [] => {
            warn!("No {} table in {}", key.role, db.path().display());
            return TableFetch::Skipped(SkipReason::TableMissing);
        }
        [only] => *only,
        [first, ..] => {
            warn!("Several {} tables in {} ({:?}), using {}", key.role, db.path().display(), candidates, first);
            *first
        }
    };

    let table = match db.read_table(table_name) {
        Ok(table) => table,
        Err(e) => {
            warn!("Skipping table {}: {}", table_name, e);
            return TableFetch::Skipped(SkipReason::ReadFailed(e.to_string()));
        }
    };

    let mut filtered = match table.filter_eq(key.id_column, record.test_id) {
        Some(filtered) => filtered,
        None => return missing_column(table_name, key.id_column),
    };

    if let (Some(line_column), Some(line)) = (key.line_column, record.line) {
        filtered = match filtered.filter_eq(line_column, line.get()) {
            Some(filtered) => filtered,
            None => return missing_column(table_name, line_column),
        };
    }

    if filtered.is_empty() {
        debug!("No rows for test {} in {}", record.test_id, table_name);
        TableFetch::Skipped(SkipReason::NoMatchingRows)
    } else {
        debug!("Fetched {} rows for test {} from {}", filtered.len(), record.test_id, table_name);
        TableFetch::Rows(filtered)
    }
}

fn missing_column(table: &str, column: &str) -> TableFetch {
    warn!("Table {} has no column {}", table, column);
    TableFetch::Skipped(SkipReason::ReadFailed(format!("{} has no column {}", table, column)))
}

/// Rows of one detail table belonging to a test, as shown in the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    /// View title (`Test Id: N` or `Test Id: N, Hat No: L`)
    pub title: String,

    /// Filtered rows with display headers
    pub table: RawTable,
}

/// Every detail table filtered on its first test-identifier column
pub fn detail_views(db: &TestDatabase, record: &TestRecord) -> Result<Vec<DetailView>> {
    let names = db.table_names()?;
    let mut views = Vec::new();

    for name in tables_with_role(&names, TableRole::Detail) {
        let table = db.read_table(name)?;
        let id_idx = match table.find_column("testid") {
            Some(idx) => idx,
            None => {
                warn!("Detail table {} has no test id column, skipping", name);
                continue;
            }
        };

        let mut filtered =
            table.filter_rows(|row| row.get(id_idx).and_then(|v| v.as_i64()) == Some(record.test_id));
        filtered.columns = filtered.display_headers();

        views.push(DetailView {
            title: record.view_title(),
            table: filtered,
        });
    }

    Ok(views)
}

/// Every summary-like table with display headers
pub fn summary_tables(db: &TestDatabase) -> Result<Vec<RawTable>> {
    let mut tables = Vec::new();

    for (name, role) in db.classified_tables()? {
        if !role.is_summary_like() {
            continue;
        }
        let mut table = db.read_table(&name)?;
        table.columns = table
            .columns
            .iter()
            .map(|c| StringUtils::format_column_name(c))
            .collect();
        tables.push(table);
    }

    Ok(tables)
}
