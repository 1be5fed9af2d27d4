//! Test records
//!
//! A test record names one test instance: its type, its identifier and,
//! for per-line tests, the production line it was run on.

use std::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use super::test_type::TestType;
use crate::error::{CoreError, Result};

/// Production line of a VICAT test, 1 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LineNumber(u8);

impl LineNumber {
    /// Lowest valid line
    pub const MIN: i64 = 1;

    /// Highest valid line
    pub const MAX: i64 = 5;

    /// Create a line number, rejecting values outside 1..=5
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(LineNumber(value as u8))
        } else {
            Err(CoreError::InvalidLineNumber(value))
        }
    }

    /// The line as an integer
    pub fn get(&self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for LineNumber {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self> {
        LineNumber::new(value)
    }
}

impl From<LineNumber> for i64 {
    fn from(line: LineNumber) -> Self {
        line.get()
    }
}

impl Display for LineNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// One test instance inside a test database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestRecord {
    /// Type of the test
    pub test_type: TestType,

    /// Test identifier
    pub test_id: i64,

    /// Line number; always present for VICAT and absent otherwise
    pub line: Option<LineNumber>,
}

impl TestRecord {
    /// Create a record.
    ///
    /// VICAT requires a line; the line is discarded for the other types.
    pub fn new(test_type: TestType, test_id: i64, line: Option<LineNumber>) -> Result<Self> {
        let line = if test_type.requires_line() {
            Some(line.ok_or_else(|| {
                CoreError::MissingLineSelection(format!("{} test {} needs a line number", test_type, test_id))
            })?)
        } else {
            None
        };

        Ok(TestRecord {
            test_type,
            test_id,
            line,
        })
    }

    /// Title of the detail view for this record
    pub fn view_title(&self) -> String {
        match self.line {
            Some(line) => format!("Test Id: {}, Hat No: {}", self.test_id, line),
            None => format!("Test Id: {}", self.test_id),
        }
    }

    /// File name of the PDF report for this record
    pub fn report_file_name(&self) -> String {
        match self.line {
            Some(line) => format!("{}_{}_{}_Report.pdf", self.test_type, self.test_id, line),
            None => format!("{}_{}_Report.pdf", self.test_type, self.test_id),
        }
    }
}

/// A row picked from a summary table, as (column header, cell text) pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRow(pub Vec<(String, String)>);

impl SelectedRow {
    /// Create a selection from header/cell pairs
    pub fn new<I, K, V>(cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SelectedRow(cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Column headers, in order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(h, _)| h.as_str())
    }

    /// Iterate over header/cell pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }
}
