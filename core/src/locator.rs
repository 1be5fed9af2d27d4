//! Test location
//!
//! Turns a database path and a selected summary row into a [`TestRecord`].

use std::path::Path;
use log::debug;

use crate::error::{CoreError, Result};
use crate::models::{LineNumber, SelectedRow, TestRecord, TestType, Value};
use crate::utils::string::StringUtils;

const TEST_ID_TOKEN: &str = "testid";
const LINE_TOKEN: &str = "hat";

/// Locate the test a selected row refers to.
///
/// The test type comes from the database file name, the test identifier
/// from the first column whose name contains `TestId` and, for VICAT, the
/// line from the first column whose name contains `Hat`.
pub fn locate(db_path: &Path, row: &SelectedRow) -> Result<TestRecord> {
    let test_type = TestType::from_path(db_path)?;

    let (id_column, id_text) = find_cell(row, TEST_ID_TOKEN).ok_or_else(|| {
        CoreError::InvalidTestIdentifier(format!(
            "no TestId column among {:?}",
            row.headers().collect::<Vec<_>>()
        ))
    })?;

    let line_cell = find_cell(row, LINE_TOKEN);
    if test_type.requires_line() && line_cell.is_none() {
        return Err(CoreError::MissingLineSelection(format!(
            "{} rows must come from a table with a line column",
            test_type
        )));
    }

    let test_id = parse_integer(id_column, id_text)?;

    let line = if test_type.requires_line() {
        match line_cell {
            Some((column, text)) => Some(LineNumber::new(parse_integer(column, text)?)?),
            None => None,
        }
    } else {
        None
    };

    debug!("Located {} test {} (line {:?}) in {}", test_type, test_id, line, db_path.display());
    TestRecord::new(test_type, test_id, line)
}

fn find_cell<'a>(row: &'a SelectedRow, token: &str) -> Option<(&'a str, &'a str)> {
    row.iter().find(|(header, _)| StringUtils::contains_token(header, token))
}

fn parse_integer(column: &str, text: &str) -> Result<i64> {
    Value::Text(text.to_string())
        .as_i64()
        .ok_or_else(|| CoreError::MalformedIdentifier {
            column: column.to_string(),
            value: text.to_string(),
        })
}
