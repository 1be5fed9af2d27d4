//! Data models for the lab report toolkit
//!
//! This module provides data structures for representing test databases,
//! including cell values, tables, test types and test records.

mod value;
mod table;
mod test_type;
mod record;

pub use value::{Value, MISSING_CELL};
pub use table::RawTable;
pub use test_type::{TestType, DEFAULT_FUZZY_THRESHOLD};
pub use record::{LineNumber, TestRecord, SelectedRow};
