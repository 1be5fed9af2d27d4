//! Table role classification
//!
//! Test databases do not agree on table names (`TestAna`, `Test_Ana`,
//! `testana`, ...). The matcher maps a table name onto the role it plays
//! in a test.

use std::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use crate::utils::string::StringUtils;

/// Semantic role of a table inside a test database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableRole {
    /// One row per test (`TestAna`)
    Summary,

    /// Measurement rows (`TestDetay`)
    Detail,

    /// One row per test and line (`Test_Ana_Hat`)
    DetailByLine,

    /// Anything else
    Unknown,
}

impl TableRole {
    /// Whether tables of this role are listed when browsing a database
    pub fn is_summary_like(&self) -> bool {
        matches!(self, TableRole::Summary | TableRole::DetailByLine)
    }
}

impl Display for TableRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            TableRole::Summary => "summary",
            TableRole::Detail => "detail",
            TableRole::DetailByLine => "detail-by-line",
            TableRole::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Role tokens in precedence order; `testanahat` must win over `testana`
const ROLE_TOKENS: [(&str, TableRole); 3] = [
    ("testanahat", TableRole::DetailByLine),
    ("testana", TableRole::Summary),
    ("testdetay", TableRole::Detail),
];

/// Classify a table name into its role
pub fn classify(table_name: &str) -> TableRole {
    let key = StringUtils::normalize_key(table_name);

    ROLE_TOKENS
        .iter()
        .find(|(token, _)| key.contains(token))
        .map(|(_, role)| *role)
        .unwrap_or(TableRole::Unknown)
}

/// Names from `tables` that classify as `role`, in input order
pub fn tables_with_role<'a>(tables: &'a [String], role: TableRole) -> Vec<&'a str> {
    tables
        .iter()
        .filter(|t| classify(t) == role)
        .map(String::as_str)
        .collect()
}
