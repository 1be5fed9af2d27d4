//! Per-test-type table schemas
//!
//! Each test type stores its data in a fixed family of tables. This module
//! holds the static description of those families: which table roles a test
//! needs, which columns identify a test's rows in each of them, and which
//! columns feed the plots and tables of the report.

mod templates;

pub use templates::{ReportTemplate, TemplateEntry};

use crate::matcher::TableRole;
use crate::models::TestType;

/// How the rows of one table role are tied to a test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFilterKey {
    /// Role of the table
    pub role: TableRole,

    /// Column holding the test identifier
    pub id_column: &'static str,

    /// Column holding the line number, for per-line tables
    pub line_column: Option<&'static str>,
}

/// Column reference resolved against a table's columns.
///
/// `key` is compared with each normalized column name first; when nothing
/// matches exactly the first column containing `token` is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    /// Exact normalized column name
    pub key: &'static str,

    /// Fallback token
    pub token: &'static str,
}

impl ColumnRef {
    const fn new(key: &'static str, token: &'static str) -> Self {
        ColumnRef { key, token }
    }
}

/// Static description of one test type's tables
#[derive(Debug)]
pub struct TestSchema {
    /// Test type described
    pub test_type: TestType,

    /// Row filters per role, in extraction order; the first is the header
    pub filters: &'static [RowFilterKey],

    /// Info-table template
    pub template: &'static ReportTemplate,
}

impl TestSchema {
    /// Filter key for `role`
    pub fn filter_for(&self, role: TableRole) -> Option<&RowFilterKey> {
        self.filters.iter().find(|f| f.role == role)
    }
}

/// DSC-OIT plot columns
pub mod dsc_oit {
    use super::ColumnRef;

    /// Sample temperature
    pub const SAMPLE_TEMPERATURE: ColumnRef = ColumnRef::new("numunesicakligi", "numune");

    /// Reference temperature
    pub const REFERENCE_TEMPERATURE: ColumnRef = ColumnRef::new("referanssicakligi", "referans");

    /// Heat flow
    pub const WATT: ColumnRef = ColumnRef::new("watt", "watt");

    /// Elapsed test time
    pub const TEST_TIME: ColumnRef = ColumnRef::new("testsuresi", "testsure");
}

/// MFI detail table columns
pub mod mfi {
    use super::ColumnRef;

    /// Row number within the test
    pub const ROW_ID: ColumnRef = ColumnRef::new("detayid", "detayid");

    /// Extrudate weight
    pub const WEIGHT: ColumnRef = ColumnRef::new("detayagirlik", "agirlik");

    /// Cut interval
    pub const CUT_TIME: ColumnRef = ColumnRef::new("detaykesmezamani", "zaman");

    /// Melt volume rate
    pub const MVR: ColumnRef = ColumnRef::new("detaymvr", "mvr");

    /// Melt flow rate
    pub const MFR: ColumnRef = ColumnRef::new("detaymfr", "mfr");

    /// Display headers of the measurement table
    pub const HEADERS: [&str; 4] = ["Agirlik (gr)", "Kesme Zam. (sn)", "MVR (mm³/10dk)", "MFR (gr/10dk)"];

    /// Header of the row number column added in reports
    pub const ROW_HEADER: &str = "No";

    /// Column ratios of the report table including the row number column
    pub const COLUMN_RATIOS: [f64; 5] = [3.0, 5.0, 8.0, 8.0, 8.0];
}

/// VICAT detail table columns
pub mod vicat {
    use super::ColumnRef;

    /// Bath temperature
    pub const TEMPERATURE: ColumnRef = ColumnRef::new("sicaklik", "sicaklik");

    /// Needle penetration
    pub const PENETRATION: ColumnRef = ColumnRef::new("batma", "batma");

    /// Column injected into the header with the last measured temperature
    pub const FINAL_TEMPERATURE: &str = "son_sicaklik";
}

static DSC_OIT_FILTERS: [RowFilterKey; 2] = [
    RowFilterKey { role: TableRole::Summary, id_column: "TestId", line_column: None },
    RowFilterKey { role: TableRole::Detail, id_column: "TestId", line_column: None },
];

static MFI_FILTERS: [RowFilterKey; 2] = [
    RowFilterKey { role: TableRole::Summary, id_column: "TestId", line_column: None },
    RowFilterKey { role: TableRole::Detail, id_column: "Detay_TestId", line_column: None },
];

static VICAT_FILTERS: [RowFilterKey; 3] = [
    RowFilterKey { role: TableRole::Summary, id_column: "Test_Id", line_column: None },
    RowFilterKey { role: TableRole::DetailByLine, id_column: "Test_Id", line_column: Some("Hat_Num") },
    RowFilterKey { role: TableRole::Detail, id_column: "Test_Id", line_column: Some("Hat_Numarasi") },
];

/// DSC-OIT tables
pub static DSC_OIT_SCHEMA: TestSchema = TestSchema {
    test_type: TestType::DscOit,
    filters: &DSC_OIT_FILTERS,
    template: &templates::DSC_OIT_TEMPLATE,
};

/// MFI tables
pub static MFI_SCHEMA: TestSchema = TestSchema {
    test_type: TestType::Mfi,
    filters: &MFI_FILTERS,
    template: &templates::MFI_TEMPLATE,
};

/// VICAT tables
pub static VICAT_SCHEMA: TestSchema = TestSchema {
    test_type: TestType::Vicat,
    filters: &VICAT_FILTERS,
    template: &templates::VICAT_TEMPLATE,
};

/// Schema of a test type
pub fn schema_for(test_type: TestType) -> &'static TestSchema {
    match test_type {
        TestType::DscOit => &DSC_OIT_SCHEMA,
        TestType::Mfi => &MFI_SCHEMA,
        TestType::Vicat => &VICAT_SCHEMA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup() {
        for test_type in TestType::ALL {
            let schema = schema_for(test_type);
            assert_eq!(schema.test_type, test_type);
            assert_eq!(schema.filters[0].role, TableRole::Summary);
        }
    }

    #[test]
    fn test_filter_keys() {
        assert_eq!(MFI_SCHEMA.filter_for(TableRole::Detail).unwrap().id_column, "Detay_TestId");

        let by_line = VICAT_SCHEMA.filter_for(TableRole::DetailByLine).unwrap();
        assert_eq!(by_line.line_column, Some("Hat_Num"));

        let detail = VICAT_SCHEMA.filter_for(TableRole::Detail).unwrap();
        assert_eq!(detail.line_column, Some("Hat_Numarasi"));

        assert!(DSC_OIT_SCHEMA.filter_for(TableRole::DetailByLine).is_none());
    }
}
