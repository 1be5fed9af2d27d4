//! Per-test-type pipelines
//!
//! Every test type runs the same two steps, extraction then transformation,
//! with its own schema and its own datasets. [`TestPipeline`] is the seam
//! between the two; [`pipeline_for`] picks the implementation.

use log::debug;

use crate::database::TestDatabase;
use crate::error::Result;
use crate::extractor::{extract_with, RawTables, SkipReason, TableFetch};
use crate::matcher::TableRole;
use crate::models::{RawTable, TestRecord, TestType};
use crate::schema::{schema_for, vicat, TestSchema};
use crate::transform::{
    dsc_oit_plots, mfi_table, vicat_final_temperature, vicat_plots, DataTable, PlotGroup,
    SmoothingParams, TransformedData,
};

/// Extraction and transformation for one test type
pub trait TestPipeline {
    /// Test type handled
    fn test_type(&self) -> TestType;

    /// Static table schema
    fn schema(&self) -> &'static TestSchema {
        schema_for(self.test_type())
    }

    /// Charts drawn from the measurement rows
    fn plots(&self, _detail: &RawTable) -> Vec<PlotGroup> {
        Vec::new()
    }

    /// Measurement table drawn from the measurement rows
    fn data_table(&self, _detail: &RawTable) -> Option<DataTable> {
        None
    }

    /// Header row the info table is rendered from
    fn header(&self, raw: &RawTables) -> Result<RawTable> {
        raw.require_header()
    }

    /// Pull the test's rows from the database
    fn extract(&self, db: &TestDatabase, record: &TestRecord) -> Result<RawTables> {
        debug!("Extracting {} test {} from {}", record.test_type, record.test_id, db.path().display());
        extract_with(db, record, self.schema())
    }

    /// Turn extracted rows into report datasets.
    ///
    /// The header is mandatory; missing measurement rows leave the charts
    /// empty and the table out.
    fn transform(&self, raw: &RawTables) -> Result<TransformedData> {
        let header = self.header(raw)?;
        let info_table = self.schema().template.fill(&header);

        let (plots, data_table) = match raw.detail() {
            Some(detail) => (self.plots(detail), self.data_table(detail)),
            None => {
                let empty = RawTable::new("", Vec::new(), Vec::new());
                (self.plots(&empty), None)
            }
        };

        Ok(TransformedData {
            plots,
            info_table,
            data_table,
        })
    }
}

/// DSC-OIT pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct DscOitPipeline;

impl TestPipeline for DscOitPipeline {
    fn test_type(&self) -> TestType {
        TestType::DscOit
    }

    fn plots(&self, detail: &RawTable) -> Vec<PlotGroup> {
        dsc_oit_plots(detail)
    }
}

/// MFI pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct MfiPipeline;

impl TestPipeline for MfiPipeline {
    fn test_type(&self) -> TestType {
        TestType::Mfi
    }

    fn data_table(&self, detail: &RawTable) -> Option<DataTable> {
        Some(mfi_table(detail))
    }
}

/// VICAT pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct VicatPipeline;

impl TestPipeline for VicatPipeline {
    fn test_type(&self) -> TestType {
        TestType::Vicat
    }

    fn plots(&self, detail: &RawTable) -> Vec<PlotGroup> {
        vicat_plots(detail)
    }

    fn header(&self, raw: &RawTables) -> Result<RawTable> {
        let header = raw.require_header()?;
        let final_temperature = vicat_final_temperature(raw.detail());
        Ok(header.with_column(vicat::FINAL_TEMPERATURE, final_temperature))
    }
}

static DSC_OIT: DscOitPipeline = DscOitPipeline;
static MFI: MfiPipeline = MfiPipeline;
static VICAT: VicatPipeline = VicatPipeline;

/// Pipeline of a test type
pub fn pipeline_for(test_type: TestType) -> &'static dyn TestPipeline {
    match test_type {
        TestType::DscOit => &DSC_OIT,
        TestType::Mfi => &MFI,
        TestType::Vicat => &VICAT,
    }
}

/// Extract the rows of a test
pub fn extract(db: &TestDatabase, record: &TestRecord) -> Result<RawTables> {
    pipeline_for(record.test_type).extract(db, record)
}

/// Transform extracted rows into report datasets
pub fn transform(test_type: TestType, raw: &RawTables) -> Result<TransformedData> {
    pipeline_for(test_type).transform(raw)
}

/// What the viewer shows for a test
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    /// Smoothed charts
    Plots(Vec<PlotGroup>),

    /// Measurement table
    Table(DataTable),

    /// Nothing to draw, with the reason
    NoData(String),
}

/// Build the viewer datasets for a test.
///
/// Only the measurement rows are needed; when they are missing the result
/// is `NoData` rather than an error.
pub fn visualize(db: &TestDatabase, record: &TestRecord, params: SmoothingParams) -> Result<Visualization> {
    let pipeline = pipeline_for(record.test_type);
    let raw = pipeline.extract(db, record)?;

    let detail = match raw.fetch(TableRole::Detail) {
        Some(TableFetch::Rows(detail)) => detail,
        Some(TableFetch::Skipped(reason)) => return Ok(Visualization::NoData(reason.to_string())),
        None => return Ok(Visualization::NoData(SkipReason::TableMissing.to_string())),
    };

    if let Some(table) = pipeline.data_table(detail) {
        return Ok(Visualization::Table(table));
    }

    let plots = pipeline.plots(detail);
    if plots.iter().all(PlotGroup::is_empty) {
        return Ok(Visualization::NoData("no numeric values to plot".to_string()));
    }

    Ok(Visualization::Plots(plots.iter().map(|p| p.smoothed(params)).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::SkipReason;
    use crate::models::{LineNumber, Value};

    fn record(test_type: TestType, line: Option<i64>) -> TestRecord {
        TestRecord::new(test_type, 1, line.map(|l| LineNumber::new(l).unwrap())).unwrap()
    }

    fn summary() -> RawTable {
        RawTable::new(
            "Test_Ana",
            vec!["Test_Id".into(), "Numune_Kodu".into()],
            vec![vec![Value::Integer(1), Value::from("NK")]],
        )
    }

    #[test]
    fn test_pipeline_dispatch() {
        for test_type in TestType::ALL {
            assert_eq!(pipeline_for(test_type).test_type(), test_type);
        }
    }

    #[test]
    fn test_vicat_header_injects_final_temperature() {
        let by_line = RawTable::new(
            "Test_Ana_Hat",
            vec!["Test_Id".into(), "Hat_Num".into(), "Agirlik".into()],
            vec![vec![Value::Integer(1), Value::Integer(1), Value::Real(1000.0)]],
        );
        let detail = RawTable::new(
            "Test_Detay",
            vec!["Test_Id".into(), "Hat_Numarasi".into(), "Sicaklik".into(), "Batma".into()],
            vec![
                vec![Value::Integer(1), Value::Integer(1), Value::Real(50.0), Value::Real(0.1)],
                vec![Value::Integer(1), Value::Integer(1), Value::Real(81.5), Value::Real(1.0)],
            ],
        );
        let raw = RawTables {
            record: record(TestType::Vicat, Some(1)),
            fetches: vec![
                (TableRole::Summary, TableFetch::Rows(summary())),
                (TableRole::DetailByLine, TableFetch::Rows(by_line)),
                (TableRole::Detail, TableFetch::Rows(detail)),
            ],
        };

        let data = transform(TestType::Vicat, &raw).unwrap();
        let rows = &data.info_table.rows;
        let value_of = |label: &str| {
            rows.iter()
                .find(|r| r.right_label == label)
                .map(|r| r.right_value.clone())
                .unwrap()
        };
        assert_eq!(value_of("Son Sicaklik:"), "81.5");
        assert_eq!(value_of("Hat No:"), "1");
        assert_eq!(value_of("Agirlik:"), "1000.0");
        assert_eq!(data.plots.len(), 1);
    }

    #[test]
    fn test_transform_without_detail() {
        let raw = RawTables {
            record: record(TestType::Vicat, Some(2)),
            fetches: vec![
                (TableRole::Summary, TableFetch::Rows(summary())),
                (TableRole::DetailByLine, TableFetch::Skipped(SkipReason::NoMatchingRows)),
                (TableRole::Detail, TableFetch::Skipped(SkipReason::TableMissing)),
            ],
        };
        let data = transform(TestType::Vicat, &raw).unwrap();
        assert!(data.plots.iter().all(PlotGroup::is_empty));
        let final_temp = data
            .info_table
            .rows
            .iter()
            .find(|r| r.right_label == "Son Sicaklik:")
            .unwrap();
        assert_eq!(final_temp.right_value, "-");
    }

    #[test]
    fn test_transform_requires_header() {
        let raw = RawTables {
            record: record(TestType::Mfi, None),
            fetches: vec![(TableRole::Summary, TableFetch::Skipped(SkipReason::TableMissing))],
        };
        assert!(matches!(
            transform(TestType::Mfi, &raw),
            Err(crate::error::CoreError::MissingRequiredTable(_))
        ));

        let raw = RawTables {
            record: record(TestType::Mfi, None),
            fetches: vec![(TableRole::Summary, TableFetch::Skipped(SkipReason::NoMatchingRows))],
        };
        assert!(matches!(
            transform(TestType::Mfi, &raw),
            Err(crate::error::CoreError::NoMatchingRows(_))
        ));
    }
}
