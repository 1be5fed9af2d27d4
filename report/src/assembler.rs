//! Report assembly
//!
//! [`ReportRequest`] validates everything that can be checked without
//! touching the filesystem. [`ReportAssembler`] then extracts and
//! transforms the test data, lays out the body and writes the PDF.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info};

use labreport_core::config::ReportConfig;
use labreport_core::database::validate_database_path;
use labreport_core::pipeline;
use labreport_core::transform::TransformedData;
use labreport_core::utils::{measure_time, StringUtils};
use labreport_core::{CoreError, LineNumber, TestDatabase, TestRecord, TestType};

use crate::chart::ChartBlock;
use crate::error::Result;
use crate::header::HeaderInfo;
use crate::layout::{layout, Align, ColumnWidths, Flowable, PageGeometry};
use crate::raster::{ImageId, ImageStore, Raster};
use crate::text::Font;
use crate::writer::{Decorations, PdfWriter};

/// A validated request for one report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    /// Test database
    pub db_path: PathBuf,

    /// Test to report on
    pub record: TestRecord,

    /// File name of the PDF, inside the reports directory
    pub file_name: String,
}

impl ReportRequest {
    /// Create a request, checking the database extension and file name
    pub fn new(db_path: impl Into<PathBuf>, record: TestRecord, file_name: impl Into<String>) -> Result<Self> {
        let db_path = db_path.into();
        let file_name = file_name.into();
        validate_database_path(&db_path)?;
        validate_output_name(&file_name)?;

        Ok(ReportRequest {
            db_path,
            record,
            file_name,
        })
    }

    /// Request with the record's default file name
    pub fn for_record(db_path: impl Into<PathBuf>, record: TestRecord) -> Result<Self> {
        let file_name = record.report_file_name();
        Self::new(db_path, record, file_name)
    }

    /// Request from user-entered text.
    ///
    /// The test type may be misspelled up to `fuzzy_threshold`; the test id
    /// must be an integer and VICAT needs a line within 1..=5.
    pub fn from_raw(
        db_path: &str,
        test_type: &str,
        test_id: &str,
        line: Option<i64>,
        file_name: Option<&str>,
        fuzzy_threshold: f64,
    ) -> Result<Self> {
        validate_database_path(Path::new(db_path))?;
        if let Some(name) = file_name {
            validate_output_name(name)?;
        }

        let test_type = TestType::parse_fuzzy(test_type, fuzzy_threshold)?;
        let test_id = test_id
            .trim()
            .parse::<i64>()
            .map_err(|_| CoreError::InvalidTestIdentifier(test_id.to_string()))?;
        let line = line.map(LineNumber::new).transpose()?;
        let record = TestRecord::new(test_type, test_id, line)?;

        match file_name {
            Some(name) => Self::new(db_path, record, name),
            None => Self::for_record(db_path, record),
        }
    }
}

fn validate_output_name(name: &str) -> Result<()> {
    let stem_present = Path::new(name).file_stem().map_or(false, |s| !s.is_empty());
    match StringUtils::extension_of(name) {
        Some(ext) if ext == ".pdf" && stem_present => Ok(()),
        _ => Err(CoreError::InvalidOutputFilename(name.to_string()).into()),
    }
}

/// Builds PDF reports from transformed test data
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    config: ReportConfig,
    geometry: PageGeometry,
}

impl ReportAssembler {
    /// Create an assembler for A4 pages
    pub fn new(config: ReportConfig) -> Self {
        ReportAssembler {
            config,
            geometry: PageGeometry::a4(),
        }
    }

    /// Use a different page geometry
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Report configuration
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Extract, transform and write the report for `request`
    pub fn create_report(&self, request: &ReportRequest) -> Result<PathBuf> {
        let db = TestDatabase::open(&request.db_path)?;
        let data = measure_time("extract and transform", || -> Result<TransformedData> {
            let raw = pipeline::extract(&db, &request.record)?;
            Ok(pipeline::transform(request.record.test_type, &raw)?)
        })?;
        self.build(request, &data)
    }

    /// Write the report for `data` into the reports directory
    pub fn build(&self, request: &ReportRequest, data: &TransformedData) -> Result<PathBuf> {
        let bytes = self.render(data)?;

        fs::create_dir_all(&self.config.reports_dir)?;
        let path = self.config.reports_dir.join(&request.file_name);
        fs::write(&path, &bytes)?;

        info!("Wrote report {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Produce the PDF bytes for `data`
    pub fn render(&self, data: &TransformedData) -> Result<Vec<u8>> {
        measure_time("render report", || {
            let mut images = ImageStore::new();
            let decorations = Decorations {
                logo: Raster::load_optional(&self.config.logo_path()).map(|r| images.add(r)),
                cover_logo: Raster::load_optional(&self.config.cover_logo_path()).map(|r| images.add(r)),
                header: HeaderInfo::load(&self.config.header_info_path()),
            };

            let mut flowables = self.cover(decorations.cover_logo, &images);
            flowables.extend(self.body(data, &mut images)?);

            let pages = layout(&flowables, &self.geometry)?;
            debug!("Report body spans {} pages", pages.len());
            PdfWriter::new(self.geometry, self.config.title.as_str()).write(&pages, &images, &decorations)
        })
    }

    /// First page: cover logo and summary paragraph
    fn cover(&self, cover_logo: Option<ImageId>, images: &ImageStore) -> Vec<Flowable> {
        let height = self.geometry.height;
        let mut flowables = vec![Flowable::Spacer(height * 0.1)];

        if let Some((id, raster)) = cover_logo.and_then(|id| Some((id, images.get(id)?))) {
            let (width, logo_height) = raster.fit(self.geometry.frame_width(), height * 0.4);
            flowables.push(Flowable::Image {
                id,
                width,
                height: logo_height,
            });
        }

        flowables.extend([
            Flowable::Spacer(height * 0.2),
            Flowable::Paragraph {
                text: self.config.cover_text.clone(),
                font: Font::Regular,
                size: 9.0,
                leading: 14.0,
                align: Align::Left,
            },
            Flowable::PageBreak,
        ]);
        flowables
    }

    /// Title, info table, then charts or the data table
    fn body(&self, data: &TransformedData, images: &mut ImageStore) -> Result<Vec<Flowable>> {
        let mut flowables = vec![
            Flowable::Paragraph {
                text: self.config.title.clone(),
                font: Font::Bold,
                size: 16.0,
                leading: 20.0,
                align: Align::Center,
            },
            Flowable::Spacer(12.0),
            Flowable::Rule(1.0),
            Flowable::Spacer(5.0),
            Flowable::InfoTable(data.info_table.clone()),
            Flowable::Spacer(10.0),
            Flowable::Rule(0.5),
        ];

        let chart_width = self.geometry.width * 0.6;
        let chart_height = self.geometry.height * 0.2;
        for group in &data.plots {
            flowables.push(Flowable::Spacer(10.0));
            flowables.push(Flowable::Chart(ChartBlock::new(group, chart_width, chart_height, images)?));
            flowables.push(Flowable::Spacer(5.0));
            flowables.push(Flowable::Rule(0.5));
        }

        if let Some(table) = &data.data_table {
            let widths = match &table.column_ratios {
                Some(ratios) => ColumnWidths::Ratios(ratios.clone()),
                None => ColumnWidths::Equal,
            };
            flowables.push(Flowable::Spacer(10.0));
            flowables.push(Flowable::DataTable {
                table: table.clone(),
                widths,
            });
        }

        Ok(flowables)
    }
}
