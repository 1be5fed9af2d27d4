//! Lab Test PDF Reports
//!
//! This crate lays out multi-page PDF reports for lab tests: a cover page,
//! the test's info table and its charts or measurement table, with running
//! headers and "Page X of Y" footers.

// Error types and result
pub mod error;
pub use error::{ReportError, Result};

// Report assembly
pub mod assembler;
pub use assembler::{ReportAssembler, ReportRequest};

// Page layout
pub mod layout;
pub use layout::{calculate_table_col_widths, ColumnWidths, DrawOp, Flowable, Page, PageGeometry};

// PDF serialization
pub mod writer;
pub use writer::{Decorations, PdfWriter};

// Charts
pub mod chart;
pub use chart::{export_png, ChartBlock};

// Header info file
pub mod header;
pub use header::HeaderInfo;

// Images and text
pub mod raster;
pub mod text;
pub use raster::{ImageId, ImageStore, Raster};
