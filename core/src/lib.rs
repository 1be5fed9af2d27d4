//! # Lab Report Core
//!
//! Test-data extraction for the lab report toolkit. This crate finds test
//! tables inside arbitrary SQLite files, pulls the rows of one test instance
//! and turns them into the datasets reports and charts are drawn from.
//!
//! The flow is [`locator::locate`] → [`pipeline::extract`] →
//! [`pipeline::transform`], with [`matcher::classify`] deciding which table
//! plays which role.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod locator;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod transform;
pub mod utils;

/// Re-export common types for ease of use
pub use catalog::DatabaseCatalog;
pub use config::LabConfig;
pub use database::TestDatabase;
pub use error::{CoreError, Result};
pub use extractor::{RawTables, SkipReason, TableFetch};
pub use filter::RowFilter;
pub use matcher::{classify, TableRole};
pub use models::{LineNumber, RawTable, SelectedRow, TestRecord, TestType, Value};
pub use pipeline::{pipeline_for, TestPipeline, Visualization};
pub use transform::{DataTable, InfoTable, PlotDataset, PlotGroup, TransformedData};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
