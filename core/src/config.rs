//! Configuration for the lab report toolkit
//!
//! This module provides configuration options shared by the library crates
//! and the command-line tool: report resources, chart settings, fuzzy
//! matching and client-side files.

use std::path::PathBuf;
use serde::{Serialize, Deserialize};

use crate::error::{to_config_error, CoreError, Result};
use crate::models::DEFAULT_FUZZY_THRESHOLD;
use crate::transform::smoothing::{SmoothingParams, DEFAULT_POLYORDER, DEFAULT_WINDOW};

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory reports are written to
    pub reports_dir: PathBuf,

    /// Directory holding logos and the header info file
    pub resources_dir: PathBuf,

    /// Logo used in the first-page header band and the running header
    pub logo: String,

    /// Large cover logo, also used in the running header
    pub cover_logo: String,

    /// Header info file name
    pub header_info: String,

    /// Title printed above the info table
    pub title: String,

    /// Summary paragraph on the cover page
    pub cover_text: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            reports_dir: PathBuf::from("reports"),
            resources_dir: PathBuf::from("resources"),
            logo: "logo.png".to_string(),
            cover_logo: "logo2.png".to_string(),
            header_info: "headerInfo.txt".to_string(),
            title: "ALARGE TEST RAPORU".to_string(),
            cover_text: "PLACEHOLDER PARAGRAPH".to_string(),
        }
    }
}

impl ReportConfig {
    /// Path of the header band logo
    pub fn logo_path(&self) -> PathBuf {
        self.resources_dir.join(&self.logo)
    }

    /// Path of the cover logo
    pub fn cover_logo_path(&self) -> PathBuf {
        self.resources_dir.join(&self.cover_logo)
    }

    /// Path of the header info file
    pub fn header_info_path(&self) -> PathBuf {
        self.resources_dir.join(&self.header_info)
    }
}

/// Chart configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Savitzky-Golay window length
    pub smoothing_window: usize,

    /// Savitzky-Golay polynomial order
    pub smoothing_polyorder: usize,

    /// Width of exported chart images in pixels
    pub plot_width: u32,

    /// Height of exported chart images in pixels
    pub plot_height: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            smoothing_window: DEFAULT_WINDOW,
            smoothing_polyorder: DEFAULT_POLYORDER,
            plot_width: 800,
            plot_height: 600,
        }
    }
}

impl VisualizationConfig {
    /// Smoothing parameters
    pub fn smoothing(&self) -> SmoothingParams {
        SmoothingParams {
            window: self.smoothing_window,
            polyorder: self.smoothing_polyorder,
        }
    }
}

/// Matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Similarity needed to accept a misspelled test type, 0.0 to 1.0
    pub fuzzy_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Saved remote credentials
    pub credentials_file: PathBuf,

    /// Directory scanned for databases and receiving fetched files
    pub databases_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            credentials_file: PathBuf::from("saved_user.txt"),
            databases_dir: PathBuf::from("databases"),
        }
    }
}

/// Toolkit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Report configuration
    pub report: ReportConfig,

    /// Chart configuration
    pub visualization: VisualizationConfig,

    /// Matching configuration
    pub matching: MatchingConfig,

    /// Client configuration
    pub client: ClientConfig,

    /// Log level
    pub log_level: String,
}

impl Default for LabConfig {
    fn default() -> Self {
        LabConfig {
            report: ReportConfig::default(),
            visualization: VisualizationConfig::default(),
            matching: MatchingConfig::default(),
            client: ClientConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl LabConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(CoreError::IoError)?;
        let config: LabConfig = serde_json::from_reader(file).map_err(CoreError::JsonError)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path).map_err(CoreError::IoError)?;
        serde_json::to_writer_pretty(file, self).map_err(CoreError::JsonError)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let threshold = self.matching.fuzzy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(to_config_error(format!(
                "fuzzy_threshold must be within 0.0..=1.0, got {}",
                threshold
            )));
        }
        if self.visualization.smoothing_window < 3 {
            return Err(to_config_error("smoothing_window must be at least 3"));
        }
        if self.visualization.plot_width == 0 || self.visualization.plot_height == 0 {
            return Err(to_config_error("plot size must be non-zero"));
        }
        Ok(())
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.log_level = "debug".to_string();
        config
    }

    /// Create a production configuration
    pub fn production() -> Self {
        let mut config = Self::default();
        config.log_level = "warn".to_string();
        config
    }

    /// Create a testing configuration
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.log_level = "debug".to_string();
        config.visualization.plot_width = 320;
        config.visualization.plot_height = 240;
        config
    }
}
