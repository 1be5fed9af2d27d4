//! Test types
//!
//! The laboratory runs three kinds of tests, each stored in its own SQLite
//! database with its own table layout.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::error::{CoreError, Result};
use crate::utils::string::StringUtils;

/// Default similarity needed to accept a misspelled test type
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Kind of laboratory test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    /// Oxidation induction time by differential scanning calorimetry
    #[serde(rename = "DSC_OIT")]
    DscOit,

    /// Melt flow index
    #[serde(rename = "MFI")]
    Mfi,

    /// Vicat softening temperature
    #[serde(rename = "VICAT")]
    Vicat,
}

impl TestType {
    /// All test types, in filename-matching order
    pub const ALL: [TestType; 3] = [TestType::DscOit, TestType::Mfi, TestType::Vicat];

    /// Canonical identifier (`DSC_OIT`, `MFI`, `VICAT`)
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::DscOit => "DSC_OIT",
            TestType::Mfi => "MFI",
            TestType::Vicat => "VICAT",
        }
    }

    /// Name used in report titles
    pub fn display_name(&self) -> &'static str {
        match self {
            TestType::DscOit => "DSC-OIT",
            TestType::Mfi => "MFI",
            TestType::Vicat => "VICAT",
        }
    }

    /// Normalized token searched for in database file names
    fn filename_token(&self) -> &'static str {
        match self {
            TestType::DscOit => "dscoit",
            TestType::Mfi => "mfi",
            TestType::Vicat => "vicat",
        }
    }

    /// Whether tests of this type are run per line and need a line number
    pub fn requires_line(&self) -> bool {
        matches!(self, TestType::Vicat)
    }

    /// Infer the test type from a database file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let key = StringUtils::normalize_key(name);

        TestType::ALL
            .iter()
            .copied()
            .find(|t| key.contains(t.filename_token()))
            .ok_or_else(|| CoreError::UnrecognizedTestType(path.display().to_string()))
    }

    /// Parse a user supplied test type, correcting small misspellings.
    ///
    /// The input is trimmed and uppercased; if it is not an exact canonical
    /// name the closest one is accepted when its normalized Levenshtein
    /// similarity reaches `threshold`.
    pub fn parse_fuzzy(input: &str, threshold: f64) -> Result<Self> {
        let candidate = input.trim().to_uppercase();

        if let Some(t) = TestType::ALL.iter().find(|t| t.as_str() == candidate) {
            return Ok(*t);
        }

        let best = TestType::ALL
            .iter()
            .map(|t| (*t, strsim::normalized_levenshtein(&candidate, t.as_str())))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((t, score)) if score >= threshold => {
                log::debug!("Corrected test type {:?} to {} (similarity {:.2})", input, t, score);
                Ok(t)
            }
            _ => Err(CoreError::UnrecognizedTestType(input.to_string())),
        }
    }
}

impl Display for TestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        TestType::parse_fuzzy(s, DEFAULT_FUZZY_THRESHOLD)
    }
}
