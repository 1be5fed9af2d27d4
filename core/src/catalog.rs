//! Database catalog
//!
//! The list of test databases the user is working with. Files are keyed by
//! canonical path so the same database is never listed twice.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info};

use crate::error::{CoreError, Result};
use crate::models::TestType;

/// Known test databases, in the order they were added
#[derive(Debug, Clone, Default)]
pub struct DatabaseCatalog {
    entries: Vec<PathBuf>,
}

impl DatabaseCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a database file.
    ///
    /// Returns `false` when the file is already listed under any path.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let canonical = fs::canonicalize(path.as_ref())?;

        if self.entries.contains(&canonical) {
            debug!("Database {} already listed", canonical.display());
            return Ok(false);
        }

        info!("Added database {}", canonical.display());
        self.entries.push(canonical);
        Ok(true)
    }

    /// Add every `*.db` file directly inside `dir`; returns how many were new
    pub fn add_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CoreError::ConfigError(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "db"))
            .collect();
        files.sort();

        let mut added = 0;
        for file in files {
            if self.add(&file)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Listed databases
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Number of listed databases
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Listed databases whose file name identifies `test_type`
    pub fn of_type(&self, test_type: TestType) -> Vec<&Path> {
        self.entries
            .iter()
            .filter(|p| TestType::from_path(p).map_or(false, |t| t == test_type))
            .map(PathBuf::as_path)
            .collect()
    }
}
