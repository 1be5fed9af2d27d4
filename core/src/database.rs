//! Test database access
//!
//! A [`TestDatabase`] is a read-only SQLite connection scoped to a single
//! operation. The connection is closed when the handle is dropped.

use std::path::{Path, PathBuf};
use log::debug;
use rusqlite::{Connection, OpenFlags};

use crate::error::{to_database_error, CoreError, Result};
use crate::matcher::{classify, TableRole};
use crate::models::{RawTable, Value};
use crate::utils::string::StringUtils;

/// File extensions accepted as test databases
pub const VALID_DATABASE_EXTENSIONS: [&str; 3] = [".sqlite", ".db", ".sql"];

/// Reject paths whose extension is not a database extension
pub fn validate_database_path(path: &Path) -> Result<()> {
    let ext = StringUtils::extension_of(&path.to_string_lossy());
    match ext {
        Some(ext) if VALID_DATABASE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(CoreError::InvalidDatabaseFile {
            path: path.display().to_string(),
            reason: format!("extension must be one of {:?}", VALID_DATABASE_EXTENSIONS),
        }),
    }
}

/// Read-only handle on a test database
#[derive(Debug)]
pub struct TestDatabase {
    /// Path the database was opened from
    path: PathBuf,

    /// SQLite connection
    conn: Connection,
}

impl TestDatabase {
    /// Open a database file read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_database_path(path)?;

        let display = path.display().to_string();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| to_database_error(&display, e))?;

        let db = TestDatabase {
            path: path.to_path_buf(),
            conn,
        };

        // Opening is lazy; touch the schema so non-database files fail here
        db.table_names()?;
        debug!("Opened test database {}", display);
        Ok(db)
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all user tables, in creation order
    pub fn table_names(&self) -> Result<Vec<String>> {
        let path = self.path.display().to_string();
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid")
            .map_err(|e| to_database_error(&path, e))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| to_database_error(&path, e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| to_database_error(&path, e))?;

        Ok(names)
    }

    /// Every table paired with its role
    pub fn classified_tables(&self) -> Result<Vec<(String, TableRole)>> {
        Ok(self
            .table_names()?
            .into_iter()
            .map(|name| {
                let role = classify(&name);
                (name, role)
            })
            .collect())
    }

    /// Read a whole table into memory
    pub fn read_table(&self, name: &str) -> Result<RawTable> {
        self.read_table_raw(name)
            .map_err(|e| to_database_error(&self.path.display().to_string(), format!("{}: {}", name, e)))
    }

    fn read_table_raw(&self, name: &str) -> rusqlite::Result<RawTable> {
        let sql = format!("SELECT * FROM {}", quote_identifier(name));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(Value::from(row.get_ref(i)?));
            }
            rows.push(cells);
        }

        debug!("Read {} rows from table {}", rows.len(), name);
        Ok(RawTable::new(name, columns, rows))
    }
}

/// Quote an SQL identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
