//! Saved remote credentials
//!
//! Credentials live in a plain text file, one `host,username,password` entry
//! per line. New entries are appended; the file is never rewritten.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use log::{debug, warn};

use crate::error::{ClientError, Result};

/// Login details for one remote host
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Host name or address, optionally with `:port`
    pub host: String,

    /// User name
    pub username: String,

    /// Password
    pub password: String,
}

impl Credential {
    /// Create a credential
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential {
            host: host.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse a `host,username,password` line
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.trim().split(',');
        let host = parts.next()?.trim();
        let username = parts.next()?.trim();
        let password = parts.next()?;
        if parts.next().is_some() || host.is_empty() || username.is_empty() {
            return None;
        }
        Some(Credential::new(host, username, password))
    }

    /// Line representation, rejecting fields that would corrupt the file
    pub fn to_line(&self) -> Result<String> {
        for (name, value) in [("host", &self.host), ("username", &self.username), ("password", &self.password)] {
            if value.contains(',') || value.contains('\n') || value.contains('\r') {
                return Err(ClientError::InvalidCredential(format!("{} contains a separator", name)));
            }
        }
        if self.host.trim().is_empty() || self.username.trim().is_empty() {
            return Err(ClientError::InvalidCredential("host and username are required".to_string()));
        }
        Ok(format!("{},{},{}", self.host, self.username, self.password))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Append-only credential file
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All well-formed entries in file order.
    ///
    /// A missing file holds no entries; malformed lines are skipped.
    pub fn load(&self) -> Result<Vec<Credential>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No credential file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut credentials = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match Credential::parse_line(line) {
                Some(credential) => credentials.push(credential),
                None => warn!("Skipping malformed credential on line {} of {}", i + 1, self.path.display()),
            }
        }
        Ok(credentials)
    }

    /// Append an entry
    pub fn append(&self, credential: &Credential) -> Result<()> {
        let line = credential.to_line()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        debug!("Saved credential for {}", credential.host);
        Ok(())
    }

    /// Hosts of all entries, for selection lists
    pub fn hosts(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_iter().map(|c| c.host).collect())
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Result<Option<Credential>> {
        Ok(self.load()?.into_iter().nth(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_line() {
        let c = Credential::parse_line("192.168.1.10,lab,s3cret\n").unwrap();
        assert_eq!(c.host, "192.168.1.10");
        assert_eq!(c.username, "lab");
        assert_eq!(c.password, "s3cret");

        assert!(Credential::parse_line("host,user").is_none());
        assert!(Credential::parse_line("host,user,pw,extra").is_none());
        assert!(Credential::parse_line(",user,pw").is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let c = Credential::new("h", "u", "topsecret");
        assert!(!format!("{:?}", c).contains("topsecret"));
    }

    #[test]
    fn test_append_and_load() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("saved_user.txt"));
        assert!(store.load().unwrap().is_empty());

        store.append(&Credential::new("10.0.0.1", "a", "1")).unwrap();
        store.append(&Credential::new("10.0.0.2", "b", "2")).unwrap();

        assert_eq!(store.hosts().unwrap(), vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(store.get(1).unwrap().unwrap().username, "b");
        assert!(store.get(2).unwrap().is_none());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved_user.txt");
        fs::write(&path, "a,b,c\nbroken\n\nd,e,f\n").unwrap();
        let hosts = CredentialStore::new(&path).hosts().unwrap();
        assert_eq!(hosts, vec!["a", "d"]);
    }

    #[test]
    fn test_separator_rejected() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("saved_user.txt"));
        let err = store.append(&Credential::new("h", "u", "p,w")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredential(_)));
        assert!(!store.path().exists());
    }
}
