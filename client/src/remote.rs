//! Remote database retrieval
//!
//! Test databases usually live on the lab machine that ran the test. A
//! [`RemoteFetcher`] copies one remote file to a local path; the fetched
//! database is then registered in the local catalog.

use std::fs;
use std::path::{Path, PathBuf};
use log::info;

use labreport_core::database::validate_database_path;
use labreport_core::DatabaseCatalog;

use crate::credentials::Credential;
use crate::error::{ClientError, Result};

/// Copies a remote file to the local filesystem
#[cfg_attr(test, mockall::automock)]
pub trait RemoteFetcher {
    /// Fetch `remote_path` from the host of `credential` into `local_path`
    fn fetch(&self, credential: &Credential, remote_path: &str, local_path: &Path) -> Result<()>;
}

/// Last component of a remote path, accepting both `/` and `\` separators
pub fn remote_file_name(remote_path: &str) -> Option<&str> {
    remote_path
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty())
}

/// Fetch a remote database into `databases_dir` and add it to `catalog`
pub fn fetch_into_catalog(
    fetcher: &dyn RemoteFetcher,
    credential: &Credential,
    remote_path: &str,
    databases_dir: &Path,
    catalog: &mut DatabaseCatalog,
) -> Result<PathBuf> {
    let name = remote_file_name(remote_path)
        .ok_or_else(|| ClientError::Remote(format!("no file name in remote path {:?}", remote_path)))?;
    let local_path = databases_dir.join(name);
    validate_database_path(&local_path)?;

    fs::create_dir_all(databases_dir)?;
    fetcher.fetch(credential, remote_path, &local_path)?;
    catalog.add(&local_path)?;

    info!("Fetched {} from {} to {}", remote_path, credential.host, local_path.display());
    Ok(local_path)
}

#[cfg(feature = "sftp")]
pub use sftp::SftpFetcher;

#[cfg(feature = "sftp")]
mod sftp {
    use std::fs::File;
    use std::io;
    use std::net::TcpStream;
    use std::path::Path;
    use log::debug;
    use ssh2::Session;

    use super::RemoteFetcher;
    use crate::credentials::Credential;
    use crate::error::{to_remote_error, Result};

    /// Default SSH port
    pub const DEFAULT_PORT: u16 = 22;

    /// Fetches files over SFTP with password authentication
    #[derive(Debug, Clone)]
    pub struct SftpFetcher {
        port: u16,
    }

    impl SftpFetcher {
        /// Fetcher using the default SSH port
        pub fn new() -> Self {
            SftpFetcher { port: DEFAULT_PORT }
        }

        /// Fetcher using `port` when the host has none
        pub fn with_port(port: u16) -> Self {
            SftpFetcher { port }
        }

        fn address(&self, host: &str) -> String {
            if host.contains(':') {
                host.to_string()
            } else {
                format!("{}:{}", host, self.port)
            }
        }
    }

    impl Default for SftpFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RemoteFetcher for SftpFetcher {
        fn fetch(&self, credential: &Credential, remote_path: &str, local_path: &Path) -> Result<()> {
            let address = self.address(&credential.host);
            debug!("Connecting to {} as {}", address, credential.username);

            let tcp = TcpStream::connect(&address)?;
            let mut session = Session::new().map_err(to_remote_error)?;
            session.set_tcp_stream(tcp);
            session.handshake().map_err(to_remote_error)?;
            session
                .userauth_password(&credential.username, &credential.password)
                .map_err(to_remote_error)?;

            let sftp = session.sftp().map_err(to_remote_error)?;
            let mut remote = sftp.open(Path::new(remote_path)).map_err(to_remote_error)?;
            let mut local = File::create(local_path)?;
            let bytes = io::copy(&mut remote, &mut local)?;

            debug!("Transferred {} bytes from {}", bytes, remote_path);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;
    use tempfile::TempDir;

    #[test]
    fn test_remote_file_name() {
        assert_eq!(remote_file_name(r"C:\Users\lab\Desktop\db\MFI.db"), Some("MFI.db"));
        assert_eq!(remote_file_name("/srv/lab/VICAT.sqlite"), Some("VICAT.sqlite"));
        assert_eq!(remote_file_name("MFI.db"), Some("MFI.db"));
        assert_eq!(remote_file_name("/srv/lab/"), None);
    }

    #[test]
    fn test_fetch_into_catalog() {
        let dir = TempDir::new().unwrap();
        let databases = dir.path().join("databases");
        let credential = Credential::new("10.0.0.5", "lab", "pw");

        let mut fetcher = MockRemoteFetcher::new();
        fetcher
            .expect_fetch()
            .with(always(), eq(r"C:\db\MFI.db"), always())
            .times(1)
            .returning(|_, _, local| {
                fs::write(local, b"SQLite format 3\0")?;
                Ok(())
            });

        let mut catalog = DatabaseCatalog::new();
        let path = fetch_into_catalog(&fetcher, &credential, r"C:\db\MFI.db", &databases, &mut catalog).unwrap();
        assert_eq!(path, databases.join("MFI.db"));
        assert!(path.exists());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_fetch_failure_leaves_catalog_untouched() {
        let dir = TempDir::new().unwrap();
        let credential = Credential::new("10.0.0.5", "lab", "pw");

        let mut fetcher = MockRemoteFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_, _, _| Err(ClientError::Remote("authentication failed".to_string())));

        let mut catalog = DatabaseCatalog::new();
        let err = fetch_into_catalog(&fetcher, &credential, "/srv/MFI.db", dir.path(), &mut catalog).unwrap_err();
        assert!(matches!(err, ClientError::Remote(_)));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_non_database_is_rejected_before_transfer() {
        let dir = TempDir::new().unwrap();
        let credential = Credential::new("10.0.0.5", "lab", "pw");
        let mut fetcher = MockRemoteFetcher::new();
        fetcher.expect_fetch().times(0);

        let mut catalog = DatabaseCatalog::new();
        let err = fetch_into_catalog(&fetcher, &credential, "/srv/notes.txt", dir.path(), &mut catalog).unwrap_err();
        assert!(matches!(err, ClientError::Core(_)));
    }
}
