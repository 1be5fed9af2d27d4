//! Client-side tools for the lab report toolkit
//!
//! This library provides the pieces of the toolkit that talk to the outside
//! world: saved remote credentials, retrieval of test databases from lab
//! machines, and export of raw material summaries as text or QR codes.

pub mod credentials;
pub mod error;
pub mod export;
pub mod material;
pub mod remote;

pub use credentials::{Credential, CredentialStore};
pub use error::{ClientError, Result};
pub use material::{Component, MaterialRecord};
pub use remote::{fetch_into_catalog, RemoteFetcher};

#[cfg(feature = "sftp")]
pub use remote::SftpFetcher;
