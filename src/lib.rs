/// Lab Report - test data extraction and PDF reports for lab test databases
///
/// This is the root crate that ties the workspace together.
/// The implementation lives in the subcrates:
/// - `labreport-core`: table matching, test lookup and data extraction
/// - `labreport-pdf`: chart rendering and PDF report assembly
/// - `labreport-client`: remote database retrieval and material summaries
pub use labreport_client;
pub use labreport_core;
pub use labreport_pdf;

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_agree() {
        assert_eq!(version(), labreport_core::VERSION);
    }
}
