//! Header info file
//!
//! The header band of every report shows a few lines of laboratory contact
//! details read from a plain text file:
//!
//! ```text
//! Alarge Test Laboratuvari
//! Adres: Organize Sanayi Bolgesi
//! Tel: +90 000 000 00 00
//! ```
//!
//! The first line is a caption. Each later line is split at its first colon
//! into a label (which keeps the colon) and a value; lines without a colon
//! become extra captions.

use std::fs;
use std::path::Path;
use log::{debug, warn};

/// Parsed header info
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Caption lines, in file order
    pub captions: Vec<String>,

    /// Label/value pairs, in file order
    pub pairs: Vec<(String, String)>,
}

impl HeaderInfo {
    /// Parse header info text
    pub fn parse(text: &str) -> Self {
        let mut info = HeaderInfo::default();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if i == 0 {
                info.captions.push(line.to_string());
                continue;
            }
            if line.is_empty() {
                continue;
            }

            match line.split_once(':') {
                Some((label, value)) => info
                    .pairs
                    .push((format!("{}:", label), value.to_string())),
                None => info.captions.push(line.to_string()),
            }
        }

        info
    }

    /// Load header info from `path`; a missing or unreadable file gives an
    /// empty header
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!("Loaded header info from {}", path.display());
                Self::parse(&text)
            }
            Err(e) => {
                warn!("Header info file {} unavailable: {}", path.display(), e);
                HeaderInfo::default()
            }
        }
    }

    /// Whether there is nothing to print
    pub fn is_empty(&self) -> bool {
        self.captions.iter().all(|c| c.is_empty()) && self.pairs.is_empty()
    }

    /// Pairs grouped two per row; an odd last pair stands alone
    pub fn pair_rows(&self) -> Vec<&[(String, String)]> {
        self.pairs.chunks(2).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse() {
        let info = HeaderInfo::parse(
            "Alarge Test Lab\nAdres: OSB 3. Cadde\n\nTel: +90 212 000\nISO 17025\nWeb: http://example.com\n",
        );
        assert_eq!(info.captions, vec!["Alarge Test Lab", "ISO 17025"]);
        assert_eq!(info.pairs.len(), 3);
        assert_eq!(info.pairs[0], ("Adres:".to_string(), " OSB 3. Cadde".to_string()));
        // split on the first colon only
        assert_eq!(info.pairs[2], ("Web:".to_string(), " http://example.com".to_string()));

        let rows = info.pair_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn test_first_line_is_caption_even_with_colon() {
        let info = HeaderInfo::parse("Lab: Main\nTel: 1");
        assert_eq!(info.captions, vec!["Lab: Main"]);
        assert_eq!(info.pairs.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let info = HeaderInfo::load(&dir.path().join("headerInfo.txt"));
        assert!(info.is_empty());
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("headerInfo.txt");
        fs::write(&path, "Caption\nA: 1\nB: 2\n").unwrap();
        let info = HeaderInfo::load(&path);
        assert_eq!(info.captions, vec!["Caption"]);
        assert_eq!(info.pair_rows().len(), 1);
    }
}
