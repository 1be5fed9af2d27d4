//! String utility functions
//!
//! Helpers for comparing table and column names that follow no single
//! naming convention (`TestAna`, `Test_Ana`, `test-ana`, `Sıcaklık`, ...).

/// String utility functions
#[derive(Debug)]
pub struct StringUtils;

impl StringUtils {
    /// Fold the Turkish letters that have no ASCII case pair onto their
    /// closest ASCII letter.
    pub fn fold_turkish(c: char) -> char {
        match c {
            'ı' | 'İ' => 'i',
            'ş' | 'Ş' => 's',
            'ğ' | 'Ğ' => 'g',
            'ü' | 'Ü' => 'u',
            'ö' | 'Ö' => 'o',
            'ç' | 'Ç' => 'c',
            other => other,
        }
    }

    /// Normalize a name into a comparison key.
    ///
    /// Underscores, hyphens, punctuation and whitespace are removed, Turkish
    /// letters are folded and the result is lowercased, so `Test_Ana`,
    /// `test-ana` and `TestAna` all become `testana`.
    pub fn normalize_key(s: &str) -> String {
        s.chars()
            .filter(|c| c.is_alphanumeric())
            .map(Self::fold_turkish)
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Check whether the normalized form of `haystack` contains the
    /// normalized form of `token`.
    pub fn contains_token(haystack: &str, token: &str) -> bool {
        let token = Self::normalize_key(token);
        !token.is_empty() && Self::normalize_key(haystack).contains(&token)
    }

    /// Turn a raw column name into a display header.
    ///
    /// Underscores become spaces and a space is inserted wherever a lowercase
    /// letter is directly followed by an uppercase one:
    /// `TestBaslamaZamani` becomes `Test Baslama Zamani`.
    pub fn format_column_name(s: &str) -> String {
        let mut result = String::with_capacity(s.len() + 4);
        let mut prev: Option<char> = None;

        for c in s.chars() {
            let c = if c == '_' { ' ' } else { c };
            if let Some(p) = prev {
                if p.is_lowercase() && c.is_uppercase() {
                    result.push(' ');
                }
            }
            result.push(c);
            prev = Some(c);
        }

        result
    }

    /// Extension of a path-like string including the leading dot, lowercased.
    pub fn extension_of(path: &str) -> Option<String> {
        std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(StringUtils::normalize_key("Test_Ana"), "testana");
        assert_eq!(StringUtils::normalize_key("test-ana "), "testana");
        assert_eq!(StringUtils::normalize_key("Test Detay"), "testdetay");
        assert_eq!(StringUtils::normalize_key("Sıcaklık"), "sicaklik");
        assert_eq!(StringUtils::normalize_key("DSC-OIT ornek.db"), "dscoitornekdb");
        assert_eq!(StringUtils::normalize_key(""), "");
    }

    #[test]
    fn test_contains_token() {
        assert!(StringUtils::contains_token("Detay_TestId", "TestId"));
        assert!(StringUtils::contains_token("Test Id", "testid"));
        assert!(StringUtils::contains_token("Hat_Num", "Hat"));
        assert!(!StringUtils::contains_token("Numune", "Hat"));
        assert!(!StringUtils::contains_token("anything", ""));
    }

    #[test]
    fn test_format_column_name() {
        assert_eq!(StringUtils::format_column_name("TestBaslamaZamani"), "Test Baslama Zamani");
        assert_eq!(StringUtils::format_column_name("Detay_TestId"), "Detay Test Id");
        assert_eq!(StringUtils::format_column_name("hat_num"), "hat num");
        assert_eq!(StringUtils::format_column_name("MVR"), "MVR");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(StringUtils::extension_of("MFI.db").as_deref(), Some(".db"));
        assert_eq!(StringUtils::extension_of("report.PDF").as_deref(), Some(".pdf"));
        assert_eq!(StringUtils::extension_of("noext"), None);
    }
}
