//! DOI parsing and lookup errors

use thiserror::Error;

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi.org/",
    "doi:",
];

/// DOI lookup errors
#[derive(Debug, Error)]
pub enum DoiError {
    #[error("DOI parameter is required")]
    Missing,

    #[error("Invalid DOI format: {0}")]
    InvalidFormat(String),

    #[error("DOI not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Strip resolver prefixes and validate the `10.<registrant>/<suffix>` shape
///
/// DOIs are case-insensitive; the result is lowercased so stored values compare equal.
pub fn normalize_doi(raw: &str) -> Result<String, DoiError> {
    let mut doi = raw.trim();
    if doi.is_empty() {
        return Err(DoiError::Missing);
    }

    for prefix in DOI_PREFIXES {
        if doi
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            doi = doi[prefix.len()..].trim_start();
            break;
        }
    }

    let valid = doi
        .split_once('/')
        .map(|(registrant, suffix)| {
            registrant.starts_with("10.") && registrant.len() > 3 && !suffix.trim().is_empty()
        })
        .unwrap_or(false);

    if !valid || doi.chars().any(char::is_whitespace) {
        return Err(DoiError::InvalidFormat(raw.trim().to_string()));
    }

    Ok(doi.to_lowercase())
}

/// DOI escaped for use inside a URL path; `/` between segments stays literal
pub fn encode_doi(doi: &str) -> String {
    doi.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_doi() {
        assert_eq!(normalize_doi(" 10.1000/XYZ123 ").unwrap(), "10.1000/xyz123");
    }

    #[test]
    fn test_normalize_strips_resolver_prefixes() {
        assert_eq!(
            normalize_doi("https://doi.org/10.1145/3368089.3409741").unwrap(),
            "10.1145/3368089.3409741"
        );
        assert_eq!(
            normalize_doi("HTTP://DX.DOI.ORG/10.1038/nature14539").unwrap(),
            "10.1038/nature14539"
        );
        assert_eq!(normalize_doi("doi: 10.1000/abc").unwrap(), "10.1000/abc");
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(matches!(normalize_doi("   "), Err(DoiError::Missing)));
        assert!(matches!(normalize_doi("not-a-doi"), Err(DoiError::InvalidFormat(_))));
        assert!(matches!(normalize_doi("10./abc"), Err(DoiError::InvalidFormat(_))));
        assert!(matches!(normalize_doi("10.1000/"), Err(DoiError::InvalidFormat(_))));
        assert!(matches!(normalize_doi("11.1000/abc"), Err(DoiError::InvalidFormat(_))));
        assert!(matches!(normalize_doi("10.1000/a b"), Err(DoiError::InvalidFormat(_))));
    }

    #[test]
    fn test_encode_keeps_slashes() {
        assert_eq!(
            encode_doi("10.1002/(sici)1097#x?y"),
            "10.1002/%28sici%291097%23x%3Fy"
        );
        assert_eq!(encode_doi("10.1000/a/b"), "10.1000/a/b");
    }
}
