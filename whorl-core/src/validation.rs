//! Query validation applied before any WHOIS traffic is sent.

use crate::error::{Result, WhorlError};

/// Validate a WHOIS query string
///
/// The query is sent to every server in the chain exactly as given, so this
/// only rejects input that cannot be a single protocol line:
/// - empty or whitespace-only input
/// - embedded whitespace (including CR/LF, which would inject extra request lines)
/// - other control characters
///
/// Case is preserved and no IDN conversion is done.
pub fn validate_query(domain: &str) -> Result<&str> {
    if domain.trim().is_empty() {
        return Err(WhorlError::InvalidDomain(domain.to_string()));
    }

    if domain.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(WhorlError::InvalidDomain(domain.escape_debug().to_string()));
    }

    Ok(domain)
}

/// Lowercased final label of a domain-like token, without a trailing root dot.
///
/// `"EXAMPLE.ORG"` and `"org."` both give `"org"`.
pub fn tld_label(token: &str) -> Option<String> {
    let token = token.trim_end_matches('.');
    let label = token.rsplit('.').next()?;
    if label.is_empty() {
        return None;
    }
    Some(label.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("example.com").unwrap(), "example.com");
        // Sent verbatim, no case folding
        assert_eq!(validate_query("EXAMPLE.Com").unwrap(), "EXAMPLE.Com");
        assert_eq!(validate_query("nic.org").unwrap(), "nic.org");

        assert!(validate_query("").is_err());
        assert!(validate_query("   ").is_err());
        assert!(validate_query("example.com\r\nwhois.iana.org").is_err());
        assert!(validate_query("example com").is_err());
        assert!(validate_query("example.com\t").is_err());
        assert!(validate_query("exa\u{0}mple.com").is_err());
    }

    #[test]
    fn test_tld_label() {
        assert_eq!(tld_label("org"), Some("org".to_string()));
        assert_eq!(tld_label("EXAMPLE.ORG"), Some("org".to_string()));
        assert_eq!(tld_label("org."), Some("org".to_string()));
        assert_eq!(tld_label("example.co.uk"), Some("uk".to_string()));
        assert_eq!(tld_label(""), None);
        assert_eq!(tld_label("."), None);
    }
}
