//! Referral extraction from free-text WHOIS records.
//!
//! Registries format their responses loosely, so instead of parsing fields we
//! look for the first physical line shaped like `<...label...>: <hostname>` and
//! take its last whitespace-delimited token.

use once_cell::sync::Lazy;
use regex::Regex;

/// A "first line matching a shape, return last token" scanner.
pub struct LinePattern {
    regex: Regex,
}

impl LinePattern {
    /// Builds a case-insensitive pattern for lines that contain `label`,
    /// then a colon, then end in a hostname-shaped token.
    pub fn for_label(label: &str) -> Self {
        let pattern = format!(r"(?i)^.*{}.*:\s*[a-z0-9\-\.]+\s*$", regex::escape(label));
        let regex = Regex::new(&pattern).expect("escaped label yields a valid pattern");
        Self { regex }
    }

    /// Scans line by line and returns the last token of the first match.
    pub fn last_token<'a>(&self, record: &'a str) -> Option<&'a str> {
        record
            .lines()
            .find(|line| self.regex.is_match(line))
            .and_then(|line| line.split_whitespace().last())
    }
}

static SERVER_LINE: Lazy<LinePattern> = Lazy::new(|| LinePattern::for_label("whois"));
static DOMAIN_LINE: Lazy<LinePattern> = Lazy::new(|| LinePattern::for_label("domain"));

/// Finds a referral to another WHOIS server, e.g. `Registrar WHOIS Server: whois.example.com`.
pub fn find_server(record: &str) -> Option<String> {
    SERVER_LINE.last_token(record).map(str::to_string)
}

/// Finds the registered domain/TLD label, e.g. `domain: ORG`, lowercased.
pub fn find_tld(record: &str) -> Option<String> {
    DOMAIN_LINE.last_token(record).map(str::to_lowercase)
}
