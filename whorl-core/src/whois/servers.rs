/// Well-known WHOIS port.
pub const WHOIS_PORT: u16 = 43;

/// Root of every referral chain.
pub const ROOT_SERVER: &str = "whois.iana.org";

/// Verisign keeps only delegation data for .com/.net and defers the full
/// record to the registrar.
pub const THIN_REGISTRY_SERVER: &str = "whois.verisign-grs.com";

/// Conventional registry server for a TLD, `whois.nic.<tld>`.
pub fn nic_server(tld: &str) -> String {
    format!("whois.nic.{}", tld)
}

/// Probe query sent to a guessed `whois.nic.<tld>` server, `nic.<tld>`.
pub fn nic_probe(tld: &str) -> String {
    format!("nic.{}", tld)
}

pub fn is_thin_registry(server: &str) -> bool {
    server.eq_ignore_ascii_case(THIN_REGISTRY_SERVER)
}
