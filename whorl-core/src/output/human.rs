use colored::Colorize;

use super::OutputFormatter;
use crate::bulk::BulkResult;
use crate::colors::CatppuccinExt;
use crate::whois::{RegistrySource, Resolution, ROOT_SERVER};

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.sky().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_white().to_string()
        } else {
            text.to_string()
        }
    }

    fn muted(&self, text: &str) -> String {
        if self.use_colors {
            text.overlay0().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        if self.use_colors {
            format!("\n{}\n{}", text.lavender().bold(), "─".repeat(text.len()).subtext0())
        } else {
            format!("\n{}\n{}", text, "-".repeat(text.len()))
        }
    }

    fn chain(&self, resolution: &Resolution) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push(format!("  {}: {}", self.label("Root"), self.value(ROOT_SERVER)));

        let how = match resolution.registry_source {
            RegistrySource::Referral => self.muted("(referral)"),
            RegistrySource::NicFallback => self.warning("(whois.nic fallback)"),
        };
        lines.push(format!(
            "  {}: {} {}",
            self.label("Registry"),
            self.value(&resolution.registry_server),
            how
        ));

        if let Some(ref registrar) = resolution.registrar_server {
            lines.push(format!(
                "  {}: {}",
                self.label("Registrar"),
                self.value(registrar)
            ));
        }

        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_resolution(&self, resolution: &Resolution) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("WHOIS: {}", resolution.domain)));
        output.extend(self.chain(resolution));
        output.push(String::new());
        // Raw record, untouched
        output.push(resolution.record.trim_end().to_string());

        output.join("\n")
    }

    fn format_bulk(&self, results: &[BulkResult]) -> String {
        let succeeded = results.iter().filter(|r| r.success).count();
        let mut output = Vec::new();

        output.push(self.header(&format!(
            "Bulk WHOIS: {}/{} resolved",
            succeeded,
            results.len()
        )));

        for result in results {
            match (&result.data, &result.error) {
                (Some(resolution), _) => {
                    let servers = match resolution.registrar_server {
                        Some(ref registrar) => {
                            format!("{} → {}", resolution.registry_server, registrar)
                        }
                        None => resolution.registry_server.clone(),
                    };
                    output.push(format!(
                        "  {} {} {} {}",
                        self.success("✓"),
                        self.value(&result.domain),
                        self.muted(&servers),
                        self.muted(&format!("({} ms)", result.duration_ms))
                    ));
                }
                (None, error) => {
                    output.push(format!(
                        "  {} {} {}",
                        self.error("✗"),
                        self.value(&result.domain),
                        self.error(error.as_deref().unwrap_or("unknown error"))
                    ));
                }
            }
        }

        output.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thin_resolution() -> Resolution {
        Resolution {
            domain: "example.com".to_string(),
            registry_server: "whois.verisign-grs.com".to_string(),
            registry_source: RegistrySource::Referral,
            registrar_server: Some("whois.registrar.net".to_string()),
            record: "Domain Name: EXAMPLE.COM\nRegistrar: Example\n".to_string(),
        }
    }

    #[test]
    fn test_format_resolution_plain() {
        let formatter = HumanFormatter::new().without_colors();
        let output = formatter.format_resolution(&thin_resolution());

        assert!(output.contains("WHOIS: example.com"));
        assert!(output.contains("Root: whois.iana.org"));
        assert!(output.contains("Registry: whois.verisign-grs.com (referral)"));
        assert!(output.contains("Registrar: whois.registrar.net"));
        assert!(output.ends_with("Domain Name: EXAMPLE.COM\nRegistrar: Example"));
    }

    #[test]
    fn test_format_resolution_marks_fallback() {
        let formatter = HumanFormatter::new().without_colors();
        let resolution = Resolution {
            registry_server: "whois.nic.org".to_string(),
            registry_source: RegistrySource::NicFallback,
            registrar_server: None,
            ..thin_resolution()
        };

        let output = formatter.format_resolution(&resolution);
        assert!(output.contains("whois.nic.org (whois.nic fallback)"));
        assert!(!output.contains("Registrar: whois"));
    }

    #[test]
    fn test_format_bulk_plain() {
        let formatter = HumanFormatter::new().without_colors();
        let results = vec![
            BulkResult {
                domain: "example.com".to_string(),
                success: true,
                data: Some(thin_resolution()),
                error: None,
                duration_ms: 12,
            },
            BulkResult {
                domain: "example.zz".to_string(),
                success: false,
                data: None,
                error: Some("WHOIS server for example.zz not found".to_string()),
                duration_ms: 3,
            },
        ];

        let output = formatter.format_bulk(&results);
        assert!(output.contains("1/2 resolved"));
        assert!(output.contains("✓ example.com whois.verisign-grs.com → whois.registrar.net (12 ms)"));
        assert!(output.contains("✗ example.zz WHOIS server for example.zz not found"));
    }
}
