use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::whois::{Resolution, Resolver, TcpTransport, Transport};

pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult {
    pub domain: String,
    pub success: bool,
    pub data: Option<Resolution>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Runs independent resolutions side by side.
///
/// Each domain gets its own referral chain; nothing is shared between them
/// except the resolver, which keeps no per-resolution state.
#[derive(Debug, Clone)]
pub struct BulkResolver<T = TcpTransport> {
    concurrency: usize,
    resolver: Resolver<T>,
}

impl Default for BulkResolver<TcpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkResolver<TcpTransport> {
    pub fn new() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            resolver: Resolver::new(),
        }
    }
}

impl<T: Transport> BulkResolver<T> {
    pub fn with_resolver(resolver: Resolver<T>) -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            resolver,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Resolves every domain; results come back in completion order.
    pub async fn execute(
        &self,
        domains: Vec<String>,
        progress: Option<ProgressCallback>,
    ) -> Vec<BulkResult> {
        let total = domains.len();
        let completed = Arc::new(AtomicUsize::new(0));

        debug!(
            total = total,
            concurrency = self.concurrency,
            "Starting bulk resolution"
        );

        stream::iter(domains)
            .map(|domain| {
                let completed = completed.clone();
                let progress = progress.as_ref();
                let resolver = &self.resolver;

                async move {
                    let start = std::time::Instant::now();
                    let result = resolver.resolve_traced(&domain).await;
                    let duration_ms = start.elapsed().as_millis() as u64;

                    let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(progress) = progress {
                        progress(count, total, &domain);
                    }

                    match result {
                        Ok(resolution) => BulkResult {
                            domain,
                            success: true,
                            data: Some(resolution),
                            error: None,
                            duration_ms,
                        },
                        Err(e) => {
                            warn!(domain = %domain, error = %e, "Bulk resolution failed");
                            BulkResult {
                                domain,
                                success: false,
                                data: None,
                                error: Some(e.to_string()),
                                duration_ms,
                            }
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}

pub fn parse_domains_from_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            // Handle CSV format (take first column)
            line.split(',').next().unwrap_or(line).trim().to_string()
        })
        .filter(|domain| domain.contains('.'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, WhorlError};
    use async_trait::async_trait;
    use std::io;
    use std::sync::Mutex;

    /// Refers everything to a thick registry that echoes the query back.
    #[derive(Default)]
    struct EchoTransport {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn query(&self, server: &str, query: &str) -> Result<String> {
            self.calls.lock().unwrap().push(format!("{} {}", server, query));
            if query.ends_with(".invalid") {
                return Err(WhorlError::Connection {
                    server: server.to_string(),
                    source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
                });
            }
            match server {
                "whois.iana.org" => Ok("whois: whois.registry.test\n".to_string()),
                _ => Ok(format!("Domain Name: {}\n", query)),
            }
        }
    }

    #[test]
    fn test_parse_domains_from_file() {
        let content = r#"
# This is a comment
example.com
google.com
  whitespace.com
invalid
csv,format,example.org
"#;

        let domains = parse_domains_from_file(content);
        assert_eq!(domains.len(), 3);
        assert!(domains.contains(&"example.com".to_string()));
        assert!(domains.contains(&"google.com".to_string()));
        assert!(domains.contains(&"whitespace.com".to_string()));
        // "invalid" and "csv" are filtered out because they don't contain a dot
    }

    #[tokio::test]
    async fn test_execute_resolves_each_domain_independently() {
        let bulk = BulkResolver::with_resolver(Resolver::with_transport(EchoTransport::default()))
            .with_concurrency(2);
        let domains = vec![
            "one.test".to_string(),
            "two.test".to_string(),
            "three.test".to_string(),
        ];

        let mut results = bulk.execute(domains, None).await;
        results.sort_by(|a, b| a.domain.cmp(&b.domain));

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.success && r.error.is_none()));
        let one = results.iter().find(|r| r.domain == "one.test").unwrap();
        assert_eq!(one.data.as_ref().unwrap().record, "Domain Name: one.test\n");
        assert_eq!(bulk.resolver.transport().calls.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_execute_reports_failures_and_progress() {
        let bulk = BulkResolver::with_resolver(Resolver::with_transport(EchoTransport::default()));
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let progress: ProgressCallback = Box::new(move |count, total, _domain| {
            assert!(count <= total);
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        let results = bulk
            .execute(
                vec!["ok.test".to_string(), "down.invalid".to_string()],
                Some(progress),
            )
            .await;

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        let failed = results.iter().find(|r| r.domain == "down.invalid").unwrap();
        assert!(!failed.success);
        assert!(failed.data.is_none());
        assert!(failed.error.as_ref().unwrap().contains("whois.iana.org"));
    }

    #[test]
    fn test_concurrency_floor() {
        let bulk = BulkResolver::new().with_concurrency(0);
        assert_eq!(bulk.concurrency, 1);
    }
}
