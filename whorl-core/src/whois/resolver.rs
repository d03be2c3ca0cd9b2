use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::extract::{find_server, find_tld};
use super::servers::{is_thin_registry, nic_probe, nic_server, ROOT_SERVER};
use super::transport::{TcpTransport, Transport};
use crate::error::{Result, WhorlError};
use crate::validation::{tld_label, validate_query};

/// How the registry server was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrySource {
    /// Named by a referral line in the root response.
    Referral,
    /// Guessed as `whois.nic.<tld>` and accepted after a successful probe.
    NicFallback,
}

/// Result of a resolution: the assembled record plus the servers it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub domain: String,
    pub registry_server: String,
    pub registry_source: RegistrySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar_server: Option<String>,
    /// Registry record, followed directly by the registrar record when one was fetched.
    pub record: String,
}

/// Referral chain states. Errors leave the loop through `?`.
#[derive(Debug)]
enum Step {
    RootLookup,
    RegistryLookup {
        server: String,
        source: RegistrySource,
    },
    RegistrarLookup {
        registry_server: String,
        source: RegistrySource,
        registry_record: String,
    },
    Done(Resolution),
}

/// Follows the IANA referral chain: root, then registry, then (for the thin
/// registry only) the registrar.
///
/// Every query of a resolution is issued sequentially. The resolver holds no
/// per-resolution state, so one instance can serve concurrent resolutions.
#[derive(Debug, Clone)]
pub struct Resolver<T = TcpTransport> {
    transport: T,
}

impl Default for Resolver<TcpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver<TcpTransport> {
    pub fn new() -> Self {
        Self {
            transport: TcpTransport::new(),
        }
    }
}

impl<T: Transport> Resolver<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves `domain` and returns the assembled WHOIS text.
    pub async fn resolve(&self, domain: &str) -> Result<String> {
        self.resolve_traced(domain).await.map(|r| r.record)
    }

    /// Resolves `domain`, also reporting which servers were used.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn resolve_traced(&self, domain: &str) -> Result<Resolution> {
        let domain = validate_query(domain)?;

        let mut step = Step::RootLookup;
        loop {
            step = match step {
                Step::RootLookup => {
                    let (server, source) = self.registry_server(domain).await?;
                    debug!(server = %server, ?source, "Registry server resolved");
                    Step::RegistryLookup { server, source }
                }

                Step::RegistryLookup { server, source } => {
                    let registry_record = self.transport.query(&server, domain).await?;

                    if is_thin_registry(&server) {
                        debug!(server = %server, "Thin registry, looking for registrar referral");
                        Step::RegistrarLookup {
                            registry_server: server,
                            source,
                            registry_record,
                        }
                    } else {
                        Step::Done(Resolution {
                            domain: domain.to_string(),
                            registry_server: server,
                            registry_source: source,
                            registrar_server: None,
                            record: registry_record,
                        })
                    }
                }

                Step::RegistrarLookup {
                    registry_server,
                    source,
                    registry_record,
                } => match registrar_referral(&registry_server, &registry_record) {
                    None => {
                        debug!("No registrar referral in registry record");
                        Step::Done(Resolution {
                            domain: domain.to_string(),
                            registry_server,
                            registry_source: source,
                            registrar_server: None,
                            record: registry_record,
                        })
                    }
                    Some(registrar) => {
                        let registrar_record = self.transport.query(&registrar, domain).await?;

                        let mut record = registry_record;
                        record.push_str(&registrar_record);

                        Step::Done(Resolution {
                            domain: domain.to_string(),
                            registry_server,
                            registry_source: source,
                            registrar_server: Some(registrar),
                            record,
                        })
                    }
                },

                Step::Done(resolution) => return Ok(resolution),
            };
        }
    }

    /// Synchronous wrapper around [`Resolver::resolve`] for callers without a
    /// runtime. Must not be called from within an async context.
    pub fn resolve_blocking(&self, domain: &str) -> Result<String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WhorlError::Runtime)?;

        runtime.block_on(self.resolve(domain))
    }

    /// Asks the root server and, failing a referral, bootstraps `whois.nic.<tld>`.
    async fn registry_server(&self, domain: &str) -> Result<(String, RegistrySource)> {
        let root_record = self.transport.query(ROOT_SERVER, domain).await?;

        if let Some(server) = find_server(&root_record) {
            return Ok((server, RegistrySource::Referral));
        }

        let tld = find_tld(&root_record)
            .and_then(|token| tld_label(&token))
            .ok_or_else(|| WhorlError::ServerNotFound(domain.to_string()))?;

        let candidate = nic_server(&tld);
        let probe = nic_probe(&tld);
        debug!(candidate = %candidate, probe = %probe, "No referral from root, probing NIC server");

        // Only reachability matters; the probe response is not inspected.
        match self.transport.query(&candidate, &probe).await {
            Ok(_) => Ok((candidate, RegistrySource::NicFallback)),
            Err(e) => {
                warn!(candidate = %candidate, error = %e, "NIC server probe failed");
                Err(WhorlError::ServerNotFound(domain.to_string()))
            }
        }
    }
}

/// Registrar referral from a thin-registry record. A referral back to the
/// registry itself counts as none.
fn registrar_referral(registry_server: &str, registry_record: &str) -> Option<String> {
    find_server(registry_record).filter(|server| !server.eq_ignore_ascii_case(registry_server))
}
