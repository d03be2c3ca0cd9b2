//! WHOIS resolution by following the IANA referral chain.
//!
//! The root server names the registry for a TLD. Thick registries hold the
//! whole record; the thin `.com`/`.net` registry is followed by one more hop
//! to the registrar, and both records are returned back to back.
//!
//! ```no_run
//! # async fn run() -> whorl_core::Result<()> {
//! let resolver = whorl_core::Resolver::new();
//! let record = resolver.resolve("example.com").await?;
//! println!("{}", record);
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod colors;
pub mod error;
pub mod output;
pub mod validation;
pub mod whois;

pub use error::{Result, WhorlError};
pub use validation::validate_query;

pub use whois::{RegistrySource, Resolution, Resolver, TcpTransport, Transport};

pub use bulk::{BulkResolver, BulkResult};
pub use output::{OutputFormat, OutputFormatter};

/// Resolves `domain` over TCP with a fresh default resolver.
pub async fn resolve(domain: &str) -> Result<String> {
    Resolver::new().resolve(domain).await
}
