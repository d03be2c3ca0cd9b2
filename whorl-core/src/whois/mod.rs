mod extract;
mod resolver;
mod servers;
mod transport;

pub use extract::{find_server, find_tld, LinePattern};
pub use resolver::{RegistrySource, Resolution, Resolver};
pub use servers::{is_thin_registry, nic_probe, nic_server, ROOT_SERVER, THIN_REGISTRY_SERVER, WHOIS_PORT};
pub use transport::{TcpTransport, Transport};
