use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhorlError {
    #[error("WHOIS connection to {server} failed: {source}")]
    Connection {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WHOIS response from {server} could not be read: {source}")]
    Read {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WHOIS server for {0} not found")]
    ServerNotFound(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl WhorlError {
    /// True for failures raised while talking to a server.
    pub fn is_transport(&self) -> bool {
        matches!(self, WhorlError::Connection { .. } | WhorlError::Read { .. })
    }
}

pub type Result<T> = std::result::Result<T, WhorlError>;
