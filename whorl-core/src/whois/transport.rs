use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::servers::WHOIS_PORT;
use crate::error::{Result, WhorlError};

/// Sends one WHOIS query and returns the complete response text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn query(&self, server: &str, query: &str) -> Result<String>;
}

/// Plain TCP transport: `query\r\n` out, everything up to EOF back.
///
/// There is no timeout here. Callers that need bounded latency wrap the
/// resolution in their own deadline.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    port: u16,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpTransport {
    pub fn new() -> Self {
        Self { port: WHOIS_PORT }
    }

    /// Overrides the destination port, for talking to a local test listener.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn query(&self, server: &str, query: &str) -> Result<String> {
        let mut stream = TcpStream::connect((server, self.port))
            .await
            .map_err(|source| WhorlError::Connection {
                server: server.to_string(),
                source,
            })?;

        // Send query with CRLF
        let request = format!("{}\r\n", query);
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|source| WhorlError::Connection {
                server: server.to_string(),
                source,
            })?;

        // The server signals end of response by closing the connection
        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .await
            .map_err(|source| WhorlError::Read {
                server: server.to_string(),
                source,
            })?;

        debug!(server = %server, bytes = response.len(), "WHOIS response received");

        Ok(decode_response(response))
    }
}

/// UTF-8 when valid, otherwise each byte is taken as a Latin-1 code point.
fn decode_response(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_response("Registrant: Zoë\n".as_bytes().to_vec()), "Registrant: Zoë\n");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "Zoë" in Latin-1
        let bytes = vec![b'Z', b'o', 0xEB];
        assert_eq!(decode_response(bytes), "Zoë");
    }

    #[tokio::test]
    async fn test_query_sends_crlf_and_reads_until_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 64];
            while !request.ends_with(b"\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            // Two writes, to check the client keeps reading until EOF
            socket.write_all(b"Domain Name: EXAMPLE.COM\n").await.unwrap();
            socket.write_all(b"Registrar WHOIS Server: whois.registrar.net\n").await.unwrap();
            request
        });

        let transport = TcpTransport::new().with_port(port);
        let response = transport.query("127.0.0.1", "example.com").await.unwrap();

        assert_eq!(
            response,
            "Domain Name: EXAMPLE.COM\nRegistrar WHOIS Server: whois.registrar.net\n"
        );
        assert_eq!(server.await.unwrap(), b"example.com\r\n");
    }

    #[tokio::test]
    async fn test_query_empty_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let _ = socket.read(&mut buf).await;
            // Closing without writing anything
            drop(socket);
        });

        let transport = TcpTransport::new().with_port(port);
        let response = transport.query("127.0.0.1", "example.com").await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = TcpTransport::new().with_port(port);
        let err = transport.query("127.0.0.1", "example.com").await.unwrap_err();

        match err {
            WhorlError::Connection { server, .. } => assert_eq!(server, "127.0.0.1"),
            other => panic!("Expected Connection error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_port() {
        assert_eq!(TcpTransport::default().port, 43);
    }
}
