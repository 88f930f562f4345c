//! Hot reload wire protocol.

use std::fmt;
use std::time::Duration;

/// Path of the hot reload WebSocket endpoint.
pub const PATH: &str = "/ws";

/// WebSocket sub-protocol negotiated by client and server.
pub const SUBPROTOCOL: &str = "hot_reload";

/// Close code sent by the client before reloading ("normal closure").
pub const NORMAL_CLOSURE: u16 = 1000;

/// Delay before a dropped connection is retried.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Port the browser uses when the page is reached through a tunnel.
pub const TUNNEL_PORT: u16 = 80;

/// Close reason sent before reloading `resource`.
#[must_use]
pub fn close_reason(resource: &str) -> String {
    format!("Hot reloading {resource}")
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "localhost" | "::1" | "[::1]")
}

fn is_unspecified(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

/// Address of a hot reload endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Endpoint a browser should use for a page served from `bind_host:listen_port`.
    ///
    /// A non-loopback `public_host` means the page is reached through a
    /// tunnel, which forwards plain HTTP on port 80. Without a public host the
    /// bind address is used, with unspecified addresses mapped to loopback.
    #[must_use]
    pub fn for_page(public_host: Option<&str>, bind_host: &str, listen_port: u16) -> Self {
        match public_host {
            Some(host) if !is_loopback(host) => Self::new(host, TUNNEL_PORT),
            Some(host) => Self::new(host, listen_port),
            None if is_unspecified(bind_host) => Self::new("127.0.0.1", listen_port),
            None => Self::new(bind_host, listen_port),
        }
    }

    /// WebSocket URL of the endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!("ws://{}:{}{PATH}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}
