//! Result of a successful attempt.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::identifiers::ConnectionId;
use crate::transport::Socket;

// ============================================================================
// Connection
// ============================================================================

/// A connected transport handle plus where it came from.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    transport: String,
    kind: String,
    priority: i64,
    latency: Duration,
    socket: Box<dyn Socket>,
}

impl Connection {
    /// Creates a connection record.
    #[must_use]
    pub fn new(
        transport: impl Into<String>,
        priority: i64,
        latency: Duration,
        socket: Box<dyn Socket>,
    ) -> Self {
        Self {
            id: ConnectionId::next(),
            transport: transport.into(),
            kind: socket.kind().to_string(),
            priority,
            latency,
            socket,
        }
    }

    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the transport definition name that connected.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Returns the transport type tag.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the transport definition's priority.
    #[inline]
    #[must_use]
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Returns how long the transport took to open.
    #[inline]
    #[must_use]
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Returns the socket.
    #[inline]
    #[must_use]
    pub fn socket(&self) -> &dyn Socket {
        self.socket.as_ref()
    }

    /// Consumes the connection, returning the socket.
    #[inline]
    #[must_use]
    pub fn into_socket(self) -> Box<dyn Socket> {
        self.socket
    }
}
