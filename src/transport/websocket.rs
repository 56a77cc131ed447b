//! Plain WebSocket transport.
//!
//! Connects to `ws[s]://{host}/app/{key}?protocol=7` with
//! `tokio-tungstenite`. `wss` endpoints need the crate's `tls` feature; without
//! it the transport reports itself unsupported for encrypted connections.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use crate::error::Result;

use super::{OpenRequest, Socket, Transport, endpoint};

// ============================================================================
// Types
// ============================================================================

/// Client WebSocket stream.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// WsTransport
// ============================================================================

/// Plain WebSocket transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsTransport;

impl WsTransport {
    /// Registry type tag.
    pub const KIND: &'static str = "ws";

    /// Creates the transport.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn is_supported(&self, encrypted: bool) -> bool {
        !encrypted || cfg!(feature = "tls")
    }

    async fn open(&self, request: OpenRequest) -> Result<Box<dyn Socket>> {
        let url = endpoint::ws_url(&request, &endpoint::app_path(&request))?;
        debug!(transport = %request.name, %url, "Opening WebSocket");

        let (stream, response) = connect_async(url.as_str()).await?;
        debug!(transport = %request.name, status = %response.status(), "WebSocket connected");

        Ok(Box::new(WsSocket { stream, url }))
    }
}

// ============================================================================
// WsSocket
// ============================================================================

/// Connected WebSocket.
pub struct WsSocket {
    stream: WsStream,
    url: Url,
}

impl WsSocket {
    /// Returns the URL the socket connected to.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Consumes the socket, returning the underlying stream.
    #[inline]
    #[must_use]
    pub fn into_stream(self) -> WsStream {
        self.stream
    }
}

impl fmt::Debug for WsSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsSocket")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl Socket for WsSocket {
    fn kind(&self) -> &str {
        WsTransport::KIND
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
