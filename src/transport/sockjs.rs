//! SockJS transport over the raw WebSocket endpoint.
//!
//! Session URL format:
//!
//! ```text
//! ws[s]://{host}{httpPath}/{server}/{session}/websocket
//! ```
//!
//! The server answers with the open frame `o`; the client then sends the
//! application path wrapped in a SockJS message array.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::websocket::WsStream;
use super::{OpenRequest, Socket, Transport, endpoint};

// ============================================================================
// Constants
// ============================================================================

/// Time allowed for the server to send its open frame.
const OPEN_FRAME_TIMEOUT: Duration = Duration::from_secs(10);

/// SockJS open frame.
const OPEN_FRAME: &str = "o";

// ============================================================================
// SockJsTransport
// ============================================================================

/// SockJS transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct SockJsTransport;

impl SockJsTransport {
    /// Registry type tag.
    pub const KIND: &'static str = "sockjs";

    /// Creates the transport.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the session URL for a fresh server/session pair.
    fn session_url(request: &OpenRequest) -> Result<(Url, String)> {
        let session = Uuid::new_v4();
        let server = session.as_u128() % 1000;
        let session = session.simple().to_string();
        let path = format!(
            "{}/{server:03}/{session}/websocket",
            endpoint::http_path(request).trim_end_matches('/')
        );

        Ok((endpoint::ws_url(request, &path)?, session))
    }

    /// Waits for the open frame.
    async fn await_open_frame(stream: &mut WsStream) -> Result<()> {
        let frame = timeout(OPEN_FRAME_TIMEOUT, stream.next())
            .await
            .map_err(|_| Error::connection_timeout(OPEN_FRAME_TIMEOUT.as_millis() as u64))?;

        match frame {
            Some(Ok(Message::Text(text))) if text.as_str() == OPEN_FRAME => Ok(()),
            Some(Ok(Message::Text(text))) => Err(Error::connection(format!(
                "SockJS handshake rejected: {}",
                text.as_str()
            ))),
            Some(Ok(other)) => Err(Error::connection(format!(
                "unexpected SockJS frame: {other:?}"
            ))),
            Some(Err(e)) => Err(e.into()),
            None => Err(Error::connection("SockJS stream closed before open frame")),
        }
    }
}

#[async_trait]
impl Transport for SockJsTransport {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn is_supported(&self, encrypted: bool) -> bool {
        !encrypted || cfg!(feature = "tls")
    }

    async fn open(&self, request: OpenRequest) -> Result<Box<dyn Socket>> {
        let (url, session) = Self::session_url(&request)?;
        debug!(transport = %request.name, %url, "Opening SockJS session");

        let (mut stream, _) = connect_async(url.as_str()).await?;
        Self::await_open_frame(&mut stream).await?;
        trace!(transport = %request.name, %session, "SockJS open frame received");

        let hello = json!({ "path": endpoint::app_path(&request) }).to_string();
        let frame = serde_json::to_string(&[hello])?;
        stream.send(Message::Text(frame.into())).await?;

        debug!(transport = %request.name, %session, "SockJS session established");
        Ok(Box::new(SockJsSocket {
            stream,
            url,
            session,
        }))
    }
}

// ============================================================================
// SockJsSocket
// ============================================================================

/// Connected SockJS session.
pub struct SockJsSocket {
    stream: WsStream,
    url: Url,
    session: String,
}

impl SockJsSocket {
    /// Returns the session URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the SockJS session ID.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Consumes the socket, returning the underlying stream.
    #[inline]
    #[must_use]
    pub fn into_stream(self) -> WsStream {
        self.stream
    }
}

impl fmt::Debug for SockJsSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SockJsSocket")
            .field("url", &self.url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Socket for SockJsSocket {
    fn kind(&self) -> &str {
        SockJsTransport::KIND
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::Value as JsonValue;
    use tokio::net::TcpListener;

    fn request(port: u16) -> OpenRequest {
        OpenRequest {
            name: "sockjs".into(),
            key: Some("key".into()),
            encrypted: false,
            options: json!({ "host": format!("127.0.0.1:{port}") })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_encrypted_needs_tls() {
        let transport = SockJsTransport::new();
        assert!(transport.is_supported(false));
        assert_eq!(transport.is_supported(true), cfg!(feature = "tls"));
    }

    #[test]
    fn test_session_url_shape() {
        let (url, session) = SockJsTransport::session_url(&request(8080)).expect("url");
        let segments: Vec<_> = url.path_segments().expect("segments").collect();

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], "pusher");
        assert_eq!(segments[1].len(), 3);
        assert_eq!(segments[2], session);
        assert_eq!(segments[3], "websocket");
    }

    #[tokio::test]
    async fn test_handshake_sends_path() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
            ws.send(Message::Text(OPEN_FRAME.into())).await.expect("open frame");

            let Some(Ok(Message::Text(text))) = ws.next().await else {
                panic!("expected hello frame");
            };
            let frames: Vec<String> = serde_json::from_str(text.as_str()).expect("array");
            let hello: JsonValue = serde_json::from_str(&frames[0]).expect("hello");
            hello["path"].as_str().map(str::to_string)
        });

        let socket = SockJsTransport::new().open(request(port)).await.expect("open");
        assert_eq!(socket.kind(), "sockjs");

        let path = server.await.expect("server task");
        assert_eq!(path.as_deref(), Some("/app/key?protocol=7"));
    }

    #[tokio::test]
    async fn test_close_frame_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
            let _ = ws
                .send(Message::Text(r#"c[3000,"Go away!"]"#.into()))
                .await;
            let _ = ws.next().await;
        });

        let err = SockJsTransport::new().open(request(port)).await.unwrap_err();
        assert!(err.to_string().contains("SockJS handshake rejected"));
    }
}
