//! Transport layer.
//!
//! A transport is a concrete connection mechanism. The strategy engine only
//! needs three things from one: a registry entry, a support predicate and an
//! async open operation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   resolve(type)   ┌───────────────────┐
//! │ StrategyBuilder  │──────────────────►│ TransportRegistry │
//! └──────────────────┘                   │  "ws"     → Ws    │
//!                                        │  "sockjs" → SockJs│
//! ┌──────────────────┐   open(request)   └───────────────────┘
//! │ TransportStrategy│──────────────────► Box<dyn Socket>
//! └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `endpoint` | Host and path resolution from transport options |
//! | `registry` | Type tag → implementation map |
//! | `sockjs` | SockJS raw WebSocket endpoint |
//! | `websocket` | Plain WebSocket transport |

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// Endpoint resolution helpers.
pub mod endpoint;

/// Transport registry.
pub mod registry;

/// SockJS transport.
pub mod sockjs;

/// WebSocket transport.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use registry::TransportRegistry;
pub use sockjs::{SockJsSocket, SockJsTransport};
pub use websocket::{WsSocket, WsTransport};

// ============================================================================
// OpenRequest
// ============================================================================

/// Parameters handed to [`Transport::open`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRequest {
    /// Transport definition name (e.g. `"ws"`, `"wss_fallback"`).
    pub name: String,
    /// Application key from build options.
    pub key: Option<String>,
    /// Whether the connection must be encrypted.
    pub encrypted: bool,
    /// Option map from the transport definition.
    pub options: Map<String, JsonValue>,
}

// ============================================================================
// Socket
// ============================================================================

/// An open, connected transport handle.
///
/// Use [`Socket::into_any`] to recover the concrete type, e.g.
/// [`WsSocket`] for the `ws` transport.
pub trait Socket: Send + fmt::Debug + 'static {
    /// Transport type tag that produced this socket.
    fn kind(&self) -> &str;

    /// Converts into `Any` for downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

// ============================================================================
// Transport
// ============================================================================

/// A connection mechanism registered under a type tag.
///
/// `open` must be cancel-safe: dropping the returned future stops all
/// further I/O.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug + 'static {
    /// Registry type tag.
    fn kind(&self) -> &str;

    /// Returns `true` if the transport can run in this environment.
    fn is_supported(&self, encrypted: bool) -> bool;

    /// Opens a connection.
    async fn open(&self, request: OpenRequest) -> Result<Box<dyn Socket>>;
}
