//! Test support: a scriptable in-memory transport.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Map;

use crate::error::{Error, Result};
use crate::strategy::{Strategy, TransportStrategy};
use crate::transport::{OpenRequest, Socket, Transport, TransportRegistry};

// ============================================================================
// Behavior
// ============================================================================

/// What a [`MockTransport`] does when opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    /// Connect after the given delay.
    Connect(Duration),
    /// Fail after the given delay.
    Fail(Duration),
    /// Never resolve.
    Hang,
}

// ============================================================================
// MockTransport
// ============================================================================

/// Transport whose outcome is scripted and whose opens are counted.
#[derive(Debug)]
pub(crate) struct MockTransport {
    kind: String,
    supported: AtomicBool,
    behavior: Mutex<Behavior>,
    opened: AtomicUsize,
    cancelled: Arc<AtomicUsize>,
    requests: Mutex<Vec<OpenRequest>>,
}

impl MockTransport {
    pub(crate) fn new(kind: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind: kind.to_string(),
            supported: AtomicBool::new(true),
            behavior: Mutex::new(behavior),
            opened: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn connecting(kind: &str) -> Arc<Self> {
        Self::new(kind, Behavior::Connect(Duration::ZERO))
    }

    pub(crate) fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    pub(crate) fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock() = behavior;
    }

    /// Number of `open` calls.
    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of opens dropped before they resolved.
    pub(crate) fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<OpenRequest> {
        self.requests.lock().last().cloned()
    }
}

/// Counts a cancellation when dropped while armed.
struct CancelGuard {
    counter: Arc<AtomicUsize>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn is_supported(&self, _encrypted: bool) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    async fn open(&self, request: OpenRequest) -> Result<Box<dyn Socket>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);

        let mut guard = CancelGuard {
            counter: Arc::clone(&self.cancelled),
            armed: true,
        };
        let behavior = *self.behavior.lock();

        let result: Result<Box<dyn Socket>> = match behavior {
            Behavior::Connect(delay) => {
                tokio::time::sleep(delay).await;
                Ok(Box::new(MockSocket::new(&self.kind)))
            }
            Behavior::Fail(delay) => {
                tokio::time::sleep(delay).await;
                Err(Error::connection(format!("{} refused", self.kind)))
            }
            Behavior::Hang => std::future::pending().await,
        };

        guard.armed = false;
        result
    }
}

// ============================================================================
// MockSocket
// ============================================================================

#[derive(Debug)]
pub(crate) struct MockSocket {
    kind: String,
}

impl MockSocket {
    pub(crate) fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
        }
    }
}

impl Socket for MockSocket {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Registry with connecting mocks for `ws`, `sockjs` and `xhr_streaming`.
pub(crate) fn mock_registry() -> (TransportRegistry, MockSet) {
    let mocks = MockSet {
        ws: MockTransport::connecting("ws"),
        sockjs: MockTransport::connecting("sockjs"),
        xhr_streaming: MockTransport::connecting("xhr_streaming"),
    };

    let mut registry = TransportRegistry::new();
    registry.register("ws", mocks.ws.clone());
    registry.register("sockjs", mocks.sockjs.clone());
    registry.register("xhr_streaming", mocks.xhr_streaming.clone());

    (registry, mocks)
}

/// The mocks behind [`mock_registry`].
pub(crate) struct MockSet {
    pub(crate) ws: Arc<MockTransport>,
    pub(crate) sockjs: Arc<MockTransport>,
    pub(crate) xhr_streaming: Arc<MockTransport>,
}

/// Builds a transport strategy node directly over a mock.
pub(crate) fn transport_node(name: &str, priority: i64, mock: &Arc<MockTransport>) -> Arc<Strategy> {
    Arc::new(Strategy::Transport(TransportStrategy::new(
        name,
        mock.kind(),
        priority,
        mock.clone(),
        Map::new(),
        None,
    )))
}

/// Installs a test subscriber honoring `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
