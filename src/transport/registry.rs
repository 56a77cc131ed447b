//! Transport registry.
//!
//! Maps type tags used by `def_transport` to implementations.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{SockJsTransport, Transport, WsTransport};

// ============================================================================
// TransportRegistry
// ============================================================================

/// Type tag → transport implementation.
///
/// # Example
///
/// ```ignore
/// let mut registry = TransportRegistry::with_defaults();
/// registry.register("xhr_streaming", Arc::new(MyXhrTransport::new()));
/// assert!(registry.resolve("ws").is_some());
/// ```
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: FxHashMap<String, Arc<dyn Transport>>,
}

impl TransportRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in `ws` and `sockjs` transports.
    ///
    /// Other transport types (`xhr_streaming`, `xhr_polling` and the like)
    /// are not built in and must be added with [`register`](Self::register).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(WsTransport::KIND, Arc::new(WsTransport::new()));
        registry.register(SockJsTransport::KIND, Arc::new(SockJsTransport::new()));
        registry
    }

    /// Registers `transport` under `kind`, replacing any previous entry.
    pub fn register(&mut self, kind: impl Into<String>, transport: Arc<dyn Transport>) {
        let kind = kind.into();
        debug!(kind = %kind, "Transport registered");
        self.transports.insert(kind, transport);
    }

    /// Looks up the implementation for `kind`.
    #[inline]
    #[must_use]
    pub fn resolve(&self, kind: &str) -> Option<Arc<dyn Transport>> {
        self.transports.get(kind).cloned()
    }

    /// Returns `true` if `kind` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.transports.contains_key(kind)
    }

    /// Returns the registered type tags.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.transports.keys().map(String::as_str)
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("TransportRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
