//! Build environment.
//!
//! Name bindings for a single build, plus the table of transport
//! definitions seen so far.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::strategy::{Strategy, TransportTable};

use super::value::Value;

// ============================================================================
// Environment
// ============================================================================

/// Bindings scoped to one build call.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: FxHashMap<String, Value>,
    transports: TransportTable,
}

impl Environment {
    /// Creates an empty environment.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any earlier binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(previous) = self.bindings.insert(name.clone(), value) {
            debug!(name = %name, previous = previous.type_name(), "Binding redefined");
        }
    }

    /// Binds a transport definition's strategy and records it in the
    /// transport table.
    pub fn bind_transport(&mut self, name: impl Into<String>, strategy: Arc<Strategy>) {
        let name = name.into();
        self.transports.insert(name.clone(), Arc::clone(&strategy));
        self.bind(name, Value::Strategy(strategy));
    }

    /// Looks up `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedSymbol`] if `name` is unbound.
    pub fn lookup(&self, name: &str) -> Result<&Value> {
        self.bindings
            .get(name)
            .ok_or_else(|| Error::unresolved_symbol(name))
    }

    /// Returns `true` if `name` is bound.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Removes and returns the binding for `name`.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    /// Snapshot of the transport definitions bound so far.
    #[must_use]
    pub fn transports(&self) -> Arc<TransportTable> {
        Arc::new(self.transports.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{MockTransport, transport_node};

    #[test]
    fn test_lookup_unbound_fails() {
        let env = Environment::new();
        let err = env.lookup("nope").unwrap_err();
        assert_eq!(err.to_string(), "Undefined symbol :nope");
    }

    #[test]
    fn test_last_write_wins() {
        let mut env = Environment::new();
        env.bind("x", Value::Bool(true));
        env.bind("x", Value::Bool(false));
        assert!(matches!(env.lookup("x"), Ok(Value::Bool(false))));
    }

    #[test]
    fn test_transport_table_snapshot() {
        let mock = MockTransport::connecting("ws");
        let mut env = Environment::new();
        env.bind_transport("ws", transport_node("ws", 1, &mock));

        let snapshot = env.transports();
        env.bind_transport("wss", transport_node("wss", 1, &mock));

        assert!(snapshot.contains_key("ws"));
        assert!(!snapshot.contains_key("wss"));
        assert!(env.contains("wss"));
    }
}
