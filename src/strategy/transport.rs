//! Transport leaf strategy.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::{OpenRequest, Transport};

use super::{ConnectContext, Connection};

// ============================================================================
// TransportStrategy
// ============================================================================

/// Opens a single transport definition. Never retries.
#[derive(Debug, Clone)]
pub struct TransportStrategy {
    name: String,
    kind: String,
    priority: i64,
    transport: Arc<dyn Transport>,
    options: Map<String, JsonValue>,
    key: Option<String>,
}

impl TransportStrategy {
    /// Creates a transport strategy.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        priority: i64,
        transport: Arc<dyn Transport>,
        options: Map<String, JsonValue>,
        key: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            priority,
            transport,
            options,
            key,
        }
    }

    /// Returns the definition name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the registry type tag.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the definition priority.
    #[inline]
    #[must_use]
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Returns the transport implementation.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Returns the definition's option map as written.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &Map<String, JsonValue> {
        &self.options
    }

    /// Returns `true` if the implementation can run here.
    #[inline]
    #[must_use]
    pub fn is_supported(&self, ctx: &ConnectContext) -> bool {
        self.transport.is_supported(ctx.encrypted)
    }

    /// Opens the transport.
    ///
    /// # Errors
    ///
    /// - [`Error::PriorityTooLow`] if below `ctx.min_priority`
    /// - [`Error::TransportUnsupported`] if the transport cannot run here
    /// - any error from the transport's open
    pub async fn connect(&self, ctx: &ConnectContext) -> Result<Connection> {
        if self.priority < ctx.min_priority {
            trace!(transport = %self.name, priority = self.priority, "Priority below minimum");
            return Err(Error::priority_too_low(
                &self.name,
                self.priority,
                ctx.min_priority,
            ));
        }

        if !self.is_supported(ctx) {
            debug!(transport = %self.name, kind = %self.kind, "Transport unsupported");
            return Err(Error::transport_unsupported(&self.name));
        }

        let request = OpenRequest {
            name: self.name.clone(),
            key: self.key.clone(),
            encrypted: ctx.encrypted,
            options: self.options.clone(),
        };

        let started = Instant::now();
        let socket = self.transport.open(request).await?;
        let latency = started.elapsed();

        debug!(
            transport = %self.name,
            kind = %self.kind,
            latency_ms = latency.as_millis() as u64,
            "Transport connected"
        );

        Ok(Connection::new(&self.name, self.priority, latency, socket))
    }
}

// ============================================================================
// UnsupportedStrategy
// ============================================================================

/// Stand-in for a transport definition disabled by build options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedStrategy {
    name: String,
}

impl UnsupportedStrategy {
    /// Creates the stand-in for definition `name`.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the disabled definition name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always fails with [`Error::TransportUnsupported`].
    pub async fn connect(&self, _ctx: &ConnectContext) -> Result<Connection> {
        Err(Error::transport_unsupported(&self.name))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::testing::{Behavior, MockTransport};

    fn strategy(mock: &Arc<MockTransport>, priority: i64) -> TransportStrategy {
        let mut options = Map::new();
        options.insert("host".into(), "example.com".into());
        TransportStrategy::new("primary", mock.kind(), priority, mock.clone(), options, Some("key".into()))
    }

    #[tokio::test]
    async fn test_connect_passes_request() {
        let mock = MockTransport::connecting("ws");
        let connection = strategy(&mock, 2)
            .connect(&ConnectContext::new().with_encrypted(true))
            .await
            .expect("connected");

        assert_eq!(connection.transport(), "primary");
        assert_eq!(connection.kind(), "ws");
        assert_eq!(connection.priority(), 2);

        let request = mock.last_request().expect("opened");
        assert_eq!(request.name, "primary");
        assert_eq!(request.key.as_deref(), Some("key"));
        assert!(request.encrypted);
        assert_eq!(request.options["host"], "example.com");
    }

    #[tokio::test]
    async fn test_unsupported_fails_without_open() {
        let mock = MockTransport::connecting("ws");
        mock.set_supported(false);

        let err = strategy(&mock, 1).connect(&ConnectContext::new()).await.unwrap_err();
        assert!(matches!(err, Error::TransportUnsupported { .. }));
        assert_eq!(mock.opened(), 0);
    }

    #[tokio::test]
    async fn test_priority_too_low_fails_without_open() {
        let mock = MockTransport::connecting("ws");

        let err = strategy(&mock, 1)
            .connect(&ConnectContext::new().with_min_priority(2))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PriorityTooLow { priority: 1, min_priority: 2, .. }));
        assert_eq!(mock.opened(), 0);
    }

    #[tokio::test]
    async fn test_open_failure_surfaces() {
        let mock = MockTransport::new("ws", Behavior::Fail(Duration::ZERO));

        let err = strategy(&mock, 1).connect(&ConnectContext::new()).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
        assert_eq!(mock.opened(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_measured() {
        let mock = MockTransport::new("ws", Behavior::Connect(Duration::from_millis(150)));

        let connection = strategy(&mock, 1).connect(&ConnectContext::new()).await.expect("connected");
        assert!(connection.latency() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_unsupported_strategy_always_fails() {
        let err = UnsupportedStrategy::new("ws")
            .connect(&ConnectContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransportUnsupported { name } if name == "ws"));
    }
}
