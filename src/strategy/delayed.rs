//! Delayed strategy.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::trace;

use crate::error::Result;

use super::{ConnectContext, Connection, Strategy};

// ============================================================================
// DelayedStrategy
// ============================================================================

/// Waits `delay`, then delegates to the wrapped strategy.
///
/// Cancelling during the wait never starts the wrapped attempt.
#[derive(Debug)]
pub struct DelayedStrategy {
    delay: Duration,
    strategy: Arc<Strategy>,
}

impl DelayedStrategy {
    /// Creates a delayed strategy.
    #[inline]
    #[must_use]
    pub fn new(delay: Duration, strategy: Arc<Strategy>) -> Self {
        Self { delay, strategy }
    }

    /// Returns the configured delay.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the wrapped strategy.
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> &Arc<Strategy> {
        &self.strategy
    }

    #[inline]
    pub(crate) fn is_supported(&self, ctx: &ConnectContext) -> bool {
        self.strategy.is_supported(ctx)
    }

    /// Sleeps, then connects the wrapped strategy.
    pub async fn connect(&self, ctx: &ConnectContext) -> Result<Connection> {
        trace!(delay_ms = self.delay.as_millis() as u64, "Delaying attempt");
        sleep(self.delay).await;
        self.strategy.connect(ctx).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::time::{Instant, timeout};

    use crate::testing::{Behavior, MockTransport, transport_node};

    #[tokio::test(start_paused = true)]
    async fn test_waits_before_delegating() {
        let mock = MockTransport::connecting("ws");
        let delayed = DelayedStrategy::new(Duration::from_secs(2), transport_node("ws", 1, &mock));

        let started = Instant::now();
        let connection = delayed.connect(&ConnectContext::new()).await.expect("connected");

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(connection.transport(), "ws");
        assert_eq!(mock.opened(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay_never_starts_child() {
        let mock = MockTransport::connecting("ws");
        let delayed = DelayedStrategy::new(Duration::from_secs(2), transport_node("ws", 1, &mock));

        let ctx = ConnectContext::new();
        let result = timeout(Duration::from_secs(1), delayed.connect(&ctx)).await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(mock.opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_delegation_cancels_child() {
        let mock = MockTransport::new("ws", Behavior::Hang);
        let delayed = DelayedStrategy::new(Duration::from_secs(2), transport_node("ws", 1, &mock));

        let ctx = ConnectContext::new();
        let result = timeout(Duration::from_secs(3), delayed.connect(&ctx)).await;
        assert!(result.is_err());

        assert_eq!(mock.opened(), 1);
        assert_eq!(mock.cancelled(), 1);
    }
}
