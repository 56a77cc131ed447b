//! First connected race.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;

use super::race::race;
use super::{ConnectContext, Connection, Strategy, any_supported};

// ============================================================================
// FirstConnectedStrategy
// ============================================================================

/// Starts every child at once; the first to connect wins.
///
/// Losers still in flight are cancelled when the winner is returned.
#[derive(Debug)]
pub struct FirstConnectedStrategy {
    strategies: Vec<Arc<Strategy>>,
}

impl FirstConnectedStrategy {
    /// Creates a race over `strategies`.
    #[inline]
    #[must_use]
    pub fn new(strategies: Vec<Arc<Strategy>>) -> Self {
        Self { strategies }
    }

    /// Returns the children in listed order.
    #[inline]
    #[must_use]
    pub fn strategies(&self) -> &[Arc<Strategy>] {
        &self.strategies
    }

    #[inline]
    pub(crate) fn is_supported(&self, ctx: &ConnectContext) -> bool {
        any_supported(&self.strategies, ctx)
    }

    /// Races the children.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllFailed`](crate::Error::AllFailed) if every child fails.
    pub async fn connect(&self, ctx: &ConnectContext) -> Result<Connection> {
        let (index, connection) = race(&self.strategies, ctx, None).await?;
        debug!(index, transport = %connection.transport(), "Race won");
        Ok(connection)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::error::Error;
    use crate::testing::{Behavior, MockTransport, transport_node};

    #[tokio::test(start_paused = true)]
    async fn test_fastest_wins_and_losers_are_cancelled() {
        let slow = MockTransport::new("ws", Behavior::Connect(Duration::from_millis(500)));
        let fast = MockTransport::new("sockjs", Behavior::Connect(Duration::from_millis(100)));
        let hung = MockTransport::new("xhr_streaming", Behavior::Hang);
        let race = FirstConnectedStrategy::new(vec![
            transport_node("slow", 1, &slow),
            transport_node("fast", 1, &fast),
            transport_node("hung", 1, &hung),
        ]);

        let connection = race.connect(&ConnectContext::new()).await.expect("connected");

        assert_eq!(connection.transport(), "fast");
        assert_eq!(slow.opened(), 1);
        assert_eq!(hung.opened(), 1);
        assert_eq!(slow.cancelled(), 1);
        assert_eq!(hung.cancelled(), 1);
        assert_eq!(fast.cancelled(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_listed_wins_ties() {
        let one = MockTransport::new("ws", Behavior::Connect(Duration::from_millis(100)));
        let two = MockTransport::new("sockjs", Behavior::Connect(Duration::from_millis(100)));
        let race = FirstConnectedStrategy::new(vec![
            transport_node("one", 1, &one),
            transport_node("two", 1, &two),
        ]);

        let connection = race.connect(&ConnectContext::new()).await.expect("connected");
        assert_eq!(connection.transport(), "one");
    }

    #[tokio::test]
    async fn test_failures_are_tolerated_until_success() {
        let failing = MockTransport::new("ws", Behavior::Fail(Duration::ZERO));
        let ok = MockTransport::new("sockjs", Behavior::Connect(Duration::from_millis(20)));
        let race = FirstConnectedStrategy::new(vec![
            transport_node("failing", 1, &failing),
            transport_node("ok", 1, &ok),
        ]);

        let connection = race.connect(&ConnectContext::new()).await.expect("connected");
        assert_eq!(connection.transport(), "ok");
    }

    #[tokio::test]
    async fn test_all_failed_aggregates() {
        let one = MockTransport::new("ws", Behavior::Fail(Duration::ZERO));
        let two = MockTransport::new("sockjs", Behavior::Fail(Duration::from_millis(5)));
        let race = FirstConnectedStrategy::new(vec![
            transport_node("one", 1, &one),
            transport_node("two", 1, &two),
        ]);

        let err = race.connect(&ConnectContext::new()).await.unwrap_err();
        let Error::AllFailed { failures } = err else {
            panic!("expected aggregate failure");
        };
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reaches_every_child() {
        let one = MockTransport::new("ws", Behavior::Hang);
        let two = MockTransport::new("sockjs", Behavior::Hang);
        let race = Arc::new(Strategy::FirstConnected(FirstConnectedStrategy::new(vec![
            transport_node("one", 1, &one),
            transport_node("two", 1, &two),
        ])));

        let attempt = race.attempt(ConnectContext::new());
        tokio::time::sleep(Duration::from_millis(10)).await;
        attempt.cancel();
        attempt.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(one.cancelled(), 1);
        assert_eq!(two.cancelled(), 1);
        assert!(matches!(attempt.await, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_after_win_keeps_connection() {
        let winner = MockTransport::new("ws", Behavior::Connect(Duration::from_millis(10)));
        let loser = MockTransport::new("sockjs", Behavior::Hang);
        let race = Arc::new(Strategy::FirstConnected(FirstConnectedStrategy::new(vec![
            transport_node("winner", 1, &winner),
            transport_node("loser", 1, &loser),
        ])));

        let attempt = race.attempt(ConnectContext::new());
        while !attempt.is_resolved() {
            tokio::task::yield_now().await;
        }

        attempt.cancel();
        assert!(!attempt.is_cancelled());
        assert!(attempt.is_resolved());

        let connection = attempt.await.expect("connected");
        assert_eq!(connection.transport(), "winner");
        assert_eq!(loser.opened(), 1);
        assert_eq!(loser.cancelled(), 1);
        assert_eq!(winner.cancelled(), 0);
    }
}
