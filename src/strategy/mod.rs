//! Strategy tree.
//!
//! A built program is a tree of [`Strategy`] nodes. Leaves open transports;
//! inner nodes compose their children with delay, sequence, cache, race and
//! branch rules.
//!
//! # Node Types
//!
//! | Variant | Behaviour |
//! |---------|-----------|
//! | [`Strategy::Transport`] | Opens one transport |
//! | [`Strategy::Delayed`] | Waits, then delegates |
//! | [`Strategy::Sequential`] | Tries children in order with escalating timeouts |
//! | [`Strategy::Cached`] | Reuses the last successful transport within a TTL |
//! | [`Strategy::FirstConnected`] | Races children, first success wins |
//! | [`Strategy::BestConnectedEver`] | Races children, biased by past winners |
//! | [`Strategy::If`] | Picks a branch at connect time |
//! | [`Strategy::Unsupported`] | Always fails (disabled transport) |
//!
//! # Cancellation
//!
//! Dropping a connect future cancels it and everything below it. Use
//! [`Strategy::attempt`] for a spawned attempt with an explicit
//! [`PendingAttempt::cancel`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// Spawned, cancellable attempts.
pub mod attempt;

/// Best connected ever race.
pub mod best_connected_ever;

/// Transport cache store.
pub mod cache;

/// Cached strategy.
pub mod cached;

/// Conditional strategy.
pub mod conditional;

/// Connected result.
pub mod connection;

/// Per-attempt context.
pub mod context;

/// Delayed strategy.
pub mod delayed;

/// First connected race.
pub mod first_connected;

/// Shared race driver.
mod race;

/// Sequential strategy.
pub mod sequential;

/// Transport leaf strategy.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

pub use attempt::PendingAttempt;
pub use best_connected_ever::BestConnectedEverStrategy;
pub use cache::{CacheRecord, TransportCache};
pub use cached::{CachedStrategy, TransportTable};
pub use conditional::{Condition, IfStrategy};
pub use connection::Connection;
pub use context::ConnectContext;
pub use delayed::DelayedStrategy;
pub use first_connected::FirstConnectedStrategy;
pub use sequential::{SequentialOptions, SequentialStrategy};
pub use transport::{TransportStrategy, UnsupportedStrategy};

// ============================================================================
// Strategy
// ============================================================================

/// A node of the strategy tree.
#[derive(Debug)]
pub enum Strategy {
    /// Transport leaf.
    Transport(TransportStrategy),
    /// Delayed delegation.
    Delayed(DelayedStrategy),
    /// Ordered fallback.
    Sequential(SequentialStrategy),
    /// Cache of the last successful transport.
    Cached(CachedStrategy),
    /// Race to the first connection.
    FirstConnected(FirstConnectedStrategy),
    /// Race with cross-attempt history.
    BestConnectedEver(BestConnectedEverStrategy),
    /// Connect-time branch.
    If(IfStrategy),
    /// Disabled transport.
    Unsupported(UnsupportedStrategy),
}

impl Strategy {
    /// Attempts a connection.
    ///
    /// Dropping the returned future cancels every in-flight child.
    pub fn connect<'a>(&'a self, ctx: &'a ConnectContext) -> BoxFuture<'a, Result<Connection>> {
        match self {
            Self::Transport(s) => s.connect(ctx).boxed(),
            Self::Delayed(s) => s.connect(ctx).boxed(),
            Self::Sequential(s) => s.connect(ctx).boxed(),
            Self::Cached(s) => s.connect(ctx).boxed(),
            Self::FirstConnected(s) => s.connect(ctx).boxed(),
            Self::BestConnectedEver(s) => s.connect(ctx).boxed(),
            Self::If(s) => s.connect(ctx).boxed(),
            Self::Unsupported(s) => s.connect(ctx).boxed(),
        }
    }

    /// Spawns an attempt on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use = "dropping the attempt cancels it"]
    pub fn attempt(self: &Arc<Self>, ctx: ConnectContext) -> PendingAttempt {
        let strategy = Arc::clone(self);
        PendingAttempt::spawn(async move { strategy.connect(&ctx).await })
    }

    /// Returns `true` if any path through this node can run here.
    #[must_use]
    pub fn is_supported(&self, ctx: &ConnectContext) -> bool {
        match self {
            Self::Transport(s) => s.is_supported(ctx),
            Self::Delayed(s) => s.is_supported(ctx),
            Self::Sequential(s) => s.is_supported(ctx),
            Self::Cached(s) => s.is_supported(ctx),
            Self::FirstConnected(s) => s.is_supported(ctx),
            Self::BestConnectedEver(s) => s.is_supported(ctx),
            Self::If(s) => s.is_supported(ctx),
            Self::Unsupported(_) => false,
        }
    }

    /// Returns the node type name used in logs.
    #[inline]
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Delayed(_) => "delayed",
            Self::Sequential(_) => "sequential",
            Self::Cached(_) => "cached",
            Self::FirstConnected(_) => "first_connected",
            Self::BestConnectedEver(_) => "best_connected_ever",
            Self::If(_) => "if",
            Self::Unsupported(_) => "unsupported",
        }
    }

    /// Returns the transport leaf, if this is one.
    #[inline]
    #[must_use]
    pub fn as_transport(&self) -> Option<&TransportStrategy> {
        match self {
            Self::Transport(s) => Some(s),
            _ => None,
        }
    }
}

/// `true` if any strategy in `strategies` is supported.
pub(crate) fn any_supported(strategies: &[Arc<Strategy>], ctx: &ConnectContext) -> bool {
    strategies.iter().any(|s| s.is_supported(ctx))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::error::Error;
    use crate::testing::{Behavior, MockTransport, init_tracing, transport_node};

    #[tokio::test]
    async fn test_attempt_connects() {
        init_tracing();
        let mock = MockTransport::connecting("ws");
        let strategy = transport_node("ws", 1, &mock);

        let connection = strategy.attempt(ConnectContext::new()).await.expect("connected");
        assert_eq!(connection.transport(), "ws");
        assert_eq!(mock.opened(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_cancel_drops_transport_open() {
        let mock = MockTransport::new("ws", Behavior::Hang);
        let strategy = transport_node("ws", 1, &mock);

        let attempt = strategy.attempt(ConnectContext::new());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(mock.opened(), 1);

        attempt.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(mock.cancelled(), 1);
        assert!(matches!(attempt.await, Err(Error::Cancelled)));
    }

    #[test]
    fn test_kind_names() {
        let mock = MockTransport::connecting("ws");
        assert_eq!(transport_node("ws", 1, &mock).kind_name(), "transport");
        assert_eq!(
            Strategy::Unsupported(UnsupportedStrategy::new("ws")).kind_name(),
            "unsupported"
        );
    }

    #[test]
    fn test_unsupported_is_never_supported() {
        let strategy = Strategy::Unsupported(UnsupportedStrategy::new("ws"));
        assert!(!strategy.is_supported(&ConnectContext::new()));
    }
}
