//! Cached strategy.
//!
//! Amortises multi-transport negotiation across reconnects: within `ttl` of
//! the last success, only the transport that won last time is tried.
//!
//! The node's `encrypted` flag picks the cache partition and is also applied
//! to the context its subtree connects with, so a record never describes a
//! connection opened under the other setting.
//!
//! ```text
//! fresh record? ──yes──► retry cached transport (2×latency + 1s)
//!      │                      │ ok ─────────────► refresh record, done
//!      │                      └ fail ─► flush ─┐
//!      no                                      ▼
//!      └─────────────────────────────► full sub-strategy
//!                                        ok ──► store record, done
//!                                        fail ► flush, surface error
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::time::{Instant, timeout};
use tracing::debug;

use crate::error::Result;

use super::cache::now_millis;
use super::{ConnectContext, Connection, Strategy, TransportCache};

// ============================================================================
// Constants
// ============================================================================

/// Slack added to twice the cached latency when retrying the cached transport.
const RETRY_SLACK: Duration = Duration::from_secs(1);

// ============================================================================
// Types
// ============================================================================

/// Transport strategies by definition name.
pub type TransportTable = FxHashMap<String, Arc<Strategy>>;

// ============================================================================
// CachedStrategy
// ============================================================================

/// Reuses the last successful transport within a TTL window.
#[derive(Debug)]
pub struct CachedStrategy {
    ttl: Duration,
    encrypted: bool,
    strategy: Arc<Strategy>,
    transports: Arc<TransportTable>,
    cache: Arc<TransportCache>,
}

impl CachedStrategy {
    /// Creates a cached strategy.
    ///
    /// `transports` are the definitions a cache record may name; `encrypted`
    /// selects the cache partition and overrides the context's flag for
    /// everything below this node.
    #[must_use]
    pub fn new(
        ttl: Duration,
        encrypted: bool,
        strategy: Arc<Strategy>,
        transports: Arc<TransportTable>,
        cache: Arc<TransportCache>,
    ) -> Self {
        Self {
            ttl,
            encrypted,
            strategy,
            transports,
            cache,
        }
    }

    /// Returns the TTL.
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cache partition flag.
    #[inline]
    #[must_use]
    pub fn encrypted(&self) -> bool {
        self.encrypted
    }

    /// Returns the wrapped strategy.
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> &Arc<Strategy> {
        &self.strategy
    }

    /// Returns the cache store.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<TransportCache> {
        &self.cache
    }

    #[inline]
    pub(crate) fn is_supported(&self, ctx: &ConnectContext) -> bool {
        self.strategy.is_supported(&ConnectContext {
            encrypted: self.encrypted,
            ..*ctx
        })
    }

    /// Returns the cached transport and its retry timeout, if fresh.
    fn cached_transport(&self) -> Option<(String, Arc<Strategy>, Duration)> {
        let record = self.cache.fetch(self.encrypted)?;
        if !record.is_fresh(self.ttl, now_millis()) {
            return None;
        }

        let transport = self.transports.get(&record.transport)?;
        let retry_timeout = record.latency() * 2 + RETRY_SLACK;
        Some((record.transport, Arc::clone(transport), retry_timeout))
    }

    /// Connects, preferring the cached transport.
    ///
    /// # Errors
    ///
    /// Returns the full sub-strategy's error; a failed cached retry is absorbed.
    pub async fn connect(&self, ctx: &ConnectContext) -> Result<Connection> {
        if ctx.encrypted != self.encrypted {
            debug!(encrypted = self.encrypted, "Cached node overrides context encryption");
        }
        let ctx = &ConnectContext {
            encrypted: self.encrypted,
            ..*ctx
        };

        if let Some((name, transport, retry_timeout)) = self.cached_transport() {
            debug!(
                transport = %name,
                timeout_ms = retry_timeout.as_millis() as u64,
                "Retrying cached transport"
            );

            let started = Instant::now();
            match timeout(retry_timeout, transport.connect(ctx)).await {
                Ok(Ok(connection)) => {
                    self.cache
                        .store(self.encrypted, connection.transport(), started.elapsed());
                    return Ok(connection);
                }
                Ok(Err(e)) => debug!(transport = %name, error = %e, "Cached transport failed"),
                Err(_) => debug!(transport = %name, "Cached transport timed out"),
            }

            self.cache.flush(self.encrypted);
        }

        let started = Instant::now();
        match self.strategy.connect(ctx).await {
            Ok(connection) => {
                self.cache
                    .store(self.encrypted, connection.transport(), started.elapsed());
                Ok(connection)
            }
            Err(e) => {
                self.cache.flush(self.encrypted);
                Err(e)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
