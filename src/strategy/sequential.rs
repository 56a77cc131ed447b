//! Sequential strategy.
//!
//! Tries children one at a time, in listed order. Each try is bounded by the
//! current timeout; after every advance the timeout doubles, capped at
//! `timeoutLimit`.
//!
//! ```text
//! timeout: 2s ──► 4s ──► 8s ──► 8s ...   (timeoutLimit = 8s)
//! child:    a      b      a      b  ...   (loop = true)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::{ConnectContext, Connection, Strategy, any_supported};

// ============================================================================
// SequentialOptions
// ============================================================================

/// Options map of a sequential strategy, in milliseconds.
///
/// ```json
/// { "loop": true, "timeout": 2000, "timeoutLimit": 8000, "failFast": true }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SequentialOptions {
    /// Restart from the first child when all have failed.
    #[serde(rename = "loop")]
    pub looping: bool,

    /// Initial per-child timeout. `None` or `0` means unbounded.
    pub timeout: Option<u64>,

    /// Cap for the escalating timeout. `None` disables escalation.
    pub timeout_limit: Option<u64>,

    /// Advance immediately on failure instead of waiting out the timeout.
    pub fail_fast: bool,
}

impl Default for SequentialOptions {
    fn default() -> Self {
        Self {
            looping: false,
            timeout: None,
            timeout_limit: None,
            fail_fast: true,
        }
    }
}

// ============================================================================
// SequentialStrategy
// ============================================================================

/// Ordered fallback over child strategies.
#[derive(Debug)]
pub struct SequentialStrategy {
    strategies: Vec<Arc<Strategy>>,
    options: SequentialOptions,
}

impl SequentialStrategy {
    /// Creates a sequential strategy.
    #[inline]
    #[must_use]
    pub fn new(strategies: Vec<Arc<Strategy>>, options: SequentialOptions) -> Self {
        Self {
            strategies,
            options,
        }
    }

    /// Returns the children in order.
    #[inline]
    #[must_use]
    pub fn strategies(&self) -> &[Arc<Strategy>] {
        &self.strategies
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SequentialOptions {
        &self.options
    }

    /// Returns `true` if exhaustion restarts from the first child.
    #[inline]
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.options.looping
    }

    /// Returns the initial per-child timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.options
            .timeout
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }

    /// Returns the timeout cap.
    #[inline]
    #[must_use]
    pub fn timeout_limit(&self) -> Option<Duration> {
        self.options.timeout_limit.map(Duration::from_millis)
    }

    #[inline]
    pub(crate) fn is_supported(&self, ctx: &ConnectContext) -> bool {
        any_supported(&self.strategies, ctx)
    }

    /// Next timeout in the escalation schedule.
    fn escalate(&self, timeout: Option<Duration>) -> Option<Duration> {
        match (timeout, self.timeout_limit()) {
            (Some(timeout), Some(limit)) => Some((timeout * 2).min(limit)),
            (timeout, _) => timeout,
        }
    }

    /// Tries children in order until one connects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllFailed`] when a non-looping sequence is exhausted.
    /// A looping sequence only ends on success or cancellation.
    pub async fn connect(&self, ctx: &ConnectContext) -> Result<Connection> {
        if self.strategies.is_empty() {
            return Err(Error::all_failed(Vec::new()));
        }

        let mut timeout = self.timeout();
        let mut failures = Vec::with_capacity(self.strategies.len());
        let mut index = 0;

        loop {
            trace!(index, timeout_ms = timeout.map(|t| t.as_millis() as u64), "Trying sub-strategy");

            match self.try_strategy(&self.strategies[index], ctx, timeout).await {
                Ok(connection) => return Ok(connection),
                Err(e) => {
                    debug!(index, error = %e, "Sub-strategy failed");
                    failures.push(e);
                }
            }

            index += 1;
            if index == self.strategies.len() {
                if !self.options.looping {
                    return Err(Error::all_failed(failures));
                }

                trace!("Sequence exhausted, looping");
                index = 0;
                failures.clear();
                tokio::task::yield_now().await;
            }

            timeout = self.escalate(timeout);
        }
    }

    /// Runs one child under `timeout`, dropping it when the timer fires.
    async fn try_strategy(
        &self,
        strategy: &Strategy,
        ctx: &ConnectContext,
        timeout: Option<Duration>,
    ) -> Result<Connection> {
        let Some(timeout) = timeout else {
            return strategy.connect(ctx).await;
        };

        let deadline = Instant::now() + timeout;
        match timeout_at(deadline, strategy.connect(ctx)).await {
            Ok(Ok(connection)) => Ok(connection),
            Ok(Err(e)) => {
                if !self.options.fail_fast {
                    sleep_until(deadline).await;
                }
                Err(e)
            }
            Err(_) => Err(Error::timeout(
                format!("{} sub-strategy", strategy.kind_name()),
                timeout.as_millis() as u64,
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
