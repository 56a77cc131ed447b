//! Best connected ever race.
//!
//! Races like [`FirstConnectedStrategy`](super::FirstConnectedStrategy), but
//! remembers each child's last win. The historically fastest child gets a
//! head start:
//!
//! ```text
//! t=0      preferred child starts
//! t=200ms  remaining children start (earlier if the preferred one fails)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;

use super::race::race;
use super::{ConnectContext, Connection, Strategy, any_supported};

// ============================================================================
// Constants
// ============================================================================

/// Lead given to the preferred child.
pub const HEAD_START: Duration = Duration::from_millis(200);

// ============================================================================
// Win
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Win {
    latency: Duration,
    priority: i64,
}

// ============================================================================
// BestConnectedEverStrategy
// ============================================================================

/// Race biased towards the child that has connected fastest before.
#[derive(Debug)]
pub struct BestConnectedEverStrategy {
    strategies: Vec<Arc<Strategy>>,
    history: Mutex<Vec<Option<Win>>>,
}

impl BestConnectedEverStrategy {
    /// Creates a race over `strategies` with empty history.
    #[must_use]
    pub fn new(strategies: Vec<Arc<Strategy>>) -> Self {
        let history = Mutex::new(vec![None; strategies.len()]);
        Self {
            strategies,
            history,
        }
    }

    /// Returns the children in listed order.
    #[inline]
    #[must_use]
    pub fn strategies(&self) -> &[Arc<Strategy>] {
        &self.strategies
    }

    /// Index of the child that will get the head start, if any has won.
    ///
    /// Lowest recorded latency wins; equal latencies go to the higher
    /// priority, then to the earlier child.
    #[must_use]
    pub fn preferred(&self) -> Option<usize> {
        let history = self.history.lock();
        history
            .iter()
            .enumerate()
            .filter_map(|(index, win)| win.map(|win| (index, win)))
            .min_by(|(ia, a), (ib, b)| {
                a.latency
                    .cmp(&b.latency)
                    .then(b.priority.cmp(&a.priority))
                    .then(ia.cmp(ib))
            })
            .map(|(index, _)| index)
    }

    /// Forgets every recorded win.
    pub fn reset(&self) {
        self.history.lock().fill(None);
    }

    #[inline]
    pub(crate) fn is_supported(&self, ctx: &ConnectContext) -> bool {
        any_supported(&self.strategies, ctx)
    }

    /// Races the children, then records the winner.
    ///
    /// A preferred child that loses despite its head start has its record
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllFailed`](crate::Error::AllFailed) if every child fails.
    pub async fn connect(&self, ctx: &ConnectContext) -> Result<Connection> {
        let lead = self.preferred().map(|index| (index, HEAD_START));
        let (index, connection) = race(&self.strategies, ctx, lead).await?;

        debug!(
            index,
            transport = %connection.transport(),
            latency_ms = connection.latency().as_millis() as u64,
            "Best connected race won"
        );

        let mut history = self.history.lock();
        if let Some((lead, _)) = lead.filter(|&(lead, _)| lead != index) {
            history[lead] = None;
        }
        history[index] = Some(Win {
            latency: connection.latency(),
            priority: connection.priority(),
        });
        drop(history);

        Ok(connection)
    }
}

// ============================================================================
// Tests
// ============================================================================
