//! Shared race driver.
//!
//! Polls every running child from a single future. The first child to
//! resolve `Ok` wins; returning drops the driver and with it every other
//! child, which cancels them. Children are polled in a fixed order each
//! round, so the earlier child wins a tie within one poll.

// ============================================================================
// Imports
// ============================================================================

use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, poll_fn};
use tokio::time::{Sleep, sleep};
use tracing::trace;

use crate::error::{Error, Result};

use super::{ConnectContext, Connection, Strategy};

// ============================================================================
// Slot
// ============================================================================

enum Slot<'a> {
    /// Held back, not started.
    Idle,
    Running(BoxFuture<'a, Result<Connection>>),
    /// Failed.
    Done,
}

// ============================================================================
// Race
// ============================================================================

/// Races `strategies`, returning the winner's index and connection.
///
/// With `lead = Some((index, head_start))` only `index` starts at first; the
/// rest start when `head_start` elapses or when the lead fails. The lead is
/// polled ahead of the others. Without a lead every child starts at once.
///
/// # Errors
///
/// Returns [`Error::AllFailed`] with failures in completion order.
pub(crate) async fn race<'a>(
    strategies: &'a [Arc<Strategy>],
    ctx: &'a ConnectContext,
    lead: Option<(usize, Duration)>,
) -> Result<(usize, Connection)> {
    if strategies.is_empty() {
        return Err(Error::all_failed(Vec::new()));
    }

    let lead = lead.filter(|&(index, _)| index < strategies.len());

    let mut order: Vec<usize> = (0..strategies.len()).collect();
    let mut slots: Vec<Slot<'a>> = strategies.iter().map(|_| Slot::Idle).collect();
    let mut held: Option<Pin<Box<Sleep>>> = None;

    match lead {
        Some((index, head_start)) => {
            trace!(index, head_start_ms = head_start.as_millis() as u64, "Starting lead child");
            order.retain(|&i| i != index);
            order.insert(0, index);
            slots[index] = Slot::Running(strategies[index].connect(ctx));
            held = Some(Box::pin(sleep(head_start)));
        }
        None => {
            for (slot, strategy) in slots.iter_mut().zip(strategies) {
                *slot = Slot::Running(strategy.connect(ctx));
            }
        }
    }

    let mut failures = Vec::with_capacity(strategies.len());

    poll_fn(move |cx| {
        loop {
            if let Some(timer) = held.as_mut() {
                let lead_done = !slots.iter().any(|slot| matches!(slot, Slot::Running(_)));
                if lead_done || timer.poll_unpin(cx).is_ready() {
                    trace!(lead_done, "Releasing held-back children");
                    for (slot, strategy) in slots.iter_mut().zip(strategies) {
                        if matches!(slot, Slot::Idle) {
                            *slot = Slot::Running(strategy.connect(ctx));
                        }
                    }
                    held = None;
                }
            }

            let mut progressed = false;
            for &index in &order {
                let Slot::Running(future) = &mut slots[index] else {
                    continue;
                };

                match future.poll_unpin(cx) {
                    Poll::Pending => {}
                    Poll::Ready(Ok(connection)) => return Poll::Ready(Ok((index, connection))),
                    Poll::Ready(Err(e)) => {
                        trace!(index, error = %e, "Racer failed");
                        failures.push(e);
                        slots[index] = Slot::Done;
                        progressed = true;
                    }
                }
            }

            if held.is_none() && slots.iter().all(|slot| matches!(slot, Slot::Done)) {
                return Poll::Ready(Err(Error::all_failed(std::mem::take(&mut failures))));
            }

            if !progressed {
                return Poll::Pending;
            }
        }
    })
    .await
}

// ============================================================================
// Tests
// ============================================================================
