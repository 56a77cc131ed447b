//! Spawned, cancellable attempts.
//!
//! A [`PendingAttempt`] runs a strategy's connect future on its own tokio
//! task. It resolves exactly once: either the task delivers its result, or
//! the attempt is cancelled and the result (if any) is dropped.
//!
//! # State Machine
//!
//! ```text
//! Pending ──task finishes──► Resolved   (cancel is a no-op)
//!    │
//!    └──────cancel()───────► Cancelled  (task aborted, await yields Cancelled)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::AttemptId;

use super::Connection;

// ============================================================================
// AttemptState
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptState {
    Pending,
    Resolved,
    Cancelled,
}

// ============================================================================
// PendingAttempt
// ============================================================================

/// Handle to an in-flight attempt.
///
/// Await it for the result. Dropping it cancels the attempt.
///
/// # Example
///
/// ```ignore
/// let attempt = strategy.attempt(ConnectContext::new());
/// // ... on shutdown:
/// attempt.cancel();
/// ```
pub struct PendingAttempt {
    id: AttemptId,
    state: Arc<Mutex<AttemptState>>,
    abort: AbortHandle,
    result_rx: oneshot::Receiver<Result<Connection>>,
}

impl PendingAttempt {
    /// Spawns `future` and returns its handle.
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<Connection>> + Send + 'static,
    {
        let id = AttemptId::next();
        let (result_tx, result_rx) = oneshot::channel();
        let (abort, registration) = AbortHandle::new_pair();
        let state = Arc::new(Mutex::new(AttemptState::Pending));

        let task_state = Arc::clone(&state);
        let task = Abortable::new(future, registration);

        tokio::spawn(async move {
            let Ok(result) = task.await else {
                trace!(%id, "Attempt task aborted");
                return;
            };

            let mut state = task_state.lock();
            if *state != AttemptState::Pending {
                return;
            }
            *state = AttemptState::Resolved;

            match &result {
                Ok(connection) => debug!(%id, transport = %connection.transport(), "Attempt resolved"),
                Err(e) => debug!(%id, error = %e, "Attempt failed"),
            }
            let _ = result_tx.send(result);
        });

        trace!(%id, "Attempt spawned");

        Self {
            id,
            state,
            abort,
            result_rx,
        }
    }

    /// Returns the attempt ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    /// Cancels the attempt.
    ///
    /// Idempotent. Has no effect once the attempt has resolved.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if *state != AttemptState::Pending {
            return;
        }

        *state = AttemptState::Cancelled;
        self.abort.abort();
        debug!(id = %self.id, "Attempt cancelled");
    }

    /// Returns `true` if the attempt was cancelled before resolving.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.lock() == AttemptState::Cancelled
    }

    /// Returns `true` if the attempt has produced its result.
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        *self.state.lock() == AttemptState::Resolved
    }
}

impl Future for PendingAttempt {
    type Output = Result<Connection>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.result_rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for PendingAttempt {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for PendingAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAttempt")
            .field("id", &self.id)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::time::sleep;
    use tokio_test::{assert_pending, assert_ready, task};

    use crate::testing::MockSocket;

    fn connection() -> Connection {
        Connection::new("mock", 1, Duration::ZERO, Box::new(MockSocket::new("mock")))
    }

    #[tokio::test]
    async fn test_resolves_with_result() {
        let attempt = PendingAttempt::spawn(async { Ok(connection()) });
        let connection = attempt.await.expect("connected");
        assert_eq!(connection.transport(), "mock");
    }

    #[tokio::test]
    async fn test_propagates_failure() {
        let attempt = PendingAttempt::spawn(async { Err(Error::connection("refused")) });
        assert!(matches!(attempt.await, Err(Error::Connection { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_resolution() {
        let attempt = PendingAttempt::spawn(async {
            sleep(Duration::from_secs(10)).await;
            Ok(connection())
        });

        attempt.cancel();
        assert!(attempt.is_cancelled());
        assert!(matches!(attempt.await, Err(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let mut attempt = task::spawn(PendingAttempt::spawn(std::future::pending()));
        assert_pending!(attempt.poll());

        attempt.cancel();
        attempt.cancel();
        assert!(attempt.is_cancelled());

        sleep(Duration::from_millis(1)).await;
        let result = assert_ready!(attempt.poll());
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_after_resolution_keeps_result() {
        let mut attempt = PendingAttempt::spawn(async { Ok(connection()) });

        while !attempt.is_resolved() {
            tokio::task::yield_now().await;
        }
        attempt.cancel();
        assert!(!attempt.is_cancelled());

        let connection = (&mut attempt).await.expect("result survives cancel");
        assert_eq!(connection.kind(), "mock");
    }
}
