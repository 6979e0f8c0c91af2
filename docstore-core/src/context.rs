//! Caller-supplied cancellation and deadline signals.
//!
//! Every client operation accepts an [`OpContext`]. When the context's
//! cancellation token fires the operation aborts with
//! [`StoreError::Canceled`]; when its deadline elapses it aborts with
//! [`StoreError::DeadlineExceeded`]. In both cases the operation's future is
//! dropped before any commit point, so no partial effects become visible.

use std::future::{Future, pending};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::error::{StoreError, StoreResult};

/// Cancellation and deadline scope for a single client operation.
///
/// A default context never cancels and never expires.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use docstore_core::context::OpContext;
///
/// let ctx = OpContext::new().timeout(Duration::from_secs(5));
/// client.read(&ctx, "users", "alice").await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl OpContext {
    /// Creates a context with no deadline and no cancellation signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an absolute deadline for operations run under this context.
    pub fn deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(at);
        self
    }

    /// Sets a deadline relative to now.
    pub fn timeout(self, after: Duration) -> Self {
        self.deadline(Instant::now() + after)
    }

    /// Attaches a cancellation token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Races `fut` against this context's signals.
    ///
    /// Cancellation and deadline are checked before the operation makes
    /// progress, so an already-fired signal wins deterministically.
    pub(crate) async fn run<T>(
        &self,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        // An already-elapsed deadline must win before the operation is ever
        // polled; sleep_until is not ready on its first poll even when the
        // instant has passed.
        if let Some(at) = self.deadline {
            if at <= Instant::now() {
                return Err(StoreError::DeadlineExceeded);
            }
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(StoreError::Canceled),
            _ = self.expired() => Err(StoreError::DeadlineExceeded),
            result = fut => result,
        }
    }

    async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => pending().await,
        }
    }

    async fn expired(&self) {
        match self.deadline {
            Some(at) => sleep_until(at).await,
            None => pending().await,
        }
    }
}
