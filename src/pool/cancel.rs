//! Pool-scoped cancellation.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Unified cancellation signal for one pool run.
///
/// The pool token is a child of the caller's token, so caller cancellation
/// propagates in. A background task trips the token once the pool-wide
/// deadline elapses, and exits early when the token is cancelled first, so
/// the finalizer's [`cancel`](Self::cancel) releases the timer.
///
/// `CancellationToken::cancel` is a no-op once the token has tripped, which
/// makes double-cancel from the finalizer, stop-on-error, and panic paths
/// safe.
#[derive(Clone)]
pub(crate) struct PoolCancellation {
    token: CancellationToken,
}

impl PoolCancellation {
    /// Derive pool cancellation from the caller's token and the pool-wide
    /// timeout. Must be called within a Tokio runtime.
    pub(crate) fn new(caller: &CancellationToken, global_timeout: Duration) -> Self {
        let token = caller.child_token();

        let deadline = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = deadline.cancelled() => {}
                () = tokio::time::sleep(global_timeout) => deadline.cancel(),
            }
        });

        Self { token }
    }

    /// The token observed by the feeder and workers.
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Derive a token for a single worker-function invocation.
    pub(crate) fn task_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trip the pool. Idempotent.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}
