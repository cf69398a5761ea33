//! Synthesis cancellation handle — a one-shot, monotonic flag shared between
//! the `SessionController` and the in-flight `Synthesizer` producer.
//!
//! Modeled after the echo-gate pattern used elsewhere in this codebase for
//! coordinating two independently-scheduled halves of an audio pipeline: a
//! small `Arc`-shared flag that one side flips and the other side polls (or,
//! here, also waits on) without any data flowing through it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// A one-shot cancellation flag for a single synthesis stream.
///
/// A fresh handle is allocated on each `PROCESSING -> SPEAKING` traversal;
/// tripping it is idempotent, and once tripped it never resets — cancelling
/// the current synthesis never rearms future ones.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tripped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    /// Allocate a fresh, untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tripped: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Trip the flag, waking any producer suspended in
    /// [`sleep_or_cancelled`](Self::sleep_or_cancelled). Idempotent.
    pub fn trip(&self) {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether the flag has been tripped.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    /// Wait out `dur` of real-time pacing, returning early the instant the
    /// token is tripped. Returns `true` if cancelled mid-sleep.
    ///
    /// This is what keeps barge-in latency from degrading to a full frame
    /// time (20 ms): the producer is woken the moment the controller trips
    /// the flag rather than only noticing on its next scheduled wakeup.
    pub async fn sleep_or_cancelled(&self, dur: Duration) -> bool {
        if self.is_tripped() {
            return true;
        }
        tokio::select! {
            () = tokio::time::sleep(dur) => false,
            () = self.notify.notified() => true,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_tripped() {
        let token = CancelToken::new();
        assert!(!token.is_tripped());
    }

    #[test]
    fn trip_is_idempotent() {
        let token = CancelToken::new();
        token.trip();
        token.trip();
        assert!(token.is_tripped());
    }

    #[tokio::test]
    async fn sleep_returns_early_when_tripped_concurrently() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.sleep_or_cancelled(Duration::from_secs(5)).await });

        tokio::task::yield_now().await;
        token.trip();

        let cancelled = handle.await.unwrap();
        assert!(cancelled);
    }

    #[tokio::test]
    async fn sleep_returns_false_when_not_cancelled() {
        let token = CancelToken::new();
        let cancelled = token.sleep_or_cancelled(Duration::from_millis(1)).await;
        assert!(!cancelled);
    }
}
