//! Context implementation for cancellation and deadlines
//!
//! This module provides the Context type which carries cancellation signals
//! and timeouts across async boundaries. Every polling loop and retry wait in a
//! provider sleeps through [`Context::sleep`] so that a cancelled request stops
//! promptly instead of finishing its wait.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Returned when a wait was interrupted because the context was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("context cancelled")]
pub struct Cancelled;

/// Context carries request-scoped cancellation signals and timeouts
/// CRITICAL: Pass this as first parameter to ALL async trait methods
/// This enables proper cancellation and timeout handling
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, _) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done_tx,
            }),
        }
    }

    /// Derive a context that is cancelled when `timeout` elapses or when
    /// this context is cancelled, whichever comes first.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let deadline = match self.inner.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };

        let (done_tx, _) = watch::channel(self.is_cancelled());
        let inner = Arc::new(ContextInner {
            deadline: Some(deadline),
            done_tx,
        });

        let child: Weak<ContextInner> = Arc::downgrade(&inner);
        let mut parent_done = self.done();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline.into()) => {}
                Ok(_) = parent_done.wait_for(|cancelled| *cancelled) => {}
            }
            if let Some(inner) = child.upgrade() {
                inner.done_tx.send_replace(true);
            }
        });

        Self { inner }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done_tx.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns a receiver that flips to `true` when work done on behalf of
    /// this context should be cancelled
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done_tx.subscribe()
    }

    pub fn cancel(&self) {
        self.inner.done_tx.send_replace(true);
    }

    /// Resolves once the context is cancelled
    pub async fn cancelled(&self) {
        let mut done = self.done();
        // The sender lives as long as `self`, so the channel cannot close here
        let _ = done.wait_for(|cancelled| *cancelled).await;
    }

    /// Sleep for `duration` unless the context is cancelled first
    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Cancelled),
            _ = time::sleep(duration) => Ok(()),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn context_timeout_cancels() {
        let ctx = Context::new().with_timeout(Duration::from_millis(100));

        assert!(!ctx.is_cancelled());

        sleep(Duration::from_millis(150)).await;

        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn context_manual_cancel() {
        let ctx = Context::new();

        assert!(!ctx.is_cancelled());

        ctx.cancel();

        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn context_deadline() {
        let ctx = Context::new();
        assert!(ctx.deadline().is_none());

        let ctx_with_timeout = ctx.with_timeout(Duration::from_secs(1));
        assert!(ctx_with_timeout.deadline().is_some());
    }

    #[tokio::test]
    async fn child_context_follows_parent_cancellation() {
        let parent = Context::new();
        let child = parent.clone().with_timeout(Duration::from_secs(60));

        parent.cancel();
        tokio::time::timeout(Duration::from_secs(1), child.cancelled())
            .await
            .unwrap();

        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn sleep_completes_when_not_cancelled() {
        let ctx = Context::new();
        assert_eq!(ctx.sleep(Duration::from_millis(5)).await, Ok(()));
    }

    #[tokio::test]
    async fn sleep_aborts_on_cancel() {
        let ctx = Context::new();
        let waiter = ctx.clone();
        let started = Instant::now();

        let (result, _) = futures::join!(waiter.sleep(Duration::from_secs(30)), async {
            sleep(Duration::from_millis(20)).await;
            ctx.cancel();
        });

        assert_eq!(result, Err(Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn sleep_on_cancelled_context_returns_immediately() {
        let ctx = Context::new();
        ctx.cancel();
        assert_eq!(
            tokio_test::block_on(ctx.sleep(Duration::from_secs(30))),
            Err(Cancelled)
        );
    }
}
