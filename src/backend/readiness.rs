//! One-shot readiness gate.
//!
//! Concrete backends often spawn simulations or wait for peer handshakes
//! before the RTU may be driven. The gate gives all callers a single place
//! to synchronize on "startup complete": one setter, any number of waiters,
//! no reset.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// A one-shot start barrier.
///
/// Cloning is cheap and every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    inner: Arc<GateInner>,
}

#[derive(Debug, Default)]
struct GateInner {
    ready: AtomicBool,
    notify: Notify,
}

impl ReadinessGate {
    /// Create a gate in the not-ready state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake all waiters. Idempotent; there is no way back.
    pub fn mark_ready(&self) {
        if !self.inner.ready.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Non-blocking observation of the flag.
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// Wait until the gate opens.
    ///
    /// `None` waits indefinitely and always returns true. With a timeout,
    /// returns false if it elapses first.
    pub async fn await_ready(&self, timeout: Option<Duration>) -> bool {
        match timeout {
            None => {
                self.wait_open().await;
                true
            }
            Some(duration) => tokio::time::timeout(duration, self.wait_open())
                .await
                .is_ok(),
        }
    }

    async fn wait_open(&self) {
        loop {
            // Register before re-checking the flag so a concurrent
            // mark_ready between check and await cannot be missed.
            let notified = self.inner.notify.notified();
            if self.is_ready() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_then_wait_returns_immediately() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_ready());
        gate.mark_ready();
        assert!(gate.is_ready());
        assert!(gate.await_ready(Some(Duration::from_millis(1))).await);
    }

    #[tokio::test]
    async fn test_mark_ready_is_idempotent() {
        let gate = ReadinessGate::new();
        gate.mark_ready();
        gate.mark_ready();
        assert!(gate.is_ready());
    }

    #[tokio::test]
    async fn test_timeout_elapses_when_never_marked() {
        let gate = ReadinessGate::new();
        assert!(!gate.await_ready(Some(Duration::from_millis(10))).await);
        // The flag stays unset after a timed-out wait.
        assert!(!gate.is_ready());
    }

    #[tokio::test]
    async fn test_multiple_waiters_released_by_one_setter() {
        let gate = ReadinessGate::new();

        let mut waiters = Vec::new();
        for _ in 0..4 {
            let g = gate.clone();
            waiters.push(tokio::spawn(async move {
                g.await_ready(Some(Duration::from_secs(5))).await
            }));
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        gate.mark_ready();

        for waiter in waiters {
            assert!(waiter.await.unwrap());
        }
    }
}
