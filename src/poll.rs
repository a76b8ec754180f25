//! Polling scheduler and stale-result rejection.
//!
//! [`Poller::spawn`] runs an async action once immediately and then on a
//! fixed interval until its [`PollHandle`] is cancelled or dropped. One
//! poller drives exactly one (node, feed) pair; rebinding a UI slot to a
//! different node means cancelling the old handle, issuing a fresh
//! generation from the slot's [`Slot`], and spawning a new poller.
//!
//! Cancellation stops future invocations only. An invocation already in
//! flight runs to completion; its result must be discarded by checking its
//! [`Token`] against the slot before committing any state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running poller. Cancel it explicitly or let it cancel on
/// drop; either way no further invocations are scheduled.
#[derive(Debug)]
pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop scheduling invocations. An invocation currently running is not
    /// aborted; its result is fenced off by the generation token instead.
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    /// True once the poll loop has fully exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// The "run now, then every N" primitive shared by the health monitor and
/// the metrics feed.
pub struct Poller;

impl Poller {
    /// Spawn a poll loop: invoke `action` once immediately, then once per
    /// `period`, until the returned handle is cancelled.
    ///
    /// A slow invocation delays the next tick rather than stacking a
    /// second concurrent invocation for the same pair.
    pub fn spawn<F, Fut>(period: Duration, mut action: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately; consume
            // it so the loop below owns the "run now" invocation.
            ticker.tick().await;

            loop {
                action().await;

                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        });

        PollHandle { shutdown, task }
    }
}

/// Generation source for one UI slot.
///
/// Each rebinding of the slot issues a new monotonically increasing
/// [`Token`]; results tagged with an older token are stale and must not be
/// committed.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    current: Arc<AtomicU64>,
}

/// A generation token tagged onto every issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(u64);

impl Slot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next generation, invalidating all earlier tokens.
    pub fn issue(&self) -> Token {
        Token(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` is still the slot's live generation.
    pub fn is_current(&self, token: Token) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_on_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let handle = Poller::spawn(Duration::from_millis(1000), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Immediate invocation
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Two more ticks
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_invocations() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let handle = Poller::spawn(Duration::from_millis(100), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        let at_cancel = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_cancel);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let handle = Poller::spawn(Duration::from_millis(100), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(handle);

        let at_drop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_drop);
    }

    #[test]
    fn newer_generation_invalidates_older_tokens() {
        let slot = Slot::new();
        let g1 = slot.issue();
        assert!(slot.is_current(g1));

        let g2 = slot.issue();
        assert!(!slot.is_current(g1));
        assert!(slot.is_current(g2));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_result_does_not_commit() {
        // Simulates a g1 response landing after the slot moved to g2:
        // the commit guard must reject it.
        let slot = Slot::new();
        let state = Arc::new(AtomicUsize::new(0));

        let g1 = slot.issue();
        let g2 = slot.issue();

        // The g1 response arrives late
        if slot.is_current(g1) {
            state.store(1, Ordering::SeqCst);
        }
        assert_eq!(state.load(Ordering::SeqCst), 0);

        // The g2 response commits normally
        if slot.is_current(g2) {
            state.store(2, Ordering::SeqCst);
        }
        assert_eq!(state.load(Ordering::SeqCst), 2);
    }
}
