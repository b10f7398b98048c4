//! Cancellable timers that post internal events
//!
//! A [`ScheduledTask`] owns the join handle of a spawned tokio task and
//! aborts it when cancelled, replaced or dropped. Timer events also carry
//! a generation/version token, so an event that was already queued before
//! the abort is still discarded by the engine.
//!
//! Deadlines are fixed when the task is scheduled, not when the spawned
//! task first runs.

use super::events::InternalEvent;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn idle() -> Self {
        Self { handle: None }
    }

    /// Post `event` once after `delay`
    pub fn once(tx: UnboundedSender<InternalEvent>, delay: Duration, event: InternalEvent) -> Self {
        let deadline = Instant::now() + delay;
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            let _ = tx.send(event);
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Post `make()` every `period`, first tick one period from now
    ///
    /// Stops on its own once the receiver is gone.
    pub fn every<F>(tx: UnboundedSender<InternalEvent>, period: Duration, make: F) -> Self
    where
        F: Fn() -> InternalEvent + Send + 'static,
    {
        let start = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(make()).is_err() {
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
