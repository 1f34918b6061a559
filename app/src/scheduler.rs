//! Tokio-backed timers for the carousel.
//!
//! Each started timer is a spawned task sending its token into a channel
//! that the main loop selects on. Cancelling aborts the task.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use vitrina_engine::{Scheduler, TimerToken};

/// Sender for timer firings.
pub type TickSender = mpsc::UnboundedSender<TimerToken>;

/// Receiver for timer firings.
pub type TickReceiver = mpsc::UnboundedReceiver<TimerToken>;

/// Scheduler that runs timers on the current tokio runtime.
///
/// Must be used from within a runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: u64,
    tasks: HashMap<TimerToken, JoinHandle<()>>,
    ticks: TickSender,
}

impl TokioScheduler {
    pub fn new(ticks: TickSender) -> Self {
        Self {
            next_id: 0,
            tasks: HashMap::new(),
            ticks,
        }
    }

    /// Scheduler paired with the receiver its firings arrive on.
    pub fn channel() -> (Self, TickReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn start(&mut self, interval: Duration) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken::from_raw(self.next_id);
        let ticks = self.ticks.clone();

        let handle = tokio::spawn(async move {
            // First firing one full period after start.
            let mut interval = time::interval_at(Instant::now() + interval, interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if ticks.send(token).is_err() {
                    tracing::debug!(%token, "Tick receiver gone, stopping timer");
                    break;
                }
            }
        });

        self.tasks.insert(token, handle);
        tracing::debug!(%token, interval_ms = interval.as_millis() as u64, "Timer task spawned");
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.tasks.remove(&token) {
            handle.abort();
            tracing::debug!(%token, "Timer task aborted");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
