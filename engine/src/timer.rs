//! Cancellable recurring timers.
//!
//! The carousel never sleeps or spawns anything itself. It asks a
//! [`Scheduler`] to start a recurring timer and gets a [`TimerToken`] back.
//! The host delivers each firing to the controller together with that token,
//! and the controller cancels the token whenever the timer's inputs change or
//! the controller goes away. Firings carrying a token that is no longer live
//! are ignored by the controller, so a tick that races a cancellation is
//! harmless.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to one started timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerToken(u64);

impl TimerToken {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Starts and cancels recurring timers.
pub trait Scheduler {
    /// Start a timer firing every `interval` until cancelled.
    fn start(&mut self, interval: Duration) -> TimerToken;

    /// Stop a timer. Cancelling an unknown or already cancelled token is a
    /// no-op.
    fn cancel(&mut self, token: TimerToken);
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn start(&mut self, interval: Duration) -> TimerToken {
        (**self).start(interval)
    }

    fn cancel(&mut self, token: TimerToken) {
        (**self).cancel(token)
    }
}

/// A scheduler that only records what it was asked to do.
///
/// Nothing fires on its own: tests (and the C ABI host) read the live token
/// and deliver firings explicitly.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    next_id: u64,
    active: BTreeMap<TimerToken, Duration>,
    started: usize,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live timers with their intervals.
    pub fn active(&self) -> impl Iterator<Item = (TimerToken, Duration)> + '_ {
        self.active.iter().map(|(token, interval)| (*token, *interval))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, token: TimerToken) -> bool {
        self.active.contains_key(&token)
    }

    pub fn interval_of(&self, token: TimerToken) -> Option<Duration> {
        self.active.get(&token).copied()
    }

    /// Total timers ever started.
    pub fn started(&self) -> usize {
        self.started
    }

    /// Total live timers ever cancelled.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, interval: Duration) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken(self.next_id);
        self.active.insert(token, interval);
        self.started += 1;
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.active.remove(&token).is_some() {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.start(Duration::from_millis(100));
        let b = scheduler.start(Duration::from_millis(200));

        assert_ne!(a, b);
        assert_eq!(scheduler.active_count(), 2);
        assert_eq!(scheduler.interval_of(b), Some(Duration::from_millis(200)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        let token = scheduler.start(Duration::from_secs(1));

        scheduler.cancel(token);
        scheduler.cancel(token);
        scheduler.cancel(TimerToken::from_raw(99));

        assert!(!scheduler.is_active(token));
        assert_eq!(scheduler.started(), 1);
        assert_eq!(scheduler.cancelled(), 1);
    }

    #[test]
    fn token_display_and_serde() {
        let token = TimerToken::from_raw(7);
        assert_eq!(token.to_string(), "timer-7");
        assert_eq!(serde_json::to_string(&token).unwrap(), "7");
        assert_eq!(token.raw(), 7);
    }
}
