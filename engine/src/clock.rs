//! Clocks stamping `creacion` on inserted products.
//!
//! The engine never reads the wall clock directly. It asks a [`Clock`], so
//! tests can pin insertion times and get deterministic `creacion` ordering.

use crate::Timestamp;
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of insertion timestamps.
pub trait Clock: Send + Sync {
    /// Current time. Implementations return millisecond precision so a
    /// stamped product survives a storage round-trip unchanged.
    fn now(&self) -> Timestamp;
}

/// Wall clock, truncated to milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().trunc_subsecs(3)
    }
}

/// A manual clock for tests and replays.
///
/// Every call to [`Clock::now`] returns the current instant and then moves
/// it forward by `step_ms`, so consecutive inserts get distinct, increasing
/// timestamps.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
    step_ms: i64,
}

impl FixedClock {
    /// Start at `start`, advancing one millisecond per reading.
    pub fn new(start: Timestamp) -> Self {
        Self::with_step(start, 1)
    }

    /// Start at `start`, advancing `step_ms` per reading.
    pub fn with_step(start: Timestamp, step_ms: i64) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
            step_ms,
        }
    }

    /// Start at the given milliseconds since the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
            step_ms: 1,
        }
    }

    /// Jump forward without producing a reading.
    pub fn advance(&self, ms: i64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// The instant the next reading will return.
    pub fn peek(&self) -> Timestamp {
        millis_to_timestamp(self.millis.load(Ordering::SeqCst))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        let current = self.millis.fetch_add(self.step_ms, Ordering::SeqCst);
        millis_to_timestamp(current)
    }
}

fn millis_to_timestamp(millis: i64) -> Timestamp {
    DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
}
