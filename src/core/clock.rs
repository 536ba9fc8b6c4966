//! Time Source and Period Policy
//!
//! The ledger stamps confessions and derives the current nullifier period
//! from a [`Clock`]. Production uses wall-clock time; tests drive a
//! [`ManualClock`].

use std::sync::atomic::{AtomicI64, Ordering};

/// Default nullifier period: one UTC day.
pub const DEFAULT_PERIOD_SECS: u64 = 86_400;

/// Source of unix time in seconds.
pub trait Clock: Send + Sync {
    /// Current unix time (seconds).
    fn now(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock set explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create at a fixed unix time.
    pub fn new(now: i64) -> Self {
        Self { now: AtomicI64::new(now) }
    }

    /// Jump to a unix time.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Period salt for a unix timestamp: `floor(now / period_secs)`.
///
/// Times before the epoch map to period 0. A zero period length is treated
/// as one second.
pub fn period_of(now: i64, period_secs: u64) -> u64 {
    let secs = period_secs.max(1);
    if now <= 0 {
        return 0;
    }
    now as u64 / secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_period_boundaries() {
        // 2024-01-01T00:00:00Z
        let midnight = 1_704_067_200;
        let day = period_of(midnight, DEFAULT_PERIOD_SECS);

        assert_eq!(period_of(midnight + 86_399, DEFAULT_PERIOD_SECS), day);
        assert_eq!(period_of(midnight + 86_400, DEFAULT_PERIOD_SECS), day + 1);
        assert_eq!(period_of(midnight - 1, DEFAULT_PERIOD_SECS), day - 1);
    }

    #[test]
    fn test_period_edge_cases() {
        assert_eq!(period_of(-5, DEFAULT_PERIOD_SECS), 0);
        assert_eq!(period_of(10, 0), 10);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(7);
        assert_eq!(clock.now(), 7);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // after 2023-11-14
        assert!(SystemClock.now() > 1_700_000_000);
    }
}
