//! Time source seam
//!
//! The ledger never decides what time it is. Each operation asks its clock
//! once and uses that reading for every comparison it makes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use types::numeric::{Duration, Timestamp};

/// Monotonically non-decreasing source of timestamps in seconds.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by the system UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch clocks read as zero.
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

/// Settable clock shared between a ledger and its driver.
///
/// Clones observe the same time. The clock only moves forward: `set` to an
/// earlier instant is ignored.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the clock to `at` if that is not in the past.
    pub fn set(&self, at: Timestamp) {
        self.now.fetch_max(at, Ordering::SeqCst);
    }

    /// Move the clock forward by `seconds`, saturating at the maximum.
    pub fn advance(&self, seconds: Duration) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(seconds))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(1_000);
        clock.advance(50);
        assert_eq!(clock.now(), 1_050);
    }

    #[test]
    fn test_manual_clock_never_moves_backwards() {
        let clock = ManualClock::new(1_000);
        clock.set(500);
        assert_eq!(clock.now(), 1_000);
        clock.set(2_000);
        assert_eq!(clock.now(), 2_000);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(0);
        let handle = clock.clone();
        handle.advance(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
