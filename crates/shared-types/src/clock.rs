//! # Time Sources
//!
//! Expiry checks and event timestamps read time through `TimeSource` so
//! tests can drive the clock explicitly.

use crate::entities::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Test clock that only moves forward.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Advances the clock by `seconds` and returns the new time.
    pub fn advance(&self, seconds: u64) -> Timestamp {
        self.now.fetch_add(seconds, Ordering::SeqCst) + seconds
    }

    /// Moves the clock to `timestamp` if it is later than the current time.
    ///
    /// Returns the time after the call.
    pub fn set(&self, timestamp: Timestamp) -> Timestamp {
        self.now.fetch_max(timestamp, Ordering::SeqCst).max(timestamp)
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_is_recent() {
        // 2020-01-01
        assert!(SystemTimeSource.now() > 1_577_836_800);
    }

    #[test]
    fn test_manual_clock_moves_forward_only() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        assert_eq!(clock.advance(50), 1_050);
        assert_eq!(clock.set(2_000), 2_000);
        assert_eq!(clock.set(1_500), 2_000);
        assert_eq!(clock.now(), 2_000);
    }
}
