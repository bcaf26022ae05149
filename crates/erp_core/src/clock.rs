//! Time source used by record timestamps and toast expiry.
//!
//! # Responsibility
//! - Provide a swappable wall clock so stores and toasts are testable.
//! - Format epoch milliseconds as ISO-8601 UTC strings.
//!
//! # Invariants
//! - `now_ms` is Unix epoch milliseconds.
//! - Timestamps are rendered with millisecond precision and a `Z` suffix.

use chrono::{DateTime, SecondsFormat, Utc};
use std::cell::Cell;

/// Wall clock abstraction.
pub trait Clock {
    /// Returns current Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Clock backed by the operating system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for tests and host-driven event loops.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

/// Renders epoch milliseconds as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Out-of-range inputs fall back to the Unix epoch.
pub fn iso8601(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::{iso8601, Clock, ManualClock};

    #[test]
    fn iso8601_formats_millis_in_utc() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 1_250);
        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }
}
