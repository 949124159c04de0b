// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Manually driven clock for tests and simulations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::Clock;

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a clock frozen at the Unix epoch.
    pub fn epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Jumps to `when`. Moving backwards is allowed.
    pub fn set(&self, when: DateTime<Utc>) {
        *self.now.lock() = when;
    }

    /// Moves the clock forward by `by`.
    ///
    /// Saturates at the largest representable time.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = chrono::Duration::from_std(by)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_frozen() {
        let clock = ManualClock::epoch();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::epoch();
        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now().timestamp(), 90);
    }

    #[test]
    fn test_manual_clock_set_backwards() {
        let clock = ManualClock::epoch();
        clock.advance(Duration::from_secs(100));
        clock.set(DateTime::from_timestamp(10, 0).unwrap());
        assert_eq!(clock.now().timestamp(), 10);
    }

    #[test]
    fn test_manual_clock_advance_saturates() {
        let clock = ManualClock::epoch();
        clock.advance(Duration::MAX);
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_shared_through_arc() {
        use std::sync::Arc;

        let clock = Arc::new(ManualClock::epoch());
        let shared: Arc<dyn Clock> = clock.clone();
        clock.advance(Duration::from_secs(5));
        assert_eq!(shared.now().timestamp(), 5);
    }
}
