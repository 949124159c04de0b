// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Wall clock that never runs backwards.
//!
//! Host clocks can be stepped back by NTP or an operator. A refreshed lock
//! must never end up with an older `last_refresh` than it had, so readings
//! are clamped to the last value handed out.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

use super::Clock;

/// Monotonic UTC wall clock.
///
/// Each call to `now()` returns a time greater than or equal to every
/// previous call, even under concurrent access.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_nanos: AtomicI64,
}

impl SystemClock {
    /// Creates a new system clock.
    pub fn new() -> Self {
        Self::default()
    }

    fn physical_nanos() -> i64 {
        Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        loop {
            let physical = Self::physical_nanos();
            let last = self.last_nanos.load(Ordering::Acquire);
            let next = physical.max(last);

            match self
                .last_nanos
                .compare_exchange(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return DateTime::from_timestamp_nanos(next),
                Err(_) => continue,
            }
        }
    }
}
