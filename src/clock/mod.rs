// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Injectable time sources.
//!
//! Every timestamp the lock service records (creation, refresh, expiry
//! checks) flows through the [`Clock`] trait, so tests can drive expiry with
//! a [`ManualClock`] instead of sleeping.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use latchkey::clock::{Clock, ManualClock};
//!
//! let clock = ManualClock::epoch();
//! let t0 = clock.now();
//! clock.advance(Duration::from_secs(30));
//! assert_eq!((clock.now() - t0).num_seconds(), 30);
//! ```

mod manual;
mod system;
mod traits;

pub use manual::ManualClock;
pub use system::SystemClock;
pub use traits::Clock;
