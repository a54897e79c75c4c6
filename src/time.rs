//! Tick time types.
//!
//! [`Duration`] is an elapsed interval in milliseconds with a seconds view;
//! [`Timestamp`] is a monotonic instant. A `Duration` is only ever built
//! from a literal millisecond/second count or from `Timestamp` subtraction,
//! so it is never negative (it may be zero on back-to-back ticks).

use std::ops::{Add, Sub};
use std::time::Instant;

/// Elapsed time for a tick, stored in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Duration {
    ms: f32,
}

impl Duration {
    pub const ZERO: Duration = Duration { ms: 0.0 };

    /// Build a duration from a millisecond count.
    pub fn from_millis(ms: f32) -> Self {
        Self { ms }
    }

    /// Build a duration from a seconds count.
    pub fn from_secs(secs: f32) -> Self {
        Self { ms: secs * 1000.0 }
    }

    /// Interval in milliseconds.
    pub fn millis(&self) -> f32 {
        self.ms
    }

    /// Interval in seconds. Behaviors integrate against this view.
    pub fn seconds(&self) -> f32 {
        self.ms / 1000.0
    }

    /// The smaller of two durations. Used by the loop's catch-up clamp.
    pub fn min(self, other: Duration) -> Duration {
        if self.ms <= other.ms { self } else { other }
    }

    /// Scale the interval, e.g. by the game clock's time scale.
    pub fn scaled(self, factor: f32) -> Duration {
        Duration {
            ms: self.ms * factor,
        }
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration { ms: self.ms + rhs.ms }
    }
}

/// A monotonic wall-clock instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(Instant);

impl Timestamp {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Elapsed time since `earlier`. Saturates at zero if `earlier` is
    /// actually later, so subtraction can never go negative.
    pub fn since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_duration_since(earlier.0).as_secs_f32() * 1000.0)
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, earlier: Timestamp) -> Duration {
        self.since(earlier)
    }
}
