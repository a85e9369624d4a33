//! Monotonic clock capability
//!
//! Pulse timing needs microsecond reads and delays. The trait exists so
//! the sampler's timing behavior is testable against a deterministic
//! clock; production code uses [`MonotonicClock`].

use std::time::{Duration, Instant};

/// Monotonic microsecond-resolution clock
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;

    /// Block for at least `duration`
    fn sleep(&self, duration: Duration);
}

/// Clock backed by `std::time::Instant`
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
