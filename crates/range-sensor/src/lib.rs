//! Ultrasonic Range Sensing
//!
//! Drives an HC-SR04 style time-of-flight sensor over two GPIO lines:
//! a trigger output commanding an ultrasonic ping, and an echo input
//! whose high pulse width encodes the round-trip time.
//!
//! Unlike the usual hobbyist loop, every wait on the echo line is
//! bounded by a timeout: a disconnected or miswired sensor yields a
//! typed [`RangeError::NoEcho`] for that sampling cycle instead of
//! stalling the caller forever.

pub mod clock;
pub mod gpio;
pub mod sampler;

pub use clock::{Clock, MonotonicClock};
pub use gpio::{PulseIo, SysfsGpio};
pub use sampler::{DistanceSampler, RangeConfig, RangeSensor};

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which echo transition a wait was blocked on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoPhase {
    /// Waiting for the echo line to go high (pulse start)
    Rise,
    /// Waiting for the echo line to go low (pulse end)
    Fall,
}

impl fmt::Display for EchoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchoPhase::Rise => write!(f, "rise"),
            EchoPhase::Fall => write!(f, "fall"),
        }
    }
}

/// Range sensing error types
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("no echo {phase} within {timeout:?}")]
    NoEcho { phase: EchoPhase, timeout: Duration },

    #[error("GPIO access failed: {0}")]
    Gpio(#[from] std::io::Error),
}
