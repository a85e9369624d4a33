//! Trigger/echo pulse measurement

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Clock, EchoPhase, PulseIo, RangeError};

/// Speed of sound at sea level, metres per second. No temperature
/// compensation is applied.
pub const SPEED_OF_SOUND_M_S: f64 = 340.29;

/// Width of the trigger pulse commanding one ultrasonic ping
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Object-safe sampling seam, so loop wiring and tests are independent
/// of the concrete GPIO and clock types.
pub trait DistanceSampler {
    /// Measure the distance to the nearest reflector, in centimetres
    fn measure(&mut self) -> Result<f64, RangeError>;
}

/// Range sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Idle time with the trigger held low before each ping, letting any
    /// prior echo die out (milliseconds)
    pub settle_ms: u64,
    /// Upper bound on each echo wait phase (milliseconds). The sensor's
    /// usable range is well under the distance this corresponds to.
    pub echo_timeout_ms: u64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            echo_timeout_ms: 60,
        }
    }
}

impl RangeConfig {
    fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms)
    }
}

/// Distance sampler driving the trigger/echo protocol.
///
/// The protocol is strictly ordered and timing sensitive: settle, 10 µs
/// trigger pulse, then two bounded busy-waits bracketing the echo pulse.
pub struct RangeSensor<IO, C> {
    io: IO,
    clock: C,
    config: RangeConfig,
}

impl<IO: PulseIo, C: Clock> RangeSensor<IO, C> {
    pub fn new(io: IO, clock: C, config: RangeConfig) -> Self {
        Self { io, clock, config }
    }

    /// Measure the distance to the nearest reflector, in centimetres.
    ///
    /// Blocks the caller for the settle delay plus the echo round trip,
    /// bounded by the configured timeout per wait phase.
    pub fn measure(&mut self) -> Result<f64, RangeError> {
        // Quiet period so a previous ping cannot be mistaken for ours
        self.io.set_trigger(false)?;
        self.clock.sleep(self.config.settle());

        // 10 µs high pulse sends out 8 ultrasonic (40 kHz) bursts
        self.io.set_trigger(true)?;
        self.spin_for(TRIGGER_PULSE);
        self.io.set_trigger(false)?;

        let start = self.wait_for_echo(true, EchoPhase::Rise)?;
        let end = self.wait_for_echo(false, EchoPhase::Fall)?;

        // The pulse covers the round trip, so halve it
        let travel = end.saturating_sub(start);
        let distance_m = travel.as_secs_f64() * SPEED_OF_SOUND_M_S / 2.0;
        let distance_cm = distance_m * 100.0;
        debug!(?travel, distance_cm, "Range sample");
        Ok(distance_cm)
    }

    /// Busy-wait until the echo line reads `level`, returning the clock
    /// reading at the transition.
    fn wait_for_echo(&mut self, level: bool, phase: EchoPhase) -> Result<Duration, RangeError> {
        let timeout = self.config.echo_timeout();
        let deadline = self.clock.now() + timeout;
        loop {
            if self.io.echo_high()? == level {
                return Ok(self.clock.now());
            }
            if self.clock.now() >= deadline {
                return Err(RangeError::NoEcho { phase, timeout });
            }
        }
    }

    /// Busy-wait; sleep granularity is too coarse for a 10 µs pulse
    fn spin_for(&self, duration: Duration) {
        let end = self.clock.now() + duration;
        while self.clock.now() < end {}
    }
}

impl<IO: PulseIo, C: Clock> DistanceSampler for RangeSensor<IO, C> {
    fn measure(&mut self) -> Result<f64, RangeError> {
        RangeSensor::measure(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Clock whose every reading advances time by one microsecond, so
    /// busy-wait loops terminate deterministically.
    struct SteppedClock {
        micros: Cell<u64>,
    }

    impl SteppedClock {
        fn shared() -> Rc<Self> {
            Rc::new(Self {
                micros: Cell::new(0),
            })
        }

        fn peek(&self) -> Duration {
            Duration::from_micros(self.micros.get())
        }
    }

    impl Clock for Rc<SteppedClock> {
        fn now(&self) -> Duration {
            let now = self.micros.get();
            self.micros.set(now + 1);
            Duration::from_micros(now)
        }

        fn sleep(&self, duration: Duration) {
            let now = self.micros.get();
            self.micros.set(now + duration.as_micros() as u64);
        }
    }

    /// Echo line scripted as a function of clock time
    struct ScriptedEcho {
        clock: Rc<SteppedClock>,
        rise_at: Duration,
        fall_at: Duration,
    }

    impl ScriptedEcho {
        fn silent(clock: Rc<SteppedClock>) -> Self {
            // Rise time past any reachable deadline
            Self {
                clock,
                rise_at: Duration::from_secs(3600),
                fall_at: Duration::from_secs(7200),
            }
        }
    }

    impl PulseIo for ScriptedEcho {
        fn set_trigger(&mut self, _high: bool) -> Result<(), RangeError> {
            Ok(())
        }

        fn echo_high(&mut self) -> Result<bool, RangeError> {
            let now = self.clock.peek();
            Ok(now >= self.rise_at && now < self.fall_at)
        }
    }

    #[test]
    fn test_distance_from_synthetic_echo() {
        let clock = SteppedClock::shared();
        // Echo pulse: rises ~1 ms after the ping, 2 ms wide
        let io = ScriptedEcho {
            clock: Rc::clone(&clock),
            rise_at: Duration::from_micros(501_500),
            fall_at: Duration::from_micros(503_500),
        };
        let mut sensor = RangeSensor::new(io, Rc::clone(&clock), RangeConfig::default());

        let distance = sensor.measure().unwrap();

        // 2000 µs of travel: (2000 / 1e6) * 340.29 / 2 * 100 cm, within
        // the one-poll quantisation of the stepped clock
        let expected = 2000.0 / 1.0e6 * SPEED_OF_SOUND_M_S / 2.0 * 100.0;
        assert!(
            (distance - expected).abs() < 0.2,
            "distance {distance} != expected {expected}"
        );
    }

    #[test]
    fn test_no_echo_rise_times_out() {
        let clock = SteppedClock::shared();
        let io = ScriptedEcho::silent(Rc::clone(&clock));
        let mut sensor = RangeSensor::new(io, Rc::clone(&clock), RangeConfig::default());

        match sensor.measure() {
            Err(RangeError::NoEcho { phase, .. }) => assert_eq!(phase, EchoPhase::Rise),
            other => panic!("expected NoEcho, got {other:?}"),
        }
    }

    #[test]
    fn test_echo_never_falls_times_out() {
        let clock = SteppedClock::shared();
        // Rises but never falls back low
        let io = ScriptedEcho {
            clock: Rc::clone(&clock),
            rise_at: Duration::from_micros(501_000),
            fall_at: Duration::from_secs(3600),
        };
        let mut sensor = RangeSensor::new(io, Rc::clone(&clock), RangeConfig::default());

        match sensor.measure() {
            Err(RangeError::NoEcho { phase, .. }) => assert_eq!(phase, EchoPhase::Fall),
            other => panic!("expected NoEcho, got {other:?}"),
        }
    }
}
