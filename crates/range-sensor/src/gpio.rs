//! GPIO line capability for the pulse protocol

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::RangeError;

/// The two GPIO lines the sensor protocol drives: a trigger output and
/// an echo input.
pub trait PulseIo {
    /// Drive the trigger line high or low
    fn set_trigger(&mut self, high: bool) -> Result<(), RangeError>;

    /// Sample the echo line
    fn echo_high(&mut self) -> Result<bool, RangeError>;
}

/// GPIO access through the Linux sysfs interface.
///
/// Exports both pins and sets their directions on construction. Pin
/// numbers are BCM numbering as exposed under `/sys/class/gpio`.
pub struct SysfsGpio {
    trigger_value: PathBuf,
    echo_value: PathBuf,
}

impl SysfsGpio {
    pub fn new(trigger_pin: u32, echo_pin: u32) -> Result<Self, RangeError> {
        info!(trigger_pin, echo_pin, "Initialising GPIO pins");
        export(trigger_pin)?;
        export(echo_pin)?;
        set_direction(trigger_pin, "out")?;
        set_direction(echo_pin, "in")?;
        Ok(Self {
            trigger_value: value_path(trigger_pin),
            echo_value: value_path(echo_pin),
        })
    }
}

impl PulseIo for SysfsGpio {
    fn set_trigger(&mut self, high: bool) -> Result<(), RangeError> {
        fs::write(&self.trigger_value, if high { "1" } else { "0" })?;
        Ok(())
    }

    fn echo_high(&mut self) -> Result<bool, RangeError> {
        let raw = fs::read(&self.echo_value)?;
        Ok(raw.first() == Some(&b'1'))
    }
}

fn value_path(pin: u32) -> PathBuf {
    PathBuf::from(format!("/sys/class/gpio/gpio{pin}/value"))
}

fn export(pin: u32) -> Result<(), RangeError> {
    // Already exported from a previous run
    if Path::new(&format!("/sys/class/gpio/gpio{pin}")).exists() {
        return Ok(());
    }
    fs::write("/sys/class/gpio/export", pin.to_string())?;
    Ok(())
}

fn set_direction(pin: u32, direction: &str) -> Result<(), RangeError> {
    fs::write(
        format!("/sys/class/gpio/gpio{pin}/direction"),
        direction,
    )?;
    Ok(())
}
