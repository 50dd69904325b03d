extern crate std;
use std::{
    format,
    fs,
    io::{self, ErrorKind},
    path::PathBuf,
    string::ToString,
};

use defmt_or_log::debug;
use embedded_hal::digital::PinState;

use crate::{Direction, LineInterface, Pin, config::PinMap};

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Linux sysfs GPIO backend, pins are addressed through their BCM number.
pub struct SysfsLines {
    root: PathBuf,
    pins: PinMap,
}

impl SysfsLines {
    pub fn new(pins: PinMap) -> Self {
        Self::with_root(SYSFS_GPIO_ROOT, pins)
    }

    /// same as [SysfsLines::new] on a different gpio class directory
    pub fn with_root(root: impl Into<PathBuf>, pins: PinMap) -> Self {
        Self {
            root: root.into(),
            pins,
        }
    }

    fn pin_dir(&self, pin: Pin) -> PathBuf {
        self.root.join(format!("gpio{}", self.pins.number(pin)))
    }
}

impl LineInterface for SysfsLines {
    type Error = io::Error;

    fn configure(&self, pin: Pin, direction: Direction) -> Result<(), Self::Error> {
        let dir = self.pin_dir(pin);
        if !dir.exists() {
            debug!("SysfsLines: exporting {:?}", dir);
            fs::write(self.root.join("export"), self.pins.number(pin).to_string())?;
        }
        let direction = match direction {
            Direction::In => "in",
            Direction::Out => "out",
        };
        fs::write(dir.join("direction"), direction)
    }

    fn write(&self, pin: Pin, level: PinState) -> Result<(), Self::Error> {
        let value = match level {
            PinState::High => "1",
            PinState::Low => "0",
        };
        fs::write(self.pin_dir(pin).join("value"), value)
    }

    fn read(&self, pin: Pin) -> Result<PinState, Self::Error> {
        match fs::read_to_string(self.pin_dir(pin).join("value"))?.trim() {
            "1" => Ok(PinState::High),
            "0" => Ok(PinState::Low),
            other => Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("unexpected gpio value {other:?}"),
            )),
        }
    }
}
