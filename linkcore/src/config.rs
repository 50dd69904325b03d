//! Link timing and wiring parameters.
use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::{LinkError, Pin};

/// How long each clock half-cycle (and so each bit) is held.
pub const PULSE_WIDTH_US: u64 = 500;
/// Time the transmitter waits before the first bit so the receiver is already polling.
pub const STARTUP_DELAY_MS: u64 = 1_000;
/// How long the receiver listens for.
pub const RECEIVE_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub pulse_width_us: u64,
    pub startup_delay_ms: u64,
    pub receive_timeout_ms: u64,
    pub sampling: Sampling,
    pub pins: PinMap,
}

/// Which sampler the receiving side uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// capture whenever the clock reads high
    #[default]
    Level,
    /// capture on low to high clock transitions only
    Edge,
}

/// BCM numbers of the link pins, used by hardware backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub data_out: u32,
    pub clock_out: u32,
    pub data_in: u32,
    pub clock_in: u32,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            data_out: 18,
            clock_out: 23,
            data_in: 17,
            clock_in: 22,
        }
    }
}

impl PinMap {
    pub fn number(&self, pin: Pin) -> u32 {
        match pin {
            Pin::DataOut => self.data_out,
            Pin::ClockOut => self.clock_out,
            Pin::DataIn => self.data_in,
            Pin::ClockIn => self.clock_in,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            pulse_width_us: PULSE_WIDTH_US,
            startup_delay_ms: STARTUP_DELAY_MS,
            receive_timeout_ms: RECEIVE_TIMEOUT_MS,
            sampling: Sampling::default(),
            pins: PinMap::default(),
        }
    }
}

impl LinkConfig {
    pub fn pulse_width(&self) -> Duration {
        Duration::from_micros(self.pulse_width_us)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        if self.pulse_width_us == 0 {
            return Err(LinkError::InvalidConfig("pulse width must be at least 1us"));
        }
        let pins = Pin::ALL.map(|p| self.pins.number(p));
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                return Err(LinkError::InvalidConfig("link pins must be distinct"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_wiring() {
        let config = LinkConfig::default();
        assert_eq!(config.pulse_width(), Duration::from_micros(500));
        assert_eq!(config.startup_delay(), Duration::from_secs(1));
        assert_eq!(config.receive_timeout(), Duration::from_secs(3));
        assert_eq!(config.pins.number(Pin::ClockIn), 22);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_pulse_and_shared_pins() {
        let mut config = LinkConfig {
            pulse_width_us: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LinkError::InvalidConfig(_))));

        config.pulse_width_us = 10;
        config.pins.data_in = config.pins.data_out;
        assert!(matches!(config.validate(), Err(LinkError::InvalidConfig(_))));
    }
}
