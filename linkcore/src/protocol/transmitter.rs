use defmt_or_log::{debug, trace};
use embassy_time::Duration;
use embedded_hal::digital::{OutputPin, PinState};

use super::{Ticker, codec::Bitstream};
use crate::{LinkError, Pin};

/// Clocks a [Bitstream] out on a data/clock pin pair.
///
/// Every bit is a full clock cycle: clock high, data set, one pulse, clock low, one pulse.
/// There's no acknowledgement, a transmission can't be retried nor cancelled.
pub struct Transmitter<D: OutputPin, C: OutputPin> {
    data: D,
    clock: C,
    pulse_width: Duration,
    /// waited before the first bit, the receiver has to be polling by then
    startup_delay: Duration,
}

impl<D: OutputPin, C: OutputPin> Transmitter<D, C> {
    pub fn new(data: D, clock: C, pulse_width: Duration, startup_delay: Duration) -> Self {
        Self {
            data,
            clock,
            pulse_width,
            startup_delay,
        }
    }

    /// Sends every bit of `bits`, returns how many were clocked out.
    ///
    /// The ticker is consumed: once the last pulse is over the transmitter is done with
    /// the session.
    pub fn send<T: Ticker>(&mut self, bits: &Bitstream, mut ticker: T) -> Result<usize, LinkError> {
        debug!("send(): {} bits, waiting for the receiver", bits.len());
        ticker.hold(self.startup_delay);

        for &bit in bits.as_bits() {
            self.clock
                .set_high()
                .map_err(|e| LinkError::line(Pin::ClockOut, e))?;
            self.data
                .set_state(PinState::from(bit))
                .map_err(|e| LinkError::line(Pin::DataOut, e))?;
            ticker.hold(self.pulse_width);
            self.clock
                .set_low()
                .map_err(|e| LinkError::line(Pin::ClockOut, e))?;
            ticker.hold(self.pulse_width);
        }

        trace!("send(): done");
        Ok(bits.len())
    }
}
