//! Adapts a shared [LineInterface] into `embedded_hal` pins.
//!
//! [split] hands out write-only handles over the outbound pins and read-only handles over
//! the inbound pins, so the transmitter and the receiver can't step on each other's pins.
use alloc::sync::Arc;
use core::fmt;

use defmt_or_log::debug;
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin, PinState};

use crate::{Direction, LineInterface, LinkError, Pin};

/// Backend error raised through an `embedded_hal` pin.
pub struct LineFault<E>(pub E);

impl<E: fmt::Debug> fmt::Debug for LineFault<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<E: fmt::Debug> digital::Error for LineFault<E> {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Write-only access to one outbound pin.
pub struct OutputLine<L: LineInterface> {
    lines: Arc<L>,
    pin: Pin,
}

/// Read-only access to one inbound pin.
pub struct InputLine<L: LineInterface> {
    lines: Arc<L>,
    pin: Pin,
}

pub struct TxLines<L: LineInterface> {
    pub data: OutputLine<L>,
    pub clock: OutputLine<L>,
}

pub struct RxLines<L: LineInterface> {
    pub data: InputLine<L>,
    pub clock: InputLine<L>,
}

/// Configures the four pins and splits the handle between the two directions.
///
/// Outputs are left at the idle level (low) so a new session never starts from whatever
/// the previous one left on the wire.
pub fn split<L: LineInterface>(lines: &Arc<L>) -> Result<(TxLines<L>, RxLines<L>), LinkError> {
    for pin in Pin::ALL {
        lines
            .configure(pin, pin.direction())
            .map_err(|e| LinkError::line(pin, e))?;
        if pin.direction() == Direction::Out {
            lines
                .write(pin, PinState::Low)
                .map_err(|e| LinkError::line(pin, e))?;
        }
    }
    debug!("split(): lines configured and idle");

    let output = |pin| OutputLine {
        lines: lines.clone(),
        pin,
    };
    let input = |pin| InputLine {
        lines: lines.clone(),
        pin,
    };
    Ok((
        TxLines {
            data: output(Pin::DataOut),
            clock: output(Pin::ClockOut),
        },
        RxLines {
            data: input(Pin::DataIn),
            clock: input(Pin::ClockIn),
        },
    ))
}

impl<L: LineInterface> ErrorType for OutputLine<L> {
    type Error = LineFault<L::Error>;
}

impl<L: LineInterface> ErrorType for InputLine<L> {
    type Error = LineFault<L::Error>;
}

impl<L: LineInterface> OutputPin for OutputLine<L> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.lines.write(self.pin, PinState::Low).map_err(LineFault)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.lines.write(self.pin, PinState::High).map_err(LineFault)
    }
}

impl<L: LineInterface> InputPin for InputLine<L> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.lines.read(self.pin).map_err(LineFault)? == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_high()?)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::std::LoopbackLines;

    #[test]
    fn split_idles_outputs() {
        let wires = Arc::new(LoopbackLines::new());
        wires.configure(Pin::ClockOut, Direction::Out).unwrap();
        wires.write(Pin::ClockOut, PinState::High).unwrap();

        let (mut tx, mut rx) = split(&wires).unwrap();
        assert!(!rx.clock.is_high().unwrap());

        tx.data.set_high().unwrap();
        tx.clock.set_high().unwrap();
        assert!(!rx.data.is_low().unwrap());
        assert!(rx.clock.is_high().unwrap());
    }

    #[test]
    fn split_reports_the_failing_pin() {
        let wires = Arc::new(LoopbackLines::new().with_fault(Pin::DataIn));
        let err = split(&wires).err().unwrap();
        assert!(matches!(
            err,
            LinkError::LineUnavailable {
                pin: Pin::DataIn,
                ..
            }
        ));
    }
}
