use alloc::vec::Vec;

use defmt_or_log::{debug, trace};
use embassy_time::Duration;
use embedded_hal::digital::InputPin;

use super::Ticker;
use crate::{LinkError, Pin};

/// Bits captured during one receive window, in sampling order.
pub type Record = Vec<bool>;

/// Receiving side of the link.
///
/// A sampler polls until `window` has elapsed on its ticker and appends whatever it
/// captures to `record`. There is no start condition: sampling begins with whatever is on
/// the wire.
pub trait Sampler {
    fn receive<T: Ticker>(
        &mut self,
        record: &mut Record,
        window: Duration,
        ticker: T,
    ) -> Result<(), LinkError>;
}

/// Captures the data line every time a poll finds the clock high.
///
/// The poll period must match the transmitter's pulse width: a clock held high across two
/// polls is captured twice, a clock pulse falling between two polls is lost.
pub struct LevelSampler<D: InputPin, C: InputPin> {
    data: D,
    clock: C,
    pulse_width: Duration,
}

/// Captures the data line when a poll finds the clock high after having found it low.
///
/// Immune to double sampling when polling faster than the pulse width. The line is assumed
/// idle (low) before the first poll.
pub struct EdgeSampler<D: InputPin, C: InputPin> {
    data: D,
    clock: C,
    pulse_width: Duration,
}

impl<D: InputPin, C: InputPin> LevelSampler<D, C> {
    pub fn new(data: D, clock: C, pulse_width: Duration) -> Self {
        Self {
            data,
            clock,
            pulse_width,
        }
    }
}

impl<D: InputPin, C: InputPin> EdgeSampler<D, C> {
    pub fn new(data: D, clock: C, pulse_width: Duration) -> Self {
        Self {
            data,
            clock,
            pulse_width,
        }
    }
}

fn clock_high<C: InputPin>(clock: &mut C) -> Result<bool, LinkError> {
    clock.is_high().map_err(|e| LinkError::line(Pin::ClockIn, e))
}

fn data_high<D: InputPin>(data: &mut D) -> Result<bool, LinkError> {
    data.is_high().map_err(|e| LinkError::line(Pin::DataIn, e))
}

impl<D: InputPin, C: InputPin> Sampler for LevelSampler<D, C> {
    fn receive<T: Ticker>(
        &mut self,
        record: &mut Record,
        window: Duration,
        mut ticker: T,
    ) -> Result<(), LinkError> {
        debug!("LevelSampler::receive(): listening for {}us", window.as_micros());
        while ticker.now() < window {
            if clock_high(&mut self.clock)? {
                record.push(data_high(&mut self.data)?);
            }
            ticker.hold(self.pulse_width);
        }
        trace!("LevelSampler::receive(): captured {} bits", record.len());
        Ok(())
    }
}

impl<D: InputPin, C: InputPin> Sampler for EdgeSampler<D, C> {
    fn receive<T: Ticker>(
        &mut self,
        record: &mut Record,
        window: Duration,
        mut ticker: T,
    ) -> Result<(), LinkError> {
        debug!("EdgeSampler::receive(): listening for {}us", window.as_micros());
        let mut was_high = false;
        while ticker.now() < window {
            let high = clock_high(&mut self.clock)?;
            if high && !was_high {
                record.push(data_high(&mut self.data)?);
            }
            was_high = high;
            ticker.hold(self.pulse_width);
        }
        trace!("EdgeSampler::receive(): captured {} bits", record.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::{cell::Cell, rc::Rc, vec, vec::Vec};

    use embedded_hal::digital::{ErrorKind, ErrorType};

    use super::*;

    /// counts the polls, one per pulse
    type Polls = Rc<Cell<usize>>;

    /// Plays a level per poll, low once the script runs out.
    struct ScriptedPin {
        polls: Polls,
        levels: Vec<bool>,
        fail: bool,
    }

    impl ErrorType for ScriptedPin {
        type Error = ErrorKind;
    }

    impl InputPin for ScriptedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            Ok(self.levels.get(self.polls.get()).copied().unwrap_or(false))
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.is_high()?)
        }
    }

    struct PollTicker {
        polls: Polls,
        pulse: Duration,
    }

    impl Ticker for PollTicker {
        fn now(&mut self) -> Duration {
            self.pulse * self.polls.get() as u32
        }
        fn hold(&mut self, span: Duration) {
            assert_eq!(span, self.pulse);
            self.polls.set(self.polls.get() + 1);
        }
    }

    fn pins(polls: &Polls, data: &[u8], clock: &[u8]) -> (ScriptedPin, ScriptedPin) {
        let script = |levels: &[u8]| ScriptedPin {
            polls: polls.clone(),
            levels: levels.iter().map(|l| *l == 1).collect(),
            fail: false,
        };
        (script(data), script(clock))
    }

    const PULSE: Duration = Duration::from_micros(500);

    fn level(data: &[u8], clock: &[u8], polls_in_window: u32) -> (Record, usize) {
        let polls = Polls::default();
        let (data, clock) = pins(&polls, data, clock);
        let mut record = Record::new();
        LevelSampler::new(data, clock, PULSE)
            .receive(
                &mut record,
                PULSE * polls_in_window,
                PollTicker {
                    polls: polls.clone(),
                    pulse: PULSE,
                },
            )
            .unwrap();
        (record, polls.get())
    }

    fn edge(data: &[u8], clock: &[u8], polls_in_window: u32) -> Record {
        let polls = Polls::default();
        let (data, clock) = pins(&polls, data, clock);
        let mut record = Record::new();
        EdgeSampler::new(data, clock, PULSE)
            .receive(
                &mut record,
                PULSE * polls_in_window,
                PollTicker {
                    polls,
                    pulse: PULSE,
                },
            )
            .unwrap();
        record
    }

    #[test]
    fn level_samples_while_clock_high() {
        let (record, polls) = level(&[1, 1, 0, 0, 1, 0], &[1, 0, 1, 0, 1, 0], 10);
        assert_eq!(record, vec![true, false, true]);
        assert_eq!(polls, 10);
    }

    #[test]
    fn level_double_samples_a_held_clock() {
        let (record, _) = level(&[1, 1, 0, 0], &[1, 1, 0, 0], 4);
        assert_eq!(record, vec![true, true]);
    }

    #[test]
    fn level_stops_at_the_deadline() {
        let (record, polls) = level(&[1, 1, 1, 1], &[1, 0, 1, 0], 2);
        assert_eq!(record, vec![true]);
        assert_eq!(polls, 2);
    }

    #[test]
    fn edge_samples_once_per_pulse() {
        let record = edge(&[1, 1, 0, 0, 0, 0, 1], &[1, 1, 0, 1, 1, 0, 1], 10);
        assert_eq!(record, vec![true, false, true]);
    }

    #[test]
    fn empty_window() {
        let (record, polls) = level(&[1], &[1], 0);
        assert!(record.is_empty());
        assert_eq!(polls, 0);
    }

    #[test]
    fn clock_fault() {
        let polls = Polls::default();
        let (data, mut clock) = pins(&polls, &[], &[]);
        clock.fail = true;
        let mut record = Record::new();
        let err = LevelSampler::new(data, clock, PULSE)
            .receive(
                &mut record,
                PULSE,
                PollTicker {
                    polls,
                    pulse: PULSE,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LinkError::LineUnavailable {
                pin: Pin::ClockIn,
                ..
            }
        ));
    }
}
