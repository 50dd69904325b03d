extern crate std;
use std::sync::{Mutex, PoisonError};

use embedded_hal::digital::PinState;
use portable_atomic::{AtomicBool, Ordering};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{Direction, LineInterface, Pin};

/// In-memory wiring of the outbound pins onto the inbound ones: what is written on
/// DATA_OUT is read on DATA_IN, what is written on CLOCK_OUT is read on CLOCK_IN.
///
/// It is used to run the link without hardware, and can flip data bits or fail a pin to
/// exercise the failure paths.
pub struct LoopbackLines {
    data: AtomicBool,
    clock: AtomicBool,
    directions: Mutex<[Option<Direction>; 4]>,
    /// this pin refuses every operation
    fault: Option<Pin>,
    noise: Option<Mutex<Noise>>,
}

struct Noise {
    flip_rate: f64,
    random: SmallRng,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoopbackFault {
    #[error("{0:?} is not wired")]
    Unwired(Pin),
    #[error("{0:?} is not configured as {1:?}")]
    WrongDirection(Pin, Direction),
}

impl Default for LoopbackLines {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackLines {
    pub fn new() -> Self {
        Self {
            data: AtomicBool::new(false),
            clock: AtomicBool::new(false),
            directions: Mutex::new([None; 4]),
            fault: None,
            noise: None,
        }
    }

    /// Every read of DATA_IN is inverted with probability `flip_rate`.
    pub fn with_flip_rate(mut self, flip_rate: f64) -> Self {
        self.noise = Some(Mutex::new(Noise {
            flip_rate: flip_rate.clamp(0.0, 1.0),
            random: SmallRng::from_os_rng(),
        }));
        self
    }

    /// `pin` fails every configure, read and write.
    pub fn with_fault(mut self, pin: Pin) -> Self {
        self.fault = Some(pin);
        self
    }

    fn check(&self, pin: Pin, direction: Direction) -> Result<(), LoopbackFault> {
        if self.fault == Some(pin) {
            return Err(LoopbackFault::Unwired(pin));
        }
        let directions = self.directions.lock().unwrap_or_else(PoisonError::into_inner);
        if directions[pin.index()] != Some(direction) {
            return Err(LoopbackFault::WrongDirection(pin, direction));
        }
        Ok(())
    }

    fn wire(&self, pin: Pin) -> &AtomicBool {
        match pin {
            Pin::DataOut | Pin::DataIn => &self.data,
            Pin::ClockOut | Pin::ClockIn => &self.clock,
        }
    }

    fn flip(&self) -> bool {
        let Some(noise) = &self.noise else {
            return false;
        };
        let mut noise = noise.lock().unwrap_or_else(PoisonError::into_inner);
        let flip_rate = noise.flip_rate;
        noise.random.random_bool(flip_rate)
    }
}

impl LineInterface for LoopbackLines {
    type Error = LoopbackFault;

    fn configure(&self, pin: Pin, direction: Direction) -> Result<(), Self::Error> {
        if self.fault == Some(pin) {
            return Err(LoopbackFault::Unwired(pin));
        }
        self.directions.lock().unwrap_or_else(PoisonError::into_inner)[pin.index()] =
            Some(direction);
        Ok(())
    }

    fn write(&self, pin: Pin, level: PinState) -> Result<(), Self::Error> {
        self.check(pin, Direction::Out)?;
        self.wire(pin).store(level == PinState::High, Ordering::SeqCst);
        Ok(())
    }

    fn read(&self, pin: Pin) -> Result<PinState, Self::Error> {
        self.check(pin, Direction::In)?;
        let mut high = self.wire(pin).load(Ordering::SeqCst);
        if pin == Pin::DataIn && self.flip() {
            high = !high;
        }
        Ok(PinState::from(high))
    }
}
