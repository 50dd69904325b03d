use core::fmt::Debug;

use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};

/// The four lines of the link. Outbound lines are driven by the transmitter,
/// inbound lines are sampled by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pin {
    DataOut,
    ClockOut,
    DataIn,
    ClockIn,
}

impl Pin {
    pub const ALL: [Pin; 4] = [Pin::DataOut, Pin::ClockOut, Pin::DataIn, Pin::ClockIn];

    /// The direction the link uses this pin with
    pub fn direction(self) -> Direction {
        match self {
            Pin::DataOut | Pin::ClockOut => Direction::Out,
            Pin::DataIn | Pin::ClockIn => Direction::In,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
}

/// Pin control abstraction. Any backend able to configure, drive and sample the four
/// link pins can carry a session.
///
/// Methods take `&self`: one handle is shared by the transmitter and the receiver,
/// each touching only its own pins.
pub trait LineInterface {
    type Error: Debug;
    /// sets the direction of a pin
    fn configure(&self, pin: Pin, direction: Direction) -> Result<(), Self::Error>;
    /// drives an output pin
    fn write(&self, pin: Pin, level: PinState) -> Result<(), Self::Error>;
    /// samples an input pin
    fn read(&self, pin: Pin) -> Result<PinState, Self::Error>;
}
