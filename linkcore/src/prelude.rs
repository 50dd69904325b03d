pub use crate::{
    Direction, LineInterface, LinkError, Pin,
    config::{LinkConfig, PinMap, Sampling},
    protocol::{
        SessionClock, Ticker,
        codec::{Bitstream, encode},
        receiver::{EdgeSampler, LevelSampler, Record, Sampler},
        transmitter::Transmitter,
    },
};

#[cfg(feature = "std")]
pub use crate::protocol::session::{Session, Transfer};
