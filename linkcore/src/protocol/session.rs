extern crate std;

use alloc::sync::Arc;
use std::thread;

use defmt_or_log::{debug, info, warn};

use super::{
    SessionClock, Ticker,
    codec::Bitstream,
    lines::{self, RxLines},
    receiver::{EdgeSampler, LevelSampler, Record, Sampler},
    transmitter::Transmitter,
};
use crate::{
    LineInterface, LinkError,
    config::{LinkConfig, Sampling},
};

/// Runs loopback transfers: one transmitter and one receiver on their own threads, sharing
/// one line handle.
///
/// A session keeps no state between runs, the same `Session` can be run any number of
/// times.
pub struct Session<L: LineInterface, C: SessionClock> {
    lines: Arc<L>,
    clock: C,
    config: LinkConfig,
}

/// Outcome of one run: what was sent and what was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub sent: Bitstream,
    pub record: Record,
}

impl Transfer {
    /// The transfer succeeded: same bits, same order, same length.
    pub fn verdict(&self) -> bool {
        self.sent.as_bits() == self.record.as_slice()
    }

    /// Index of the first bit where the record diverges, a length mismatch counts as a
    /// divergence at the end of the shorter one.
    pub fn first_mismatch(&self) -> Option<usize> {
        let sent = self.sent.as_bits();
        sent.iter()
            .zip(&self.record)
            .position(|(a, b)| a != b)
            .or_else(|| {
                (sent.len() != self.record.len()).then(|| sent.len().min(self.record.len()))
            })
    }
}

impl<L, C> Session<L, C>
where
    L: LineInterface + Send + Sync,
    C: SessionClock + Sync,
{
    pub fn new(lines: Arc<L>, clock: C, config: LinkConfig) -> Result<Self, LinkError> {
        config.validate()?;
        Ok(Self {
            lines,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Sends `descriptor` over the link and checks it was received unaltered.
    ///
    /// A mismatch is `Ok(false)`. A malformed descriptor or an unusable line is an error.
    pub fn run(&self, descriptor: &str) -> Result<bool, LinkError> {
        Ok(self.transfer(descriptor)?.verdict())
    }

    /// Same as [Session::run], keeping both bit sequences.
    pub fn transfer(&self, descriptor: &str) -> Result<Transfer, LinkError> {
        let sent = Bitstream::from_descriptor(descriptor)?;
        let (tx, rx) = lines::split(&self.lines)?;
        let mut transmitter = Transmitter::new(
            tx.data,
            tx.clock,
            self.config.pulse_width(),
            self.config.startup_delay(),
        );
        let (tx_ticker, rx_ticker) = self.clock.start();
        debug!("transfer(): {} bits, {:?} sampling", sent.len(), self.config.sampling);

        let (sent_result, received) = thread::scope(|s| {
            let sender = s.spawn(|| transmitter.send(&sent, tx_ticker));
            let receiver = s.spawn(|| self.receive(rx, rx_ticker));
            (sender.join(), receiver.join())
        });
        let record = received.map_err(|_| LinkError::TaskPanicked("receiver"))??;
        sent_result.map_err(|_| LinkError::TaskPanicked("transmitter"))??;

        let transfer = Transfer { sent, record };
        match transfer.first_mismatch() {
            None => info!("transfer(): {} bits received", transfer.record.len()),
            Some(at) => warn!(
                "transfer(): mismatch at bit {}, sent {} bits, captured {}",
                at,
                transfer.sent.len(),
                transfer.record.len()
            ),
        }
        Ok(transfer)
    }

    fn receive(&self, rx: RxLines<L>, mut ticker: C::Ticker) -> Result<Record, LinkError> {
        let mut record = Record::new();
        let window = self.config.receive_timeout();
        let pulse = self.config.pulse_width();
        // polls land half a pulse away from the transmitter's level changes
        ticker.hold(pulse / 2);
        match self.config.sampling {
            Sampling::Level => {
                LevelSampler::new(rx.data, rx.clock, pulse).receive(&mut record, window, ticker)?
            }
            Sampling::Edge => {
                EdgeSampler::new(rx.data, rx.clock, pulse).receive(&mut record, window, ticker)?
            }
        }
        Ok(record)
    }
}
