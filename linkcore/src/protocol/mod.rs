//! The bit-banged link.
//! codec turns a descriptor into the bits that go on the wire
//! lines splits a [crate::LineInterface] into disjoint transmit and receive handles
//! transmitter and receiver do the timed line toggling and polling
//! session runs both concurrently and compares what was sent with what was captured

use embassy_time::Duration;

pub mod codec;
pub mod lines;
pub mod receiver;
pub mod transmitter;

#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod test_harness;

/// One task's view of session time.
///
/// Every ticker handed out by a [SessionClock::start] shares the same epoch.
pub trait Ticker {
    /// Time elapsed since the session epoch. Reading the time marks the point where the
    /// task is about to touch the lines, so simulated clocks may block here until every
    /// other task has caught up.
    fn now(&mut self) -> Duration;
    /// Lets `span` pass before the task goes on.
    fn hold(&mut self, span: Duration);
}

/// Source of the tickers driving a session.
pub trait SessionClock {
    type Ticker: Ticker + Send;
    /// Starts a new epoch, returns the transmitter's and the receiver's ticker.
    fn start(&self) -> (Self::Ticker, Self::Ticker);
}
