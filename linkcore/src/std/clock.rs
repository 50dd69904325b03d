extern crate std;
use std::thread;

use embassy_time::{Duration, Instant};

use crate::protocol::{SessionClock, Ticker};

/// Below this much time left, a hold spins instead of sleeping.
const SPIN: Duration = Duration::from_millis(2);

/// Wall clock time.
///
/// Holds are deadlines on a grid starting at the session epoch: a late hold makes the next
/// one shorter, so the two tasks never drift apart. The coarse part of a hold sleeps, the
/// last [SPIN] spins yielding the CPU, so both tasks keep running on a single core.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[derive(Debug, Clone, Copy)]
pub struct SystemTicker {
    epoch: Instant,
    /// end of the last hold, from the epoch
    due: Duration,
}

impl SessionClock for SystemClock {
    type Ticker = SystemTicker;

    fn start(&self) -> (SystemTicker, SystemTicker) {
        let ticker = SystemTicker {
            epoch: Instant::now(),
            due: Duration::from_ticks(0),
        };
        (ticker, ticker)
    }
}

impl Ticker for SystemTicker {
    fn now(&mut self) -> Duration {
        self.epoch.elapsed()
    }

    fn hold(&mut self, span: Duration) {
        self.due += span;
        let deadline = self.epoch + self.due;
        let left = deadline.saturating_duration_since(Instant::now());
        if left > SPIN {
            thread::sleep(std::time::Duration::from_micros((left - SPIN).as_micros()));
        }
        while Instant::now() < deadline {
            thread::yield_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn holds_until_the_deadline() {
        let (mut ticker, mut other) = SystemClock.start();
        ticker.hold(Duration::from_micros(500));
        assert!(ticker.now() >= Duration::from_micros(500));
        ticker.hold(Duration::from_millis(5));
        assert!(ticker.now() >= Duration::from_micros(5_500));
        // both tickers count from the same epoch
        assert!(other.now() >= Duration::from_micros(5_500));
    }

    #[test]
    fn late_holds_catch_up() {
        let (mut ticker, _) = SystemClock.start();
        thread::sleep(std::time::Duration::from_millis(20));
        let before = ticker.now();
        // the first 10ms already elapsed, only the next ones are waited for
        ticker.hold(Duration::from_millis(10));
        ticker.hold(Duration::from_millis(15));
        assert!(ticker.now() >= Duration::from_millis(25));
        assert!(ticker.now() - before < Duration::from_millis(20));
    }
}
