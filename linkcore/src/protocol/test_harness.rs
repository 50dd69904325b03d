extern crate std;

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use embassy_time::Duration;

use super::{SessionClock, Ticker, session::Session};
use crate::{LinkError, config::LinkConfig, std::LoopbackLines};

/// Simulated session time, running as fast as the tasks can go.
///
/// Each ticker keeps its own virtual time, advanced by [Ticker::hold]. A ticker only lets
/// its task go on at virtual time `t` once every other live ticker is past `t`; at equal
/// times the transmitter goes first. Line operations are then totally ordered by virtual
/// time, so a session on a [VirtualClock] always produces the same record, whatever the
/// OS scheduling.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualClock;

const TRANSMITTER: usize = 0;
const RECEIVER: usize = 1;

#[derive(Debug)]
struct Lockstep {
    /// virtual time of each party, in ticks
    now: [u64; 2],
    /// false once a party dropped its ticker
    live: [bool; 2],
}

type Shared = Arc<(Mutex<Lockstep>, Condvar)>;

pub struct VirtualTicker {
    shared: Shared,
    party: usize,
}

impl SessionClock for VirtualClock {
    type Ticker = VirtualTicker;

    fn start(&self) -> (VirtualTicker, VirtualTicker) {
        let shared: Shared = Arc::new((
            Mutex::new(Lockstep {
                now: [0; 2],
                live: [true; 2],
            }),
            Condvar::new(),
        ));
        (
            VirtualTicker {
                shared: shared.clone(),
                party: TRANSMITTER,
            },
            VirtualTicker {
                shared,
                party: RECEIVER,
            },
        )
    }
}

impl Lockstep {
    fn may_run(&self, party: usize) -> bool {
        let me = self.now[party];
        (0..2).filter(|other| *other != party).all(|other| {
            !self.live[other]
                || self.now[other] > me
                || (self.now[other] == me && party < other)
        })
    }
}

impl VirtualTicker {
    fn lock(&self) -> MutexGuard<'_, Lockstep> {
        self.shared.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// blocks until this party is the one allowed to act
    fn wait_turn<'a>(&'a self, mut state: MutexGuard<'a, Lockstep>) -> MutexGuard<'a, Lockstep> {
        while !state.may_run(self.party) {
            state = self
                .shared
                .1
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state
    }
}

impl Ticker for VirtualTicker {
    fn now(&mut self) -> Duration {
        let state = self.wait_turn(self.lock());
        Duration::from_ticks(state.now[self.party])
    }

    fn hold(&mut self, span: Duration) {
        let mut state = self.lock();
        state.now[self.party] += span.as_ticks();
        self.shared.1.notify_all();
        drop(self.wait_turn(state));
    }
}

impl Drop for VirtualTicker {
    fn drop(&mut self) {
        self.lock().live[self.party] = false;
        self.shared.1.notify_all();
    }
}

/// A session over fresh loopback lines on a [VirtualClock].
pub fn virtual_loopback(
    config: LinkConfig,
) -> Result<Session<LoopbackLines, VirtualClock>, LinkError> {
    Session::new(Arc::new(LoopbackLines::new()), VirtualClock, config)
}
