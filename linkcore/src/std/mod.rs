/*!
Std only implementations: the wall clock, an in-memory loopback wiring and the Linux sysfs
GPIO backend.
*/
mod clock;
mod loopback;
mod sysfs;

pub use clock::{SystemClock, SystemTicker};
pub use loopback::{LoopbackFault, LoopbackLines};
pub use sysfs::{SYSFS_GPIO_ROOT, SysfsLines};
