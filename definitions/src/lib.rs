//! Types shared between the drill link and the components consuming the same drill descriptors.
#![no_std]

extern crate alloc;

mod drill;
pub use drill::*;
