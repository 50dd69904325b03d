#![no_std]

extern crate alloc;

pub mod config;
pub mod protocol;

#[cfg(feature = "std")]
pub mod std;

mod error;
pub use error::*;

mod traits;
pub use traits::*;

pub mod prelude;
