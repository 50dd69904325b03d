use alloc::vec::Vec;
use core::fmt;

use definitions::Drill;

use crate::LinkError;

/// The bits sent for one descriptor, in wire order. `true` is a high data line.
///
/// Each byte contributes its code in binary without leading zeros, so the stream can't be
/// split back into characters. Nothing decodes it: the receiving side compares bit by bit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitstream {
    bits: Vec<bool>,
}

/// Encodes every byte of `bytes` with its minimal-width binary code. A zero byte is a single `0`.
pub fn encode(bytes: &[u8]) -> Bitstream {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        let width = (u8::BITS - byte.leading_zeros()).max(1);
        bits.extend((0..width).rev().map(|shift| (byte >> shift) & 1 == 1));
    }
    Bitstream { bits }
}

impl Bitstream {
    /// Checks the descriptor grammar, then encodes the descriptor exactly as given.
    ///
    /// The empty descriptor is accepted and sends nothing.
    pub fn from_descriptor(descriptor: &str) -> Result<Bitstream, LinkError> {
        if !descriptor.is_empty() {
            Drill::parse(descriptor)?;
        }
        Ok(encode(descriptor.as_bytes()))
    }

    pub fn as_bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl fmt::Display for Bitstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
