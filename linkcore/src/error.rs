use alloc::{format, string::String};
use core::fmt::Debug;

use definitions::DescriptorError;

use crate::Pin;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// The descriptor is not four coordinate pairs. Raised before any line is touched.
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(#[from] DescriptorError),
    /// The backend failed to configure, drive or sample a pin.
    #[error("line {pin:?} unavailable: {reason}")]
    LineUnavailable { pin: Pin, reason: String },
    #[error("invalid link configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}

impl LinkError {
    pub fn line<E: Debug>(pin: Pin, error: E) -> Self {
        LinkError::LineUnavailable {
            pin,
            reason: format!("{error:?}"),
        }
    }
}
