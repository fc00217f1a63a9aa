//! # Error Types
//!
//! Conversion errors for the enumerations persisted as small integers.

use thiserror::Error;

/// Errors raised when decoding persisted or wire-level enum codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Unknown channel status code.
    #[error("Unknown channel status: {0}")]
    UnknownChannelStatus(u8),

    /// Unknown channel type code.
    #[error("Unknown channel type: {0}")]
    UnknownChannelType(u8),

    /// Unknown transition type code.
    #[error("Unknown transition type: {0}")]
    UnknownTransitionType(u8),
}
