//! # Domain Errors
//!
//! Error types for state encoding, signing and quorum checks.

use shared_crypto::CryptoError;
use thiserror::Error;

/// State authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Intent byte outside 0..=3
    #[error("Unknown intent: {0}")]
    UnknownIntent(u8),

    /// Quorum threshold is zero or above the total signer weight
    #[error("Invalid quorum policy: threshold {threshold}, total weight {total_weight}")]
    InvalidQuorumPolicy {
        /// Required weight
        threshold: u64,
        /// Sum of all signer weights
        total_weight: u64,
    },

    /// Signing or recovery failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
