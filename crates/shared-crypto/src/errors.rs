//! Crypto error types.

use thiserror::Error;

/// Signing and verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Private key missing or not a valid secp256k1 scalar
    #[error("Invalid private key")]
    InvalidKey,

    /// Underlying signer failed
    #[error("Signing failed: {0}")]
    SigningFailure(String),

    /// Produced signature has the wrong shape
    #[error("Invariant violation: signature is {actual} bytes, expected {expected}")]
    InvariantViolation {
        /// Expected signature length in bytes
        expected: usize,
        /// Actual signature length in bytes
        actual: usize,
    },

    /// Signature bytes have the wrong length
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Public key recovery or unmarshalling failed
    #[error("Public key recovery failed: {0}")]
    RecoveryFailure(String),
}
