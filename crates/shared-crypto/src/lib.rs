//! # Shared Crypto - State Authentication Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak256 | State hashes, address derivation |
//! | `ecdsa` | secp256k1 (recoverable) | Owner and network signatures over states |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization (EIP-2)
//! - **Signatures**: 65 bytes `r || s || v`; `v` is 0/1 in memory and 27/28
//!   on the wire
//! - **Verification**: recovery-based; a recovered-but-different signer is
//!   `Ok(false)`, a signature that cannot be recovered is an error

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{
    address_from_verifying_key, recover_address, sign, verify, PrivateKey, Signature,
    SIGNATURE_LENGTH,
};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, Hash};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
