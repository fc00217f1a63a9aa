//! # Keccak256 Hashing
//!
//! The Ethereum flavour of SHA-3 (pre-standard padding). Every signed payload
//! and every address derivation goes through here.

use sha3::{Digest, Keccak256};

/// Keccak256 output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with Keccak256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash the concatenation of multiple inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        // Well-known Keccak256("") digest
        let expected =
            hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap();
        assert_eq!(keccak256(b"").to_vec(), expected);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(keccak256(b"channel"), keccak256(b"channel"));
        assert_ne!(keccak256(b"channel"), keccak256(b"channels"));
    }

    #[test]
    fn test_many_matches_concatenation() {
        assert_eq!(
            keccak256_many(&[b"hello ", b"world"]),
            keccak256(b"hello world")
        );
    }
}
