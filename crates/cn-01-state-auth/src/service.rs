//! # State Authentication Service
//!
//! Hashing, signing and verification of encoded channel states. Every
//! function hashes the canonical encoding from [`crate::domain::codec`], so a
//! signature produced here is the one the adjudicator contract recovers.

use crate::domain::{CodecError, QuorumOutcome, QuorumPolicy, UnsignedState};
use alloy_primitives::{Address, B256};
use shared_crypto::{keccak256, recover_address, PrivateKey, Signature};
use tracing::debug;

/// Keccak256 of the canonical state encoding.
pub fn state_hash(state: &UnsignedState) -> B256 {
    B256::from(keccak256(&state.encode()))
}

/// Sign a state with a participant key.
pub fn sign_state(state: &UnsignedState, key: &PrivateKey) -> Result<Signature, CodecError> {
    Ok(key.sign(&state.encode())?)
}

/// Check a single participant signature (0/1 or 27/28 `v`).
pub fn verify_state(
    state: &UnsignedState,
    signature: &[u8],
    expected: &Address,
) -> Result<bool, CodecError> {
    Ok(shared_crypto::verify(&state.encode(), signature, expected)?)
}

/// Recover every network signature and tally it against `policy`.
///
/// A signature that cannot be recovered fails the whole check; a signature
/// from an address outside the policy is ignored.
pub fn verify_quorum<S: AsRef<[u8]>>(
    state: &UnsignedState,
    signatures: &[S],
    policy: &QuorumPolicy,
) -> Result<QuorumOutcome, CodecError> {
    let payload = state.encode();

    let mut recovered = Vec::with_capacity(signatures.len());
    for raw in signatures {
        let signature = Signature::from_slice(raw.as_ref())?;
        let signer = recover_address(&payload, &signature)?;
        if policy.weight_of(&signer) == 0 {
            debug!("[cn-01] Ignoring signature from unknown signer {}", signer);
        }
        recovered.push(signer);
    }

    let outcome = policy.tally(recovered.iter());
    debug!(
        signed_weight = outcome.signed_weight,
        threshold = outcome.threshold,
        "[cn-01] Quorum tally for channel {}",
        state.channel_id
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Allocation, Intent};
    use alloy_primitives::{Bytes, U256};
    use shared_crypto::CryptoError;

    fn state(version: u64) -> UnsignedState {
        UnsignedState {
            channel_id: B256::repeat_byte(0x01),
            intent: Intent::Operate,
            version: U256::from(version),
            data: Bytes::new(),
            allocations: vec![Allocation {
                destination: Address::repeat_byte(0x33),
                token: Address::ZERO,
                amount: U256::from(50u64),
            }],
        }
    }

    #[test]
    fn test_sign_verify_state() {
        let key = PrivateKey::generate();
        let signature = sign_state(&state(1), &key).unwrap();

        assert!(verify_state(&state(1), signature.as_bytes(), &key.address()).unwrap());
        assert!(verify_state(&state(1), &signature.to_wire(), &key.address()).unwrap());
    }

    #[test]
    fn test_signature_bound_to_version() {
        let key = PrivateKey::generate();
        let signature = sign_state(&state(1), &key).unwrap();

        assert!(!verify_state(&state(2), signature.as_bytes(), &key.address()).unwrap());
    }

    #[test]
    fn test_state_hash_matches_encoding() {
        let s = state(3);
        assert_eq!(state_hash(&s), B256::from(keccak256(&s.encode())));
        assert_ne!(state_hash(&s), state_hash(&state(4)));
    }

    #[test]
    fn test_quorum_reached() {
        let keys: Vec<PrivateKey> = (0..3).map(|_| PrivateKey::generate()).collect();
        let policy = QuorumPolicy::new(keys.iter().map(|k| (k.address(), 1)), 2).unwrap();
        let s = state(5);

        let signatures: Vec<[u8; 65]> = keys[..2]
            .iter()
            .map(|k| sign_state(&s, k).unwrap().to_wire())
            .collect();

        let outcome = verify_quorum(&s, &signatures, &policy).unwrap();
        assert_eq!(outcome.signed_weight, 2);
        assert!(outcome.is_reached());
    }

    #[test]
    fn test_quorum_repeated_signature_not_double_counted() {
        let keys: Vec<PrivateKey> = (0..3).map(|_| PrivateKey::generate()).collect();
        let policy = QuorumPolicy::new(keys.iter().map(|k| (k.address(), 1)), 2).unwrap();
        let s = state(5);

        let one = sign_state(&s, &keys[0]).unwrap();
        let outcome = verify_quorum(&s, &[one.to_wire(), one.to_wire()], &policy).unwrap();
        assert_eq!(outcome.signed_weight, 1);
        assert!(!outcome.is_reached());
    }

    #[test]
    fn test_quorum_malformed_signature_fails() {
        let key = PrivateKey::generate();
        let policy = QuorumPolicy::new([(key.address(), 1)], 1).unwrap();

        let result = verify_quorum(&state(1), &[vec![0u8; 10]], &policy);
        assert_eq!(
            result,
            Err(CodecError::Crypto(CryptoError::InvalidSignatureLength {
                expected: 65,
                actual: 10
            }))
        );
    }
}
