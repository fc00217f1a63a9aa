//! # Recoverable ECDSA Signatures (secp256k1)
//!
//! Signs `Keccak256(payload)` and recovers the signer's Ethereum address
//! from the 65-byte `r || s || v` form.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2), recovery id adjusted accordingly
//! - `SigningKey` zeroizes its scalar on drop; exported secret bytes are
//!   wrapped in `Zeroizing` so the copy is wiped as well

use crate::hashing::keccak256;
use crate::CryptoError;
use alloy_primitives::Address;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

/// Length of a recoverable signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the recovery id on the wire.
const WIRE_V_OFFSET: u8 = 27;

/// Recoverable signature with `v` normalized to 0/1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Parse from 65 bytes, accepting `v` in either the 0/1 or 27/28 form.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut raw: [u8; SIGNATURE_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: SIGNATURE_LENGTH,
                    actual: bytes.len(),
                })?;
        if raw[64] >= WIRE_V_OFFSET {
            raw[64] -= WIRE_V_OFFSET;
        }
        Ok(Self(raw))
    }

    /// Raw bytes with `v` in 0/1 form.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Bytes with `v` in 27/28 form.
    pub fn to_wire(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = self.0;
        out[64] += WIRE_V_OFFSET;
        out
    }

    /// Recovery id (0 or 1 for well-formed signatures).
    pub fn v(&self) -> u8 {
        self.0[64]
    }
}

/// secp256k1 private key.
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Generate a random key.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Load from secret key bytes (32 bytes).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::InvalidKey);
        }
        let signing_key = SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { signing_key })
    }

    /// Ethereum address of the corresponding public key.
    pub fn address(&self) -> Address {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign `Keccak256(data)`.
    pub fn sign(&self, data: &[u8]) -> Result<Signature, CryptoError> {
        let hash = keccak256(data);
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| CryptoError::SigningFailure(e.to_string()))?;

        let mut out = Vec::with_capacity(SIGNATURE_LENGTH);
        out.extend_from_slice(&sig.to_bytes());
        out.push(recovery_id.to_byte());

        let raw: [u8; SIGNATURE_LENGTH] =
            out.as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvariantViolation {
                    expected: SIGNATURE_LENGTH,
                    actual: out.len(),
                })?;
        Ok(Signature(raw))
    }

    /// Secret key bytes, wiped when the returned value is dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Sign `Keccak256(data)` with raw secret key bytes.
///
/// An empty or out-of-range key is `InvalidKey`.
pub fn sign(data: &[u8], private_key: &[u8]) -> Result<Signature, CryptoError> {
    PrivateKey::from_slice(private_key)?.sign(data)
}

/// Check that `signature` over `Keccak256(data)` was produced by `expected`.
///
/// `Ok(false)` means a key was recovered but belongs to someone else;
/// `Err(RecoveryFailure)` means no key could be recovered at all, including
/// when the signature is not 65 bytes.
pub fn verify(data: &[u8], signature: &[u8], expected: &Address) -> Result<bool, CryptoError> {
    let signature = Signature::from_slice(signature)
        .map_err(|e| CryptoError::RecoveryFailure(e.to_string()))?;
    let recovered = recover_address(data, &signature)?;
    Ok(recovered == *expected)
}

/// Recover the signer address of `signature` over `Keccak256(data)`.
pub fn recover_address(data: &[u8], signature: &Signature) -> Result<Address, CryptoError> {
    let hash = keccak256(data);
    let bytes = signature.as_bytes();

    let recovery_id = RecoveryId::from_byte(bytes[64]).ok_or_else(|| {
        CryptoError::RecoveryFailure(format!("invalid recovery id {}", bytes[64]))
    })?;
    let sig = K256Signature::from_slice(&bytes[..64])
        .map_err(|e| CryptoError::RecoveryFailure(e.to_string()))?;

    let key = VerifyingKey::recover_from_prehash(&hash, &sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailure(e.to_string()))?;

    Ok(address_from_verifying_key(&key))
}

/// Derive the Ethereum address of a public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed prefix
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
