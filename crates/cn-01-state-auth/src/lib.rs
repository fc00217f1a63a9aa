//! # CN-01 State Authentication
//!
//! Canonical encoding and signatures for off-chain channel states.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (domain + stateless service)
//!
//! ## Purpose
//!
//! Every state the network co-signs must hash to the same 32 bytes the
//! adjudicator contract computes during a dispute:
//!
//! - ABI tuple encoding of `(channelId, intent, version, data, allocations)`
//! - Keccak256 state hash
//! - Participant signature creation and verification
//! - Weighted quorum verification of network signatures
//!
//! ## Module Structure
//!
//! ```text
//! cn-01-state-auth/
//! ├── domain/      # Intent, Allocation, UnsignedState, QuorumPolicy, errors
//! └── service      # state_hash, sign_state, verify_state, verify_quorum
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod service;

// Re-exports
pub use domain::{
    encode_state, Allocation, CodecError, Intent, QuorumOutcome, QuorumPolicy, UnsignedState,
};
pub use service::{sign_state, state_hash, verify_quorum, verify_state};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
