//! # Shared Types Crate
//!
//! Entities persisted and exchanged by the settlement core.
//!
//! ## Clusters
//!
//! - **Channels**: `Channel`, `ChannelType`, `ChannelStatus`
//! - **States & Ledgers**: `State`, `Ledger`, `Transition`, `Transaction`
//! - **Chain bookkeeping**: `ContractEventRecord`, `EventKey`, `CheckpointAction`
//!
//! ## Design Principles
//!
//! - **Chain-assigned identity**: channel ids are the 32-byte ids the
//!   contract emits; the core never derives them.
//! - **Append-only history**: channels are never deleted and states are
//!   superseded rather than mutated.

pub mod entities;
pub mod errors;
pub mod events;
pub mod state;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use state::*;

/// Re-exported chain primitives so downstream crates agree on one definition.
pub use alloy_primitives::{Address, B256, U256};
/// Re-exported decimal type used for every ledger amount.
pub use rust_decimal::Decimal;

/// Chain-assigned channel identifier (`bytes32` on-chain).
pub type ChannelId = B256;

/// EVM chain identifier.
pub type BlockchainId = u64;
