//! # CN-02 Channel Engine
//!
//! Per-channel status/version automaton driven by decoded chain events.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Reconcile on-chain lifecycle events into persisted `Channel` rows:
//!
//! ```text
//! Void -> Open          on Created / EscrowDepositInitiated / EscrowWithdrawalInitiated
//! Open -> Challenged    on Challenged
//! Open -> Closed        on Closed / EscrowDepositFinalized / EscrowWithdrawalFinalized
//! Challenged -> Open    on Checkpointed (cure)
//! Challenged -> Challenged on a later Challenged
//! Closed                terminal
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Mechanism |
//! |-----------|-----------|
//! | Type safety | Home events never touch escrow channels and vice versa |
//! | No regression | A stale challenge keeps the stored version and queues a checkpoint |
//! | Atomicity | Each handler is one `StoreTxProvider::transact` unit of work |
//! | Idempotence | Re-delivered events re-apply to the same result |
//!
//! ## Module Structure
//!
//! ```text
//! cn-02-channel-engine/
//! ├── domain/      # Event payloads, StoreError, ChannelError
//! ├── ports/       # ChannelEventHandler (in), Store + StoreTxProvider (out)
//! ├── adapters/    # MemoryStore
//! └── service      # ChannelService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::MemoryStore;
pub use domain::{
    ChannelChallengedEvent, ChannelError, ChannelMigratedEvent, ChannelVersionEvent,
    EscrowDepositsPurgedEvent, FundsMovedEvent, StoreError,
};
pub use ports::{ChannelEventHandler, Store, StoreTxProvider};
pub use service::ChannelService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
