//! # Channel Events
//!
//! Typed payloads handed to the state machine after log decoding. Home and
//! escrow families share the same shapes; the handler method decides which
//! channel type the event is valid for.

use shared_types::{Address, ChannelId, U256};

/// Created, initiated, checkpointed, closed and finalized events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelVersionEvent {
    /// Channel (or escrow) id
    pub channel_id: ChannelId,
    /// Version recorded on-chain
    pub state_version: u64,
}

/// Challenge events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelChallengedEvent {
    /// Channel (or escrow) id
    pub channel_id: ChannelId,
    /// Version the challenger submitted
    pub state_version: u64,
    /// Unix timestamp the challenge period ends
    pub challenge_expiry: u64,
}

/// Home channel migration to or from another chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMigratedEvent {
    /// Migrated channel id
    pub channel_id: ChannelId,
    /// Version at migration
    pub state_version: u64,
}

/// Direct vault deposit or withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundsMovedEvent {
    /// Account owner
    pub wallet: Address,
    /// Token moved
    pub token: Address,
    /// Raw token amount
    pub amount: U256,
}

/// Batch removal of settled escrow deposits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowDepositsPurgedEvent {
    /// Purged escrow ids
    pub escrow_ids: Vec<ChannelId>,
}
