//! # Channel Entities
//!
//! A channel is a bilateral ledger between a user wallet and the node, on one
//! blockchain, for one token. Its lifecycle is driven exclusively by decoded
//! contract events:
//!
//! ```text
//! Void ──created/initiated──→ Open ──challenged──→ Challenged
//!                              ↑ │                    │  ↺ re-armed
//!                              │ └──closed/finalized──┼──────→ Closed (terminal)
//!                              └────checkpointed──────┘
//! ```

use crate::errors::TypeError;
use crate::{BlockchainId, ChannelId};
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which ledger a channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Canonical ledger living on the user's home chain.
    Home,
    /// Cross-chain deposit/withdrawal locked under challenge-period semantics.
    Escrow,
}

impl ChannelType {
    /// Persisted code.
    pub fn as_u8(self) -> u8 {
        match self {
            ChannelType::Home => 1,
            ChannelType::Escrow => 2,
        }
    }
}

impl TryFrom<u8> for ChannelType {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChannelType::Home),
            2 => Ok(ChannelType::Escrow),
            other => Err(TypeError::UnknownChannelType(other)),
        }
    }
}

/// Channel lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelStatus {
    /// Known off-chain, not yet observed on-chain.
    #[default]
    Void,
    /// Live on-chain.
    Open,
    /// Under dispute until `challenge_expires_at`.
    Challenged,
    /// Terminal.
    Closed,
}

impl ChannelStatus {
    /// Persisted code.
    pub fn as_u8(self) -> u8 {
        match self {
            ChannelStatus::Void => 0,
            ChannelStatus::Open => 1,
            ChannelStatus::Challenged => 2,
            ChannelStatus::Closed => 3,
        }
    }

    /// Whether the status accepts no further transitions.
    pub fn is_terminal(self) -> bool {
        self == ChannelStatus::Closed
    }

    /// Whether the state machine permits `self -> next`.
    ///
    /// Self-transitions are allowed for `Open` (routine checkpoint) and
    /// `Challenged` (re-armed challenge) only.
    pub fn can_transition_to(self, next: ChannelStatus) -> bool {
        use ChannelStatus::*;
        matches!(
            (self, next),
            (Void, Open)
                | (Void, Closed)
                | (Open, Open)
                | (Open, Challenged)
                | (Open, Closed)
                | (Challenged, Open)
                | (Challenged, Challenged)
                | (Challenged, Closed)
        )
    }
}

impl TryFrom<u8> for ChannelStatus {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ChannelStatus::Void),
            1 => Ok(ChannelStatus::Open),
            2 => Ok(ChannelStatus::Challenged),
            3 => Ok(ChannelStatus::Closed),
            other => Err(TypeError::UnknownChannelStatus(other)),
        }
    }
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChannelStatus::Void => "void",
            ChannelStatus::Open => "open",
            ChannelStatus::Challenged => "challenged",
            ChannelStatus::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A persisted channel row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Chain-assigned identifier.
    pub channel_id: ChannelId,
    /// Home or escrow. Never changes after creation.
    pub channel_type: ChannelType,
    /// Counterparty wallet.
    pub user_wallet: Address,
    /// Chain the channel lives on.
    pub blockchain_id: BlockchainId,
    /// Token the channel holds.
    pub token_address: Address,
    /// Creation nonce.
    pub nonce: u64,
    /// Current status.
    pub status: ChannelStatus,
    /// Latest version observed on-chain.
    pub state_version: u64,
    /// Set only while `Challenged`.
    pub challenge_expires_at: Option<DateTime<Utc>>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a `Void` channel out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelParams {
    /// Chain-assigned identifier.
    pub channel_id: ChannelId,
    /// Home or escrow.
    pub channel_type: ChannelType,
    /// Counterparty wallet.
    pub user_wallet: Address,
    /// Chain the channel lives on.
    pub blockchain_id: BlockchainId,
    /// Token the channel holds.
    pub token_address: Address,
    /// Creation nonce.
    pub nonce: u64,
}

impl Channel {
    /// Create a channel in `Void` status at version 0.
    pub fn new(params: ChannelParams, now: DateTime<Utc>) -> Self {
        Self {
            channel_id: params.channel_id,
            channel_type: params.channel_type,
            user_wallet: params.user_wallet,
            blockchain_id: params.blockchain_id,
            token_address: params.token_address,
            nonce: params.nonce,
            status: ChannelStatus::Void,
            state_version: 0,
            challenge_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the channel can still move funds.
    pub fn is_active(&self) -> bool {
        matches!(self.status, ChannelStatus::Open | ChannelStatus::Challenged)
    }
}
