//! # States, Ledgers and Transactions
//!
//! A `State` is a signed snapshot of a user's ledger at `(epoch, version)`.
//! States are immutable once persisted; a newer state supersedes an older
//! one and "latest" always means highest `(epoch, version)`.

use crate::errors::TypeError;
use crate::{BlockchainId, ChannelId};
use alloy_primitives::{Address, Bytes, B256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of ledger delta carried by a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionType {
    /// Off-chain transfer out of the user's ledger.
    TransferSend,
    /// Off-chain transfer into the user's ledger.
    TransferReceive,
    /// On-chain deposit into the home channel.
    HomeDeposit,
    /// On-chain withdrawal from the home channel.
    HomeWithdrawal,
    /// Cross-chain deposit through an escrow channel.
    EscrowDeposit,
    /// Cross-chain withdrawal through an escrow channel.
    EscrowWithdraw,
    /// Funds locked into an application session.
    Commit,
    /// Funds released from an application session.
    Release,
    /// Home channel moved to another chain.
    Migrate,
    /// Channel finalization.
    Finalize,
}

impl TransitionType {
    /// Persisted code.
    pub fn as_u8(self) -> u8 {
        match self {
            TransitionType::TransferSend => 1,
            TransitionType::TransferReceive => 2,
            TransitionType::HomeDeposit => 3,
            TransitionType::HomeWithdrawal => 4,
            TransitionType::EscrowDeposit => 5,
            TransitionType::EscrowWithdraw => 6,
            TransitionType::Commit => 7,
            TransitionType::Release => 8,
            TransitionType::Migrate => 9,
            TransitionType::Finalize => 10,
        }
    }
}

impl TryFrom<u8> for TransitionType {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => TransitionType::TransferSend,
            2 => TransitionType::TransferReceive,
            3 => TransitionType::HomeDeposit,
            4 => TransitionType::HomeWithdrawal,
            5 => TransitionType::EscrowDeposit,
            6 => TransitionType::EscrowWithdraw,
            7 => TransitionType::Commit,
            8 => TransitionType::Release,
            9 => TransitionType::Migrate,
            10 => TransitionType::Finalize,
            other => return Err(TypeError::UnknownTransitionType(other)),
        })
    }
}

/// One ordered ledger delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// What happened.
    pub kind: TransitionType,
    /// Transaction or event reference.
    pub tx_id: B256,
    /// Counterparty account (wallet, session or channel id).
    pub account_id: String,
    /// Amount moved.
    pub amount: Decimal,
}

/// Per-channel balances tracked by a state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Token held by the channel.
    pub token_address: Address,
    /// Chain the ledger settles on.
    pub blockchain_id: BlockchainId,
    /// User side balance.
    pub user_balance: Decimal,
    /// Net on-chain flow on the user side.
    pub user_net_flow: Decimal,
    /// Node side balance.
    pub node_balance: Decimal,
    /// Net on-chain flow on the node side.
    pub node_net_flow: Decimal,
}

impl Ledger {
    /// Sum of both sides' balances.
    pub fn total(&self) -> Decimal {
        self.user_balance + self.node_balance
    }
}

/// Signing progress of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignatureStatus {
    /// Draft.
    Unsigned,
    /// Owner signed, network signatures pending.
    UserSigned,
    /// Owner signed and at least one network signature attached.
    QuorumSigned,
}

/// A signed snapshot of a user's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// State identifier.
    pub id: B256,
    /// Home channel this state belongs to, when one exists.
    pub home_channel_id: Option<ChannelId>,
    /// Escrow channel involved in this transition, if any.
    pub escrow_channel_id: Option<ChannelId>,
    /// Asset symbol.
    pub asset: String,
    /// Owner wallet.
    pub user_wallet: Address,
    /// Major ordering key.
    pub epoch: u64,
    /// Minor ordering key within an epoch.
    pub version: u64,
    /// Ordered ledger deltas leading to this state.
    pub transitions: Vec<Transition>,
    /// Home chain ledger.
    pub home_ledger: Ledger,
    /// Escrow chain ledger, when an escrow is in flight.
    pub escrow_ledger: Option<Ledger>,
    /// Owner signature (65 bytes, wire format).
    pub owner_sig: Option<Bytes>,
    /// Network signatures collected for quorum.
    pub network_sigs: Vec<Bytes>,
    /// Persist time.
    pub created_at: DateTime<Utc>,
}

impl State {
    /// `(epoch, version)`; higher epoch always wins.
    pub fn ordering_key(&self) -> (u64, u64) {
        (self.epoch, self.version)
    }

    /// Signing progress.
    pub fn signature_status(&self) -> SignatureStatus {
        match (&self.owner_sig, self.network_sigs.is_empty()) {
            (None, _) => SignatureStatus::Unsigned,
            (Some(_), true) => SignatureStatus::UserSigned,
            (Some(_), false) => SignatureStatus::QuorumSigned,
        }
    }

    /// Fully signed (owner + network).
    pub fn is_signed(&self) -> bool {
        self.signature_status() == SignatureStatus::QuorumSigned
    }
}

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Off-chain transfer between users.
    Transfer,
    /// On-chain deposit credited.
    Deposit,
    /// On-chain withdrawal debited.
    Withdrawal,
    /// Escrow lock.
    EscrowLock,
    /// Escrow release.
    EscrowRelease,
}

/// A ledger transaction record linking sender/receiver states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Record identifier.
    pub id: Uuid,
    /// Kind of transaction.
    pub tx_type: TransactionType,
    /// Asset symbol.
    pub asset: String,
    /// Debited account.
    pub from_account: String,
    /// Credited account.
    pub to_account: String,
    /// State produced for the sender, if any.
    pub sender_new_state_id: Option<B256>,
    /// State produced for the receiver, if any.
    pub receiver_new_state_id: Option<B256>,
    /// Amount moved.
    pub amount: Decimal,
    /// Record time.
    pub created_at: DateTime<Utc>,
}
