//! # Channel Hub Contract Events
//!
//! Log bindings for the channel hub contract, the topic lookup table and the
//! closed set of decoded events the reactor dispatches on.

use crate::domain::{IngestionError, RawLog};
use alloy_primitives::B256;
use alloy_sol_types::{sol, SolEvent};
use cn_02_channel_engine::{
    ChannelChallengedEvent, ChannelError, ChannelEventHandler, ChannelMigratedEvent,
    ChannelVersionEvent, EscrowDepositsPurgedEvent, FundsMovedEvent,
};
use std::collections::HashMap;

sol! {
    #[derive(Debug)]
    event ChannelCreated(bytes32 indexed channelId, address indexed user, uint64 stateVersion);
    #[derive(Debug)]
    event ChannelCheckpointed(bytes32 indexed channelId, uint64 stateVersion);
    #[derive(Debug)]
    event ChannelChallenged(bytes32 indexed channelId, uint64 stateVersion, uint64 challengeExpiry);
    #[derive(Debug)]
    event ChannelClosed(bytes32 indexed channelId, uint64 stateVersion);
    #[derive(Debug)]
    event ChannelMigratedIn(bytes32 indexed channelId, uint64 stateVersion);
    #[derive(Debug)]
    event ChannelMigratedOut(bytes32 indexed channelId, uint64 stateVersion);

    #[derive(Debug)]
    event EscrowDepositInitiated(bytes32 indexed escrowId, uint64 stateVersion);
    #[derive(Debug)]
    event EscrowDepositChallenged(bytes32 indexed escrowId, uint64 stateVersion, uint64 challengeExpiry);
    #[derive(Debug)]
    event EscrowDepositFinalized(bytes32 indexed escrowId, uint64 stateVersion);
    #[derive(Debug)]
    event EscrowWithdrawalInitiated(bytes32 indexed escrowId, uint64 stateVersion);
    #[derive(Debug)]
    event EscrowWithdrawalChallenged(bytes32 indexed escrowId, uint64 stateVersion, uint64 challengeExpiry);
    #[derive(Debug)]
    event EscrowWithdrawalFinalized(bytes32 indexed escrowId, uint64 stateVersion);
    #[derive(Debug)]
    event EscrowDepositsPurged(bytes32[] escrowIds);

    #[derive(Debug)]
    event Deposited(address indexed wallet, address indexed token, uint256 amount);
    #[derive(Debug)]
    event Withdrawn(address indexed wallet, address indexed token, uint256 amount);
}

/// Every event the hub emits that the core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `ChannelCreated`
    ChannelCreated,
    /// `ChannelCheckpointed`
    ChannelCheckpointed,
    /// `ChannelChallenged`
    ChannelChallenged,
    /// `ChannelClosed`
    ChannelClosed,
    /// `ChannelMigratedIn`
    ChannelMigratedIn,
    /// `ChannelMigratedOut`
    ChannelMigratedOut,
    /// `EscrowDepositInitiated`
    EscrowDepositInitiated,
    /// `EscrowDepositChallenged`
    EscrowDepositChallenged,
    /// `EscrowDepositFinalized`
    EscrowDepositFinalized,
    /// `EscrowWithdrawalInitiated`
    EscrowWithdrawalInitiated,
    /// `EscrowWithdrawalChallenged`
    EscrowWithdrawalChallenged,
    /// `EscrowWithdrawalFinalized`
    EscrowWithdrawalFinalized,
    /// `EscrowDepositsPurged`
    EscrowDepositsPurged,
    /// `Deposited`
    Deposited,
    /// `Withdrawn`
    Withdrawn,
}

impl EventKind {
    /// All kinds, in table order.
    pub const ALL: [EventKind; 15] = [
        EventKind::ChannelCreated,
        EventKind::ChannelCheckpointed,
        EventKind::ChannelChallenged,
        EventKind::ChannelClosed,
        EventKind::ChannelMigratedIn,
        EventKind::ChannelMigratedOut,
        EventKind::EscrowDepositInitiated,
        EventKind::EscrowDepositChallenged,
        EventKind::EscrowDepositFinalized,
        EventKind::EscrowWithdrawalInitiated,
        EventKind::EscrowWithdrawalChallenged,
        EventKind::EscrowWithdrawalFinalized,
        EventKind::EscrowDepositsPurged,
        EventKind::Deposited,
        EventKind::Withdrawn,
    ];

    /// Solidity event name, as stored in dedup records.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::ChannelCreated => "ChannelCreated",
            EventKind::ChannelCheckpointed => "ChannelCheckpointed",
            EventKind::ChannelChallenged => "ChannelChallenged",
            EventKind::ChannelClosed => "ChannelClosed",
            EventKind::ChannelMigratedIn => "ChannelMigratedIn",
            EventKind::ChannelMigratedOut => "ChannelMigratedOut",
            EventKind::EscrowDepositInitiated => "EscrowDepositInitiated",
            EventKind::EscrowDepositChallenged => "EscrowDepositChallenged",
            EventKind::EscrowDepositFinalized => "EscrowDepositFinalized",
            EventKind::EscrowWithdrawalInitiated => "EscrowWithdrawalInitiated",
            EventKind::EscrowWithdrawalChallenged => "EscrowWithdrawalChallenged",
            EventKind::EscrowWithdrawalFinalized => "EscrowWithdrawalFinalized",
            EventKind::EscrowDepositsPurged => "EscrowDepositsPurged",
            EventKind::Deposited => "Deposited",
            EventKind::Withdrawn => "Withdrawn",
        }
    }

    /// Keccak256 of the event signature (topic 0).
    pub fn topic(self) -> B256 {
        match self {
            EventKind::ChannelCreated => ChannelCreated::SIGNATURE_HASH,
            EventKind::ChannelCheckpointed => ChannelCheckpointed::SIGNATURE_HASH,
            EventKind::ChannelChallenged => ChannelChallenged::SIGNATURE_HASH,
            EventKind::ChannelClosed => ChannelClosed::SIGNATURE_HASH,
            EventKind::ChannelMigratedIn => ChannelMigratedIn::SIGNATURE_HASH,
            EventKind::ChannelMigratedOut => ChannelMigratedOut::SIGNATURE_HASH,
            EventKind::EscrowDepositInitiated => EscrowDepositInitiated::SIGNATURE_HASH,
            EventKind::EscrowDepositChallenged => EscrowDepositChallenged::SIGNATURE_HASH,
            EventKind::EscrowDepositFinalized => EscrowDepositFinalized::SIGNATURE_HASH,
            EventKind::EscrowWithdrawalInitiated => EscrowWithdrawalInitiated::SIGNATURE_HASH,
            EventKind::EscrowWithdrawalChallenged => EscrowWithdrawalChallenged::SIGNATURE_HASH,
            EventKind::EscrowWithdrawalFinalized => EscrowWithdrawalFinalized::SIGNATURE_HASH,
            EventKind::EscrowDepositsPurged => EscrowDepositsPurged::SIGNATURE_HASH,
            EventKind::Deposited => Deposited::SIGNATURE_HASH,
            EventKind::Withdrawn => Withdrawn::SIGNATURE_HASH,
        }
    }
}

/// Topic -> event lookup. Built once and shared read-only by every reactor.
#[derive(Debug, Clone)]
pub struct EventTable {
    by_topic: HashMap<B256, EventKind>,
}

impl EventTable {
    /// Build the table for the channel hub ABI.
    pub fn new() -> Self {
        let by_topic = EventKind::ALL
            .iter()
            .map(|kind| (kind.topic(), *kind))
            .collect();
        Self { by_topic }
    }

    /// Event for a topic 0 value.
    pub fn lookup(&self, topic: &B256) -> Option<EventKind> {
        self.by_topic.get(topic).copied()
    }

    /// Number of known events.
    pub fn len(&self) -> usize {
        self.by_topic.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_topic.is_empty()
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded hub event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractEvent {
    /// Home channel opened
    HomeChannelCreated(ChannelVersionEvent),
    /// Home channel checkpointed
    HomeChannelCheckpointed(ChannelVersionEvent),
    /// Home channel challenged
    HomeChannelChallenged(ChannelChallengedEvent),
    /// Home channel closed
    HomeChannelClosed(ChannelVersionEvent),
    /// Home channel migrated here
    HomeChannelMigratedIn(ChannelMigratedEvent),
    /// Home channel migrated away
    HomeChannelMigratedOut(ChannelMigratedEvent),
    /// Escrow deposit locked
    EscrowDepositInitiated(ChannelVersionEvent),
    /// Escrow deposit challenged
    EscrowDepositChallenged(ChannelChallengedEvent),
    /// Escrow deposit released
    EscrowDepositFinalized(ChannelVersionEvent),
    /// Escrow withdrawal locked
    EscrowWithdrawalInitiated(ChannelVersionEvent),
    /// Escrow withdrawal challenged
    EscrowWithdrawalChallenged(ChannelChallengedEvent),
    /// Escrow withdrawal released
    EscrowWithdrawalFinalized(ChannelVersionEvent),
    /// Settled escrow deposits removed
    EscrowDepositsPurged(EscrowDepositsPurgedEvent),
    /// Vault deposit
    Deposited(FundsMovedEvent),
    /// Vault withdrawal
    Withdrawn(FundsMovedEvent),
}

fn decode_raw<E: SolEvent>(kind: EventKind, log: &RawLog) -> Result<E, IngestionError> {
    E::decode_raw_log(log.topics.iter().copied(), &log.data).map_err(|e| {
        IngestionError::Decode {
            event: kind.name(),
            reason: e.to_string(),
        }
    })
}

impl ContractEvent {
    /// Decode `log` as `kind`.
    pub fn decode(kind: EventKind, log: &RawLog) -> Result<Self, IngestionError> {
        let event = match kind {
            EventKind::ChannelCreated => {
                let e: ChannelCreated = decode_raw(kind, log)?;
                ContractEvent::HomeChannelCreated(ChannelVersionEvent {
                    channel_id: e.channelId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::ChannelCheckpointed => {
                let e: ChannelCheckpointed = decode_raw(kind, log)?;
                ContractEvent::HomeChannelCheckpointed(ChannelVersionEvent {
                    channel_id: e.channelId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::ChannelChallenged => {
                let e: ChannelChallenged = decode_raw(kind, log)?;
                ContractEvent::HomeChannelChallenged(ChannelChallengedEvent {
                    channel_id: e.channelId,
                    state_version: e.stateVersion,
                    challenge_expiry: e.challengeExpiry,
                })
            }
            EventKind::ChannelClosed => {
                let e: ChannelClosed = decode_raw(kind, log)?;
                ContractEvent::HomeChannelClosed(ChannelVersionEvent {
                    channel_id: e.channelId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::ChannelMigratedIn => {
                let e: ChannelMigratedIn = decode_raw(kind, log)?;
                ContractEvent::HomeChannelMigratedIn(ChannelMigratedEvent {
                    channel_id: e.channelId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::ChannelMigratedOut => {
                let e: ChannelMigratedOut = decode_raw(kind, log)?;
                ContractEvent::HomeChannelMigratedOut(ChannelMigratedEvent {
                    channel_id: e.channelId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::EscrowDepositInitiated => {
                let e: EscrowDepositInitiated = decode_raw(kind, log)?;
                ContractEvent::EscrowDepositInitiated(ChannelVersionEvent {
                    channel_id: e.escrowId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::EscrowDepositChallenged => {
                let e: EscrowDepositChallenged = decode_raw(kind, log)?;
                ContractEvent::EscrowDepositChallenged(ChannelChallengedEvent {
                    channel_id: e.escrowId,
                    state_version: e.stateVersion,
                    challenge_expiry: e.challengeExpiry,
                })
            }
            EventKind::EscrowDepositFinalized => {
                let e: EscrowDepositFinalized = decode_raw(kind, log)?;
                ContractEvent::EscrowDepositFinalized(ChannelVersionEvent {
                    channel_id: e.escrowId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::EscrowWithdrawalInitiated => {
                let e: EscrowWithdrawalInitiated = decode_raw(kind, log)?;
                ContractEvent::EscrowWithdrawalInitiated(ChannelVersionEvent {
                    channel_id: e.escrowId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::EscrowWithdrawalChallenged => {
                let e: EscrowWithdrawalChallenged = decode_raw(kind, log)?;
                ContractEvent::EscrowWithdrawalChallenged(ChannelChallengedEvent {
                    channel_id: e.escrowId,
                    state_version: e.stateVersion,
                    challenge_expiry: e.challengeExpiry,
                })
            }
            EventKind::EscrowWithdrawalFinalized => {
                let e: EscrowWithdrawalFinalized = decode_raw(kind, log)?;
                ContractEvent::EscrowWithdrawalFinalized(ChannelVersionEvent {
                    channel_id: e.escrowId,
                    state_version: e.stateVersion,
                })
            }
            EventKind::EscrowDepositsPurged => {
                let e: EscrowDepositsPurged = decode_raw(kind, log)?;
                ContractEvent::EscrowDepositsPurged(EscrowDepositsPurgedEvent {
                    escrow_ids: e.escrowIds,
                })
            }
            EventKind::Deposited => {
                let e: Deposited = decode_raw(kind, log)?;
                ContractEvent::Deposited(FundsMovedEvent {
                    wallet: e.wallet,
                    token: e.token,
                    amount: e.amount,
                })
            }
            EventKind::Withdrawn => {
                let e: Withdrawn = decode_raw(kind, log)?;
                ContractEvent::Withdrawn(FundsMovedEvent {
                    wallet: e.wallet,
                    token: e.token,
                    amount: e.amount,
                })
            }
        };
        Ok(event)
    }

    /// Forward to the matching handler method.
    pub fn dispatch<H>(&self, handler: &H) -> Result<(), ChannelError>
    where
        H: ChannelEventHandler + ?Sized,
    {
        match self {
            ContractEvent::HomeChannelCreated(e) => handler.handle_home_channel_created(e),
            ContractEvent::HomeChannelCheckpointed(e) => {
                handler.handle_home_channel_checkpointed(e)
            }
            ContractEvent::HomeChannelChallenged(e) => handler.handle_home_channel_challenged(e),
            ContractEvent::HomeChannelClosed(e) => handler.handle_home_channel_closed(e),
            ContractEvent::HomeChannelMigratedIn(e) => handler.handle_home_channel_migrated_in(e),
            ContractEvent::HomeChannelMigratedOut(e) => {
                handler.handle_home_channel_migrated_out(e)
            }
            ContractEvent::EscrowDepositInitiated(e) => handler.handle_escrow_deposit_initiated(e),
            ContractEvent::EscrowDepositChallenged(e) => {
                handler.handle_escrow_deposit_challenged(e)
            }
            ContractEvent::EscrowDepositFinalized(e) => handler.handle_escrow_deposit_finalized(e),
            ContractEvent::EscrowWithdrawalInitiated(e) => {
                handler.handle_escrow_withdrawal_initiated(e)
            }
            ContractEvent::EscrowWithdrawalChallenged(e) => {
                handler.handle_escrow_withdrawal_challenged(e)
            }
            ContractEvent::EscrowWithdrawalFinalized(e) => {
                handler.handle_escrow_withdrawal_finalized(e)
            }
            ContractEvent::EscrowDepositsPurged(e) => handler.handle_escrow_deposits_purged(e),
            ContractEvent::Deposited(e) => handler.handle_funds_deposited(e),
            ContractEvent::Withdrawn(e) => handler.handle_funds_withdrawn(e),
        }
    }
}
