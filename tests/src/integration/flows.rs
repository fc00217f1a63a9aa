//! # Chain Log Flows
//!
//! Encoded contract logs go through the reactor into the channel state
//! machine and the dedup log, all over one `MemoryStore`.

use super::fixtures::{channel_id, contract, reactor, seed_channel, LogFactory, CHAIN};
use alloy_primitives::{Address, U256};
use cn_02_channel_engine::MemoryStore;
use cn_03_event_ingestion::domain::contract::{
    ChannelChallenged, ChannelCheckpointed, ChannelClosed, ChannelCreated, ChannelMigratedIn,
    Deposited, EscrowDepositFinalized, EscrowDepositInitiated, EscrowWithdrawalChallenged,
    EscrowWithdrawalInitiated,
};
use cn_03_event_ingestion::{EventLog, LogOutcome, StoreEventLog};
use shared_types::{ChannelStatus, ChannelType};

const EXPIRY: u64 = 1_900_000_000;

// =============================================================================
// HOME CHANNEL LIFECYCLE
// =============================================================================

#[test]
fn test_create_checkpoint_close_then_late_challenge_is_noop() {
    let store = MemoryStore::new();
    let id = channel_id(1);
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Void, 0);
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 100);

    let created = logs.log(&ChannelCreated {
        channelId: id,
        user: Address::repeat_byte(0xAA),
        stateVersion: 1,
    });
    assert_eq!(reactor.handle_log(&created), LogOutcome::Applied);
    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Open);
    assert_eq!(channel.state_version, 1);

    logs.next_block();
    let checkpoint = logs.log(&ChannelCheckpointed {
        channelId: id,
        stateVersion: 5,
    });
    assert_eq!(reactor.handle_log(&checkpoint), LogOutcome::Applied);
    assert_eq!(store.channel(&id).unwrap().state_version, 5);

    let close = logs.log(&ChannelClosed {
        channelId: id,
        stateVersion: 10,
    });
    assert_eq!(reactor.handle_log(&close), LogOutcome::Applied);

    logs.next_block();
    let challenge = logs.log(&ChannelChallenged {
        channelId: id,
        stateVersion: 11,
        challengeExpiry: EXPIRY,
    });
    assert_eq!(reactor.handle_log(&challenge), LogOutcome::Applied);

    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Closed);
    assert_eq!(channel.state_version, 10);
    assert!(channel.challenge_expires_at.is_none());
    assert_eq!(store.contract_events().len(), 4);
}

#[test]
fn test_challenge_then_cure_by_checkpoint() {
    let store = MemoryStore::new();
    let id = channel_id(2);
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Open, 3);
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 200);

    reactor.handle_log(&logs.log(&ChannelChallenged {
        channelId: id,
        stateVersion: 4,
        challengeExpiry: EXPIRY,
    }));
    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Challenged);
    assert_eq!(channel.state_version, 4);
    assert_eq!(
        channel.challenge_expires_at.map(|t| t.timestamp()),
        Some(EXPIRY as i64)
    );

    reactor.handle_log(&logs.log(&ChannelCheckpointed {
        channelId: id,
        stateVersion: 5,
    }));
    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Open);
    assert_eq!(channel.state_version, 5);
    assert!(channel.challenge_expires_at.is_none());
}

#[test]
fn test_stale_challenge_without_signed_state_still_queues_checkpoint() {
    let store = MemoryStore::new();
    let id = channel_id(3);
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Open, 5);
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 300);

    reactor.handle_log(&logs.log(&ChannelChallenged {
        channelId: id,
        stateVersion: 3,
        challengeExpiry: EXPIRY,
    }));

    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Challenged);
    assert_eq!(channel.state_version, 5);
    assert!(channel.challenge_expires_at.is_some());

    let pending = store.pending_checkpoints();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].channel_id, id);
    assert_eq!(pending[0].challenged_version, 3);
    assert_eq!(pending[0].state_id, None);
}

#[test]
fn test_void_channel_never_challenged() {
    let store = MemoryStore::new();
    let id = channel_id(4);
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Void, 0);
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 400);

    reactor.handle_log(&logs.log(&ChannelChallenged {
        channelId: id,
        stateVersion: 1,
        challengeExpiry: EXPIRY,
    }));

    assert_eq!(store.channel(&id).unwrap().status, ChannelStatus::Void);
    assert!(store.pending_checkpoints().is_empty());
}

// =============================================================================
// TYPE SAFETY AND UNKNOWN CHANNELS
// =============================================================================

#[test]
fn test_home_event_on_escrow_channel_leaves_it_untouched() {
    let store = MemoryStore::new();
    let id = channel_id(5);
    seed_channel(&store, id, ChannelType::Escrow, ChannelStatus::Open, 2);
    let before = store.channel(&id).unwrap();
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 500);

    let outcome = reactor.handle_log(&logs.log(&ChannelClosed {
        channelId: id,
        stateVersion: 9,
    }));

    assert_eq!(outcome, LogOutcome::Applied);
    assert_eq!(store.channel(&id).unwrap(), before);
    assert_eq!(store.contract_events().len(), 1);
}

#[test]
fn test_event_for_unknown_channel_is_recorded() {
    let store = MemoryStore::new();
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 600);

    let outcome = reactor.handle_log(&logs.log(&ChannelCheckpointed {
        channelId: channel_id(0xEE),
        stateVersion: 1,
    }));

    assert_eq!(outcome, LogOutcome::Applied);
    assert!(store.channel(&channel_id(0xEE)).is_none());
    assert_eq!(store.contract_events().len(), 1);
}

// =============================================================================
// ESCROW LIFECYCLES
// =============================================================================

#[test]
fn test_escrow_deposit_open_and_finalize() {
    let store = MemoryStore::new();
    let id = channel_id(6);
    seed_channel(&store, id, ChannelType::Escrow, ChannelStatus::Void, 0);
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 700);

    reactor.handle_log(&logs.log(&EscrowDepositInitiated {
        escrowId: id,
        stateVersion: 1,
    }));
    assert_eq!(store.channel(&id).unwrap().status, ChannelStatus::Open);

    reactor.handle_log(&logs.log(&EscrowDepositFinalized {
        escrowId: id,
        stateVersion: 2,
    }));
    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Closed);
    assert_eq!(channel.state_version, 2);
}

#[test]
fn test_escrow_withdrawal_challenge() {
    let store = MemoryStore::new();
    let id = channel_id(7);
    seed_channel(&store, id, ChannelType::Escrow, ChannelStatus::Void, 0);
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 800);

    reactor.handle_log(&logs.log(&EscrowWithdrawalInitiated {
        escrowId: id,
        stateVersion: 1,
    }));
    reactor.handle_log(&logs.log(&EscrowWithdrawalChallenged {
        escrowId: id,
        stateVersion: 2,
        challengeExpiry: EXPIRY,
    }));

    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Challenged);
    assert_eq!(channel.state_version, 2);
}

// =============================================================================
// DEDUP AND PLACEHOLDER FAMILIES
// =============================================================================

#[test]
fn test_same_log_twice_is_applied_once() {
    let store = MemoryStore::new();
    let id = channel_id(8);
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Open, 3);
    let reactor = reactor(&store);
    let logs = LogFactory::new(contract(), 900);

    let challenge = logs.at(
        &ChannelChallenged {
            channelId: id,
            stateVersion: 4,
            challengeExpiry: EXPIRY,
        },
        900,
        0,
    );
    assert_eq!(reactor.handle_log(&challenge), LogOutcome::Applied);

    // Cure in between; a redelivered challenge must not re-challenge.
    reactor.handle_log(&logs.at(
        &ChannelCheckpointed {
            channelId: id,
            stateVersion: 5,
        },
        901,
        0,
    ));
    assert_eq!(reactor.handle_log(&challenge), LogOutcome::Duplicate);

    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Open);
    assert_eq!(channel.state_version, 5);
    assert_eq!(store.contract_events().len(), 2);
}

#[test]
fn test_placeholder_families_are_recorded_without_mutation() {
    let store = MemoryStore::new();
    let id = channel_id(9);
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Open, 3);
    let before = store.channel(&id).unwrap();
    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 1_000);

    let migrated = reactor.handle_log(&logs.log(&ChannelMigratedIn {
        channelId: id,
        stateVersion: 8,
    }));
    let deposited = reactor.handle_log(&logs.log(&Deposited {
        wallet: Address::repeat_byte(0xAA),
        token: Address::repeat_byte(0x70),
        amount: U256::from(1_000u64),
    }));

    assert_eq!(migrated, LogOutcome::Unhandled);
    assert_eq!(deposited, LogOutcome::Unhandled);
    assert_eq!(store.channel(&id).unwrap(), before);
    assert_eq!(store.contract_events().len(), 2);
}

#[test]
fn test_dedup_log_reports_resume_position() {
    let store = MemoryStore::new();
    let reactor = reactor(&store);
    let logs = LogFactory::new(contract(), 0);

    for (block, index) in [(31_527_935, 4), (31_527_936, 0), (31_527_936, 1)] {
        reactor.handle_log(&logs.at(
            &ChannelCheckpointed {
                channelId: channel_id(0x10),
                stateVersion: 1,
            },
            block,
            index,
        ));
    }

    let event_log = StoreEventLog::new(store.clone());
    assert_eq!(
        event_log.latest_position(&contract(), CHAIN).unwrap(),
        Some((31_527_936, 1))
    );
    assert_eq!(
        event_log.latest_position(&Address::repeat_byte(0x01), CHAIN).unwrap(),
        None
    );
}
