//! # Signed State Recovery
//!
//! States signed through the codec are persisted; a stale challenge then
//! queues a checkpoint pointing at the latest quorum-signed one.

use super::fixtures::{channel_id, contract, reactor, seed_channel, LogFactory, CHAIN};
use alloy_primitives::{Address, Bytes, B256, U256};
use chrono::Utc;
use cn_01_state_auth::{
    sign_state, state_hash, verify_quorum, verify_state, Allocation, Intent, QuorumPolicy,
    UnsignedState,
};
use cn_02_channel_engine::{MemoryStore, Store, StoreError, StoreTxProvider};
use cn_03_event_ingestion::domain::contract::ChannelChallenged;
use shared_crypto::PrivateKey;
use shared_types::{ChannelId, ChannelStatus, ChannelType, Decimal, Ledger, State};

struct Participants {
    owner: PrivateKey,
    nodes: Vec<PrivateKey>,
    outsider: PrivateKey,
}

impl Participants {
    fn new() -> Self {
        let key = |b: u8| PrivateKey::from_slice(&[b; 32]).unwrap();
        Self {
            owner: key(0x11),
            nodes: vec![key(0x21), key(0x22), key(0x23)],
            outsider: key(0x31),
        }
    }

    fn policy(&self) -> QuorumPolicy {
        QuorumPolicy::new(self.nodes.iter().map(|k| (k.address(), 1)), 2).unwrap()
    }
}

fn unsigned(id: ChannelId, version: u64) -> UnsignedState {
    UnsignedState {
        channel_id: id,
        intent: Intent::Operate,
        version: U256::from(version),
        data: Bytes::new(),
        allocations: vec![Allocation {
            destination: Address::repeat_byte(0xAA),
            token: Address::repeat_byte(0x70),
            amount: U256::from(10u64),
        }],
    }
}

fn persisted(
    id: ChannelId,
    unsigned: &UnsignedState,
    version: u64,
    owner_sig: Option<Bytes>,
    network_sigs: Vec<Bytes>,
) -> State {
    State {
        id: state_hash(unsigned),
        home_channel_id: Some(id),
        escrow_channel_id: None,
        asset: "usdc".to_string(),
        user_wallet: Address::repeat_byte(0xAA),
        epoch: 0,
        version,
        transitions: vec![],
        home_ledger: Ledger {
            token_address: Address::repeat_byte(0x70),
            blockchain_id: CHAIN,
            user_balance: Decimal::new(10, 0),
            user_net_flow: Decimal::new(10, 0),
            node_balance: Decimal::ZERO,
            node_net_flow: Decimal::ZERO,
        },
        escrow_ledger: None,
        owner_sig,
        network_sigs,
        created_at: Utc::now(),
    }
}

fn wire(key: &PrivateKey, state: &UnsignedState) -> Bytes {
    Bytes::copy_from_slice(&sign_state(state, key).unwrap().to_wire())
}

#[test]
fn test_quorum_over_wire_signatures() {
    let people = Participants::new();
    let state = unsigned(channel_id(1), 4);

    let owner_sig = wire(&people.owner, &state);
    assert!(verify_state(&state, &owner_sig, &people.owner.address()).unwrap());
    assert!(!verify_state(&state, &owner_sig, &people.nodes[0].address()).unwrap());

    let sigs = vec![wire(&people.nodes[0], &state), wire(&people.nodes[2], &state)];
    let outcome = verify_quorum(&state, &sigs, &people.policy()).unwrap();
    assert!(outcome.is_reached());
    assert_eq!(outcome.signed_weight, 2);
}

#[test]
fn test_duplicate_and_outsider_signatures_do_not_count() {
    let people = Participants::new();
    let state = unsigned(channel_id(1), 4);

    let sigs = vec![
        wire(&people.nodes[1], &state),
        wire(&people.nodes[1], &state),
        wire(&people.outsider, &state),
    ];
    let outcome = verify_quorum(&state, &sigs, &people.policy()).unwrap();
    assert!(!outcome.is_reached());
    assert_eq!(outcome.signers, vec![people.nodes[1].address()]);
}

#[test]
fn test_signature_over_other_version_does_not_count() {
    let people = Participants::new();
    let signed = unsigned(channel_id(1), 4);
    let presented = unsigned(channel_id(1), 5);

    let sigs = vec![wire(&people.nodes[0], &signed), wire(&people.nodes[1], &signed)];
    let outcome = verify_quorum(&presented, &sigs, &people.policy()).unwrap();
    assert!(!outcome.is_reached());
}

#[test]
fn test_stale_challenge_points_checkpoint_at_latest_quorum_state() {
    let people = Participants::new();
    let id = channel_id(0x51);
    let store = MemoryStore::new();
    seed_channel(&store, id, ChannelType::Home, ChannelStatus::Open, 6);

    // v4: owner + quorum. v6: owner only, so not eligible for a checkpoint.
    let v4 = unsigned(id, 4);
    let network: Vec<Bytes> = people.nodes[..2].iter().map(|k| wire(k, &v4)).collect();
    assert!(verify_quorum(&v4, &network, &people.policy())
        .unwrap()
        .is_reached());
    let quorum_state = persisted(id, &v4, 4, Some(wire(&people.owner, &v4)), network);

    let v6 = unsigned(id, 6);
    let user_state = persisted(id, &v6, 6, Some(wire(&people.owner, &v6)), vec![]);

    store
        .transact(|tx| -> Result<(), StoreError> {
            tx.store_user_state(quorum_state.clone())?;
            tx.store_user_state(user_state)
        })
        .unwrap();

    let reactor = reactor(&store);
    let mut logs = LogFactory::new(contract(), 5_000);
    reactor.handle_log(&logs.log(&ChannelChallenged {
        channelId: id,
        stateVersion: 3,
        challengeExpiry: 1_900_000_000,
    }));

    let channel = store.channel(&id).unwrap();
    assert_eq!(channel.status, ChannelStatus::Challenged);
    assert_eq!(channel.state_version, 6);

    let pending = store.pending_checkpoints();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].state_id, Some(quorum_state.id));
    assert_ne!(pending[0].state_id, Some(B256::ZERO));
}
