//! # Test Fixtures
//!
//! Builders shared by the integration scenarios and the benchmarks.

use alloy_primitives::{Address, B256};
use alloy_sol_types::SolEvent;
use chrono::Utc;
use cn_02_channel_engine::{ChannelService, MemoryStore};
use cn_03_event_ingestion::{EventReactor, EventTable, RawLog, StoreEventLog};
use shared_types::{BlockchainId, Channel, ChannelId, ChannelParams, ChannelStatus, ChannelType};
use std::sync::Arc;

/// Chain every scenario runs on.
pub const CHAIN: BlockchainId = 1;

/// Reactor over the in-memory store.
pub type TestReactor = EventReactor<ChannelService<MemoryStore>, StoreEventLog<MemoryStore>>;

/// Settlement contract address.
pub fn contract() -> Address {
    Address::repeat_byte(0xC0)
}

/// Deterministic channel id.
pub fn channel_id(b: u8) -> ChannelId {
    B256::repeat_byte(b)
}

/// Insert a channel created out of band.
pub fn seed_channel(
    store: &MemoryStore,
    id: ChannelId,
    channel_type: ChannelType,
    status: ChannelStatus,
    version: u64,
) {
    let mut channel = Channel::new(
        ChannelParams {
            channel_id: id,
            channel_type,
            user_wallet: Address::repeat_byte(0xAA),
            blockchain_id: CHAIN,
            token_address: Address::repeat_byte(0x70),
            nonce: 1,
        },
        Utc::now(),
    );
    channel.status = status;
    channel.state_version = version;
    store
        .insert_channel(channel)
        .expect("channel ids are unique per scenario");
}

/// Reactor wired to `store` for both state and dedup.
pub fn reactor(store: &MemoryStore) -> TestReactor {
    EventReactor::new(
        CHAIN,
        Arc::new(EventTable::new()),
        Arc::new(ChannelService::new(store.clone())),
        Arc::new(StoreEventLog::new(store.clone())),
    )
}

/// Hands out increasing `(block, index)` positions for emitted events.
#[derive(Debug)]
pub struct LogFactory {
    contract: Address,
    block: u64,
    index: u64,
}

impl LogFactory {
    /// Start at `block`, index 0.
    pub fn new(contract: Address, block: u64) -> Self {
        Self {
            contract,
            block,
            index: 0,
        }
    }

    /// Next log in the current block.
    pub fn log<E: SolEvent>(&mut self, event: &E) -> RawLog {
        let log = self.at(event, self.block, self.index);
        self.index += 1;
        log
    }

    /// Move to the next block.
    pub fn next_block(&mut self) {
        self.block += 1;
        self.index = 0;
    }

    /// Log at an explicit position.
    pub fn at<E: SolEvent>(&self, event: &E, block: u64, index: u64) -> RawLog {
        RawLog::from_log_data(
            self.contract,
            event.encode_log_data(),
            block,
            index,
            B256::with_last_byte((block % 256) as u8),
        )
    }
}
