//! # Raw Logs
//!
//! Chain logs as delivered by a chain client, before decoding.

use alloy_primitives::{Address, Bytes, LogData, B256};
use shared_types::{BlockchainId, ContractEventRecord, EventKey};

/// One emitted contract log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// Emitting contract
    pub address: Address,
    /// Topic 0 is the event signature hash for non-anonymous events
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed fields
    pub data: Bytes,
    /// Block the log was included in
    pub block_number: u64,
    /// Position of the log within the block
    pub log_index: u64,
    /// Emitting transaction
    pub transaction_hash: B256,
}

impl RawLog {
    /// Build from encoded log data.
    pub fn from_log_data(
        address: Address,
        log: LogData,
        block_number: u64,
        log_index: u64,
        transaction_hash: B256,
    ) -> Self {
        Self {
            address,
            topics: log.topics().to_vec(),
            data: log.data,
            block_number,
            log_index,
            transaction_hash,
        }
    }

    /// Event signature hash, if any.
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }

    /// `(block_number, log_index)`.
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }

    /// Dedup key on `blockchain_id`.
    pub fn key(&self, blockchain_id: BlockchainId) -> EventKey {
        EventKey {
            blockchain_id,
            contract_address: self.address,
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }

    /// Dedup record for this log under `name`.
    pub fn to_record(&self, blockchain_id: BlockchainId, name: &str) -> ContractEventRecord {
        ContractEventRecord {
            blockchain_id,
            contract_address: self.address,
            block_number: self.block_number,
            log_index: self.log_index,
            name: name.to_string(),
            transaction_hash: self.transaction_hash,
            created_at: chrono::Utc::now(),
        }
    }
}
