//! # Chain Bookkeeping Records
//!
//! `ContractEventRecord` marks a contract log as processed. Its natural key
//! `(blockchain_id, contract_address, block_number, log_index)` makes
//! re-insertion of the same log a no-op and its maximum is the listener's
//! resume point.

use crate::{BlockchainId, ChannelId};
use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Natural key of a processed log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    /// Chain the log was emitted on.
    pub blockchain_id: BlockchainId,
    /// Emitting contract.
    pub contract_address: Address,
    /// Block containing the log.
    pub block_number: u64,
    /// Position of the log within the block.
    pub log_index: u64,
}

/// Dedup record of a processed contract log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEventRecord {
    /// Chain the log was emitted on.
    pub blockchain_id: BlockchainId,
    /// Emitting contract.
    pub contract_address: Address,
    /// Block containing the log.
    pub block_number: u64,
    /// Position of the log within the block.
    pub log_index: u64,
    /// Decoded event name.
    pub name: String,
    /// Emitting transaction.
    pub transaction_hash: B256,
    /// Record time.
    pub created_at: DateTime<Utc>,
}

impl ContractEventRecord {
    /// Natural key.
    pub fn key(&self) -> EventKey {
        EventKey {
            blockchain_id: self.blockchain_id,
            contract_address: self.contract_address,
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }

    /// `(block_number, log_index)` position used for resume comparisons.
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}

/// A corrective on-chain checkpoint queued after a stale challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointAction {
    /// Channel under dispute.
    pub channel_id: ChannelId,
    /// Known-good state to submit, when the node holds one.
    pub state_id: Option<B256>,
    /// Version the counterparty challenged with.
    pub challenged_version: u64,
    /// Queue time.
    pub scheduled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_name_and_hash() {
        let a = ContractEventRecord {
            blockchain_id: 1,
            contract_address: Address::repeat_byte(9),
            block_number: 10,
            log_index: 2,
            name: "ChannelCreated".to_string(),
            transaction_hash: B256::repeat_byte(1),
            created_at: Utc::now(),
        };
        let mut b = a.clone();
        b.name = "ChannelClosed".to_string();
        b.transaction_hash = B256::repeat_byte(2);

        assert_eq!(a.key(), b.key());
        assert_eq!(a.position(), (10, 2));
    }

    #[test]
    fn test_record_serializes() {
        let record = ContractEventRecord {
            blockchain_id: 1,
            contract_address: Address::ZERO,
            block_number: 31_527_936,
            log_index: 0,
            name: "ChannelCheckpointed".to_string(),
            transaction_hash: B256::ZERO,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("ChannelCheckpointed"));
    }
}
