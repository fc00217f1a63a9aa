//! # Store-Backed Event Log
//!
//! Dedup records live next to the channels in the same store, one
//! transaction per call.

use crate::domain::IngestionError;
use crate::ports::EventLog;
use alloy_primitives::Address;
use cn_02_channel_engine::StoreTxProvider;
use shared_types::{BlockchainId, ContractEventRecord, EventKey};

/// `EventLog` over a channel engine store.
pub struct StoreEventLog<P: StoreTxProvider> {
    store: P,
}

impl<P: StoreTxProvider> StoreEventLog<P> {
    /// Wrap a store provider.
    pub fn new(store: P) -> Self {
        Self { store }
    }
}

impl<P: StoreTxProvider> EventLog for StoreEventLog<P> {
    fn latest_position(
        &self,
        contract: &Address,
        blockchain_id: BlockchainId,
    ) -> Result<Option<(u64, u64)>, IngestionError> {
        self.store.transact(|store| {
            Ok(store
                .get_latest_contract_event(contract, blockchain_id)?
                .map(|r| r.position()))
        })
    }

    fn is_processed(&self, key: &EventKey) -> Result<bool, IngestionError> {
        self.store
            .transact(|store| Ok(store.is_event_processed(key)?))
    }

    fn record(&self, record: ContractEventRecord) -> Result<bool, IngestionError> {
        self.store
            .transact(|store| Ok(store.store_contract_event(record)?))
    }
}
