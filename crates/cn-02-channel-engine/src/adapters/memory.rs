//! # In-Memory Store
//!
//! `Store` adapter backed by a mutex-guarded snapshot. A transaction writes
//! straight into the locked snapshot and journals an undo entry per write;
//! `Err` or a panic inside the closure replays the journal in reverse. The
//! mutex is held for the whole transaction, which serialises writers.

use crate::domain::StoreError;
use crate::ports::{Store, StoreTxProvider};
use parking_lot::Mutex;
use shared_types::{
    Address, BlockchainId, Channel, ChannelId, ChannelStatus, ChannelType, CheckpointAction,
    ContractEventRecord, EventKey, State, Transaction,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Snapshot {
    channels: HashMap<ChannelId, Channel>,
    states: Vec<State>,
    transactions: Vec<Transaction>,
    checkpoints: Vec<CheckpointAction>,
    events: BTreeMap<EventKey, ContractEventRecord>,
}

/// Inverse of one write.
enum Undo {
    ChannelInserted(ChannelId),
    ChannelReplaced(Box<Channel>),
    StatePushed,
    TransactionPushed,
    CheckpointPushed,
    CheckpointsTaken(Vec<CheckpointAction>),
    EventInserted(EventKey),
}

impl Snapshot {
    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::ChannelInserted(id) => {
                self.channels.remove(&id);
            }
            Undo::ChannelReplaced(previous) => {
                self.channels.insert(previous.channel_id, *previous);
            }
            Undo::StatePushed => {
                self.states.pop();
            }
            Undo::TransactionPushed => {
                self.transactions.pop();
            }
            Undo::CheckpointPushed => {
                self.checkpoints.pop();
            }
            Undo::CheckpointsTaken(taken) => {
                // Anything scheduled after the take was already reverted
                self.checkpoints = taken;
            }
            Undo::EventInserted(key) => {
                self.events.remove(&key);
            }
        }
    }
}

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Snapshot>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write inside later transactions fail (fault injection).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a channel outside the event flow.
    pub fn insert_channel(&self, channel: Channel) -> Result<(), StoreError> {
        self.transact(|store| store.create_channel(channel))
    }

    /// Committed copy of a channel.
    pub fn channel(&self, channel_id: &ChannelId) -> Option<Channel> {
        self.inner.lock().channels.get(channel_id).cloned()
    }

    /// Committed checkpoint queue.
    pub fn pending_checkpoints(&self) -> Vec<CheckpointAction> {
        self.inner.lock().checkpoints.clone()
    }

    /// Committed dedup records in key order.
    pub fn contract_events(&self) -> Vec<ContractEventRecord> {
        self.inner.lock().events.values().cloned().collect()
    }

    /// Committed ledger transactions.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().transactions.clone()
    }
}

impl StoreTxProvider for MemoryStore {
    fn transact<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Store) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut guard = self.inner.lock();
        let mut tx = MemoryTx {
            working: &mut *guard,
            journal: Vec::new(),
            committed: false,
            fail_writes: self.fail_writes.load(Ordering::SeqCst),
        };

        let result = f(&mut tx)?;
        tx.committed = true;
        Ok(result)
    }
}

struct MemoryTx<'a> {
    working: &'a mut Snapshot,
    journal: Vec<Undo>,
    committed: bool,
    fail_writes: bool,
}

impl Drop for MemoryTx<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        while let Some(undo) = self.journal.pop() {
            self.working.revert(undo);
        }
    }
}

impl MemoryTx<'_> {
    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Backend("write rejected".to_string()));
        }
        Ok(())
    }

    fn latest_state<P>(&self, signed_only: bool, predicate: P) -> Option<State>
    where
        P: Fn(&State) -> bool,
    {
        self.working
            .states
            .iter()
            .filter(|s| !signed_only || s.is_signed())
            .filter(|s| predicate(s))
            .max_by_key(|s| s.ordering_key())
            .cloned()
    }
}

impl Store for MemoryTx<'_> {
    fn get_channel_by_id(&self, channel_id: &ChannelId) -> Result<Option<Channel>, StoreError> {
        Ok(self.working.channels.get(channel_id).cloned())
    }

    fn create_channel(&mut self, channel: Channel) -> Result<(), StoreError> {
        self.check_writable()?;
        if self.working.channels.contains_key(&channel.channel_id) {
            return Err(StoreError::ChannelExists(channel.channel_id));
        }
        let id = channel.channel_id;
        self.working.channels.insert(id, channel);
        self.journal.push(Undo::ChannelInserted(id));
        Ok(())
    }

    fn update_channel(&mut self, channel: &Channel) -> Result<(), StoreError> {
        self.check_writable()?;
        match self.working.channels.get_mut(&channel.channel_id) {
            Some(existing) => {
                let previous = std::mem::replace(existing, channel.clone());
                self.journal.push(Undo::ChannelReplaced(Box::new(previous)));
                Ok(())
            }
            None => Err(StoreError::ChannelNotFound(channel.channel_id)),
        }
    }

    fn get_last_user_state(
        &self,
        wallet: &Address,
        asset: &str,
        signed_only: bool,
    ) -> Result<Option<State>, StoreError> {
        Ok(self.latest_state(signed_only, |s| {
            s.user_wallet == *wallet && s.asset == asset
        }))
    }

    fn get_last_channel_state(
        &self,
        channel_id: &ChannelId,
        signed_only: bool,
    ) -> Result<Option<State>, StoreError> {
        Ok(self.latest_state(signed_only, |s| {
            s.home_channel_id.as_ref() == Some(channel_id)
                || s.escrow_channel_id.as_ref() == Some(channel_id)
        }))
    }

    fn store_user_state(&mut self, state: State) -> Result<(), StoreError> {
        self.check_writable()?;
        self.working.states.push(state);
        self.journal.push(Undo::StatePushed);
        Ok(())
    }

    fn record_transaction(&mut self, transaction: Transaction) -> Result<(), StoreError> {
        self.check_writable()?;
        self.working.transactions.push(transaction);
        self.journal.push(Undo::TransactionPushed);
        Ok(())
    }

    fn check_open_channel(&self, wallet: &Address, asset: &str) -> Result<bool, StoreError> {
        Ok(self
            .get_active_home_channel(wallet, asset)?
            .is_some_and(|c| c.status == ChannelStatus::Open))
    }

    fn get_active_home_channel(
        &self,
        wallet: &Address,
        asset: &str,
    ) -> Result<Option<Channel>, StoreError> {
        let Some(state) = self.get_last_user_state(wallet, asset, false)? else {
            return Ok(None);
        };
        let Some(home_id) = state.home_channel_id else {
            return Ok(None);
        };
        Ok(self
            .working
            .channels
            .get(&home_id)
            .filter(|c| c.channel_type == ChannelType::Home && c.is_active())
            .cloned())
    }

    fn schedule_checkpoint(&mut self, action: CheckpointAction) -> Result<(), StoreError> {
        self.check_writable()?;
        self.working.checkpoints.push(action);
        self.journal.push(Undo::CheckpointPushed);
        Ok(())
    }

    fn take_pending_checkpoints(&mut self) -> Result<Vec<CheckpointAction>, StoreError> {
        self.check_writable()?;
        let taken = std::mem::take(&mut self.working.checkpoints);
        self.journal.push(Undo::CheckpointsTaken(taken.clone()));
        Ok(taken)
    }

    fn store_contract_event(&mut self, record: ContractEventRecord) -> Result<bool, StoreError> {
        self.check_writable()?;
        let key = record.key();
        if self.working.events.contains_key(&key) {
            return Ok(false);
        }
        self.working.events.insert(key, record);
        self.journal.push(Undo::EventInserted(key));
        Ok(true)
    }

    fn get_latest_contract_event(
        &self,
        contract_address: &Address,
        blockchain_id: BlockchainId,
    ) -> Result<Option<ContractEventRecord>, StoreError> {
        let bound = |block_number, log_index| EventKey {
            blockchain_id,
            contract_address: *contract_address,
            block_number,
            log_index,
        };
        // Keys order by (chain, contract, block, index)
        Ok(self
            .working
            .events
            .range(bound(0, 0)..=bound(u64::MAX, u64::MAX))
            .next_back()
            .map(|(_, record)| record.clone()))
    }

    fn is_event_processed(&self, key: &EventKey) -> Result<bool, StoreError> {
        Ok(self.working.events.contains_key(key))
    }
}
