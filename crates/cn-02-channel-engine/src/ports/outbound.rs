//! # Outbound Ports
//!
//! Persistence the state machine depends on. Every method runs against a
//! store bound to an open transaction; [`StoreTxProvider::transact`] is the
//! only way to obtain one.

use crate::domain::StoreError;
use shared_types::{
    Address, BlockchainId, Channel, ChannelId, CheckpointAction, ContractEventRecord, EventKey,
    State, Transaction,
};

/// Transaction-bound store.
pub trait Store {
    /// Load a channel.
    fn get_channel_by_id(&self, channel_id: &ChannelId) -> Result<Option<Channel>, StoreError>;

    /// Insert a new channel (out-of-band creation).
    fn create_channel(&mut self, channel: Channel) -> Result<(), StoreError>;

    /// Overwrite an existing channel.
    fn update_channel(&mut self, channel: &Channel) -> Result<(), StoreError>;

    /// Latest state of `wallet` for `asset` by `(epoch, version)`.
    ///
    /// With `signed_only`, states that are not quorum-signed are skipped.
    fn get_last_user_state(
        &self,
        wallet: &Address,
        asset: &str,
        signed_only: bool,
    ) -> Result<Option<State>, StoreError>;

    /// Latest state referencing `channel_id` as home or escrow channel.
    fn get_last_channel_state(
        &self,
        channel_id: &ChannelId,
        signed_only: bool,
    ) -> Result<Option<State>, StoreError>;

    /// Persist a new state. States are immutable once stored.
    fn store_user_state(&mut self, state: State) -> Result<(), StoreError>;

    /// Append a ledger transaction.
    fn record_transaction(&mut self, transaction: Transaction) -> Result<(), StoreError>;

    /// Whether `wallet` has an open home channel for `asset`.
    fn check_open_channel(&self, wallet: &Address, asset: &str) -> Result<bool, StoreError>;

    /// Home channel of `wallet` for `asset` that is open or challenged.
    fn get_active_home_channel(
        &self,
        wallet: &Address,
        asset: &str,
    ) -> Result<Option<Channel>, StoreError>;

    /// Queue a corrective checkpoint for the chain writer.
    fn schedule_checkpoint(&mut self, action: CheckpointAction) -> Result<(), StoreError>;

    /// Drain the checkpoint queue in scheduling order. A rolled back
    /// transaction leaves the queue as it was.
    fn take_pending_checkpoints(&mut self) -> Result<Vec<CheckpointAction>, StoreError>;

    /// Record a processed log. Idempotent on the natural key; returns
    /// `false` if the record already existed.
    fn store_contract_event(&mut self, record: ContractEventRecord) -> Result<bool, StoreError>;

    /// Highest recorded `(block, log index)` for one contract on one chain.
    fn get_latest_contract_event(
        &self,
        contract_address: &Address,
        blockchain_id: BlockchainId,
    ) -> Result<Option<ContractEventRecord>, StoreError>;

    /// Whether a log has been recorded.
    fn is_event_processed(&self, key: &EventKey) -> Result<bool, StoreError>;
}

/// Unit of work over a [`Store`].
///
/// The closure receives a transaction-bound store. `Ok` commits, `Err`
/// rolls back; a panic inside the closure also leaves storage untouched.
pub trait StoreTxProvider: Send + Sync {
    /// Run `f` inside one transaction.
    fn transact<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Store) -> Result<T, E>,
        E: From<StoreError>;
}
