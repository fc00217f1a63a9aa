//! # Outbound Ports
//!
//! The chain the listener reads from and the dedup log it resumes from.

use crate::domain::{IngestionError, RawLog};
use alloy_primitives::Address;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{BlockchainId, ContractEventRecord, EventKey};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Chain client - outbound port.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current head block number.
    async fn block_number(&self) -> Result<u64, IngestionError>;

    /// All logs of `contract` in `from_block..=to_block`.
    async fn filter_logs(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, IngestionError>;

    /// Push subscription for new logs of `contract`, without topic filter.
    async fn subscribe_logs(&self, contract: Address) -> Result<LogSubscription, IngestionError>;
}

/// Stream of live logs.
///
/// `Some(Err(_))` reports a broken subscription; `None` means the provider
/// closed it.
pub struct LogSubscription {
    rx: mpsc::Receiver<Result<RawLog, IngestionError>>,
}

impl LogSubscription {
    /// Wrap a receiver fed by the transport.
    pub fn new(rx: mpsc::Receiver<Result<RawLog, IngestionError>>) -> Self {
        Self { rx }
    }

    /// Next log or error.
    pub async fn next(&mut self) -> Option<Result<RawLog, IngestionError>> {
        self.rx.recv().await
    }
}

/// Dedup log - outbound port.
pub trait EventLog: Send + Sync {
    /// Highest recorded `(block, log index)` for a contract on a chain.
    fn latest_position(
        &self,
        contract: &Address,
        blockchain_id: BlockchainId,
    ) -> Result<Option<(u64, u64)>, IngestionError>;

    /// Whether the log was already recorded.
    fn is_processed(&self, key: &EventKey) -> Result<bool, IngestionError>;

    /// Record a processed log; `false` if it was already there.
    fn record(&self, record: ContractEventRecord) -> Result<bool, IngestionError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

type LiveSender = mpsc::Sender<Result<RawLog, IngestionError>>;

/// Scriptable in-memory chain.
#[derive(Default)]
pub struct MockChainClient {
    head: AtomicU64,
    logs: Mutex<Vec<RawLog>>,
    filter_failures: AtomicU32,
    subscribe_failures: AtomicU32,
    filter_calls: Mutex<Vec<(u64, u64)>>,
    subscriptions: AtomicU32,
    live: Mutex<Vec<(Address, LiveSender)>>,
}

impl MockChainClient {
    /// Chain at `head` with no logs.
    pub fn new(head: u64) -> Self {
        Self {
            head: AtomicU64::new(head),
            ..Default::default()
        }
    }

    /// Add a log visible to range queries.
    pub fn push_log(&self, log: RawLog) {
        self.logs.lock().push(log);
    }

    /// Move the head.
    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    /// Fail the next `n` range queries.
    pub fn fail_next_filters(&self, n: u32) {
        self.filter_failures.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` subscription attempts.
    pub fn fail_next_subscribes(&self, n: u32) {
        self.subscribe_failures.store(n, Ordering::SeqCst);
    }

    /// Ranges requested so far.
    pub fn filter_calls(&self) -> Vec<(u64, u64)> {
        self.filter_calls.lock().clone()
    }

    /// Successful subscriptions so far.
    pub fn subscription_count(&self) -> u32 {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Deliver a log to every open subscription on its emitting contract.
    /// Returns how many received it.
    pub fn emit_live(&self, log: RawLog) -> usize {
        let mut live = self.live.lock();
        live.retain(|(_, tx)| !tx.is_closed());
        live.iter()
            .filter(|(contract, _)| *contract == log.address)
            .filter(|(_, tx)| tx.try_send(Ok(log.clone())).is_ok())
            .count()
    }

    /// Break every open subscription with an error.
    pub fn break_subscriptions(&self) {
        let live = std::mem::take(&mut *self.live.lock());
        for (_, tx) in live {
            let _ = tx.try_send(Err(IngestionError::Subscription(
                "connection reset".to_string(),
            )));
        }
    }

    /// Close every open subscription cleanly.
    pub fn close_subscriptions(&self) {
        self.live.lock().clear();
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn block_number(&self) -> Result<u64, IngestionError> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn filter_logs(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, IngestionError> {
        self.filter_calls.lock().push((from_block, to_block));
        if Self::take_failure(&self.filter_failures) {
            return Err(IngestionError::Rpc("mock range failure".to_string()));
        }

        Ok(self
            .logs
            .lock()
            .iter()
            .filter(|l| {
                l.address == contract && l.block_number >= from_block && l.block_number <= to_block
            })
            .cloned()
            .collect())
    }

    async fn subscribe_logs(&self, contract: Address) -> Result<LogSubscription, IngestionError> {
        if Self::take_failure(&self.subscribe_failures) {
            return Err(IngestionError::Subscription("mock dial failure".to_string()));
        }
        let (tx, rx) = mpsc::channel(64);
        self.live.lock().push((contract, tx));
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(LogSubscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, B256};

    fn log(block: u64) -> RawLog {
        RawLog {
            address: Address::repeat_byte(1),
            topics: vec![B256::ZERO],
            data: Bytes::new(),
            block_number: block,
            log_index: 0,
            transaction_hash: B256::ZERO,
        }
    }

    #[tokio::test]
    async fn test_filter_respects_range() {
        let client = MockChainClient::new(100);
        client.push_log(log(5));
        client.push_log(log(50));
        client.push_log(log(95));

        let logs = client
            .filter_logs(Address::repeat_byte(1), 10, 95)
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(client.filter_calls(), vec![(10, 95)]);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let client = MockChainClient::new(100);
        client.fail_next_filters(1);

        assert!(client.filter_logs(Address::ZERO, 0, 1).await.is_err());
        assert!(client.filter_logs(Address::ZERO, 0, 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_live_delivery_and_break() {
        let client = MockChainClient::new(100);
        let mut sub = client.subscribe_logs(Address::repeat_byte(1)).await.unwrap();

        assert_eq!(client.emit_live(log(101)), 1);
        assert_eq!(sub.next().await.unwrap().unwrap().block_number, 101);

        client.break_subscriptions();
        assert!(sub.next().await.unwrap().is_err());
        assert!(sub.next().await.is_none());
    }
}
