//! # Listener Configuration

use crate::domain::ListenerError;
use alloy_primitives::Address;
use shared_types::BlockchainId;
use std::time::Duration;

/// Default blocks per historical range query.
pub const DEFAULT_BLOCK_STEP: u64 = 10_000;

/// Default live channel capacity.
pub const DEFAULT_LIVE_BUFFER: usize = 100;

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default consecutive-failure budget.
pub const DEFAULT_MAX_BACKOFF_RETRIES: u32 = 10;

/// Settings for one contract/chain listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Chain the contract lives on
    pub blockchain_id: BlockchainId,
    /// Contract to follow
    pub contract_address: Address,
    /// Backfill start when no dedup record exists (0 = live only)
    pub start_block: u64,
    /// Blocks per range query
    pub block_step: u64,
    /// Historical channel capacity
    pub historical_buffer: usize,
    /// Live channel capacity
    pub live_buffer: usize,
    /// Deadline for each chain request
    pub request_timeout: Duration,
    /// Failures tolerated before the listener aborts
    pub max_backoff_retries: u32,
    /// Backoff base; the n-th wait is `(2^n - 1) * backoff_unit`
    pub backoff_unit: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            blockchain_id: 1,
            contract_address: Address::ZERO,
            start_block: 0,
            block_step: DEFAULT_BLOCK_STEP,
            historical_buffer: 1,
            live_buffer: DEFAULT_LIVE_BUFFER,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_backoff_retries: DEFAULT_MAX_BACKOFF_RETRIES,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl ListenerConfig {
    /// Reject settings the listener cannot run with.
    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.block_step == 0 {
            return Err(ListenerError::InvalidConfig(
                "block_step must be positive".to_string(),
            ));
        }
        if self.historical_buffer == 0 || self.live_buffer == 0 {
            return Err(ListenerError::InvalidConfig(
                "channel buffers must be positive".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ListenerError::InvalidConfig(
                "request_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
