//! # Domain Errors
//!
//! Ingestion (decode, RPC, store) and listener lifecycle errors.

use cn_02_channel_engine::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors from decoding logs and talking to the chain or the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestionError {
    /// Log payload does not match the event ABI
    #[error("Failed to decode {event}: {reason}")]
    Decode {
        /// Event the log was decoded as
        event: &'static str,
        /// Decoder message
        reason: String,
    },

    /// Chain node returned an error or an unusable response
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Chain request exceeded its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Push subscription failed
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Dedup store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that stop a listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// Consecutive failures exceeded the retry budget
    #[error("Backoff exhausted after {retries} retries")]
    BackoffExhausted {
        /// Configured maximum
        retries: u32,
    },

    /// Listener configuration rejected
    #[error("Invalid listener config: {0}")]
    InvalidConfig(String),

    /// Resume point could not be read
    #[error("Failed to read resume point: {0}")]
    Resume(IngestionError),

    /// A listener task panicked or was aborted
    #[error("Listener task failed: {0}")]
    Task(String),
}
