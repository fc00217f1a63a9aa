//! # Domain Errors
//!
//! Store and state machine error types.

use shared_types::ChannelId;
use thiserror::Error;

/// Persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Update targeted a row that does not exist
    #[error("Channel not found: {0}")]
    ChannelNotFound(ChannelId),

    /// Insert collided with an existing row
    #[error("Channel already exists: {0}")]
    ChannelExists(ChannelId),

    /// Underlying storage failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by event handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Load or update failed; the transaction was rolled back
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Challenge expiry does not fit a timestamp
    #[error("Invalid challenge expiry: {0}")]
    InvalidChallengeExpiry(u64),

    /// Event family is decoded but has no state machine behaviour yet
    #[error("Handler not implemented: {0}")]
    NotImplemented(&'static str),
}
