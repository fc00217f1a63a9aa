//! # CN-03 Event Ingestion
//!
//! Contract log listener and event reactor feeding the channel engine.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Turn the raw log stream of one settlement contract into typed handler
//! calls on [`ChannelEventHandler`](cn_02_channel_engine::ChannelEventHandler),
//! exactly once per `(chain, contract, block, log index)`:
//!
//! ```text
//! ChainClient ──> EventListener ──> EventReactor ──> ChannelEventHandler
//!  (range +        (backfill,        (topic lookup,
//!   subscribe)      live, backoff)    decode, dedup)
//!                                         │
//!                                         └──> EventLog (dedup + resume)
//! ```
//!
//! ## Delivery
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | At-least-once | Backfill from the last recorded position, then live |
//! | Effectively-once | `EventLog::is_processed` before dispatch |
//! | Crash resume | Max recorded `(block, index)` per contract and chain |
//! | Bounded retries | Shared exponential backoff, fatal when exhausted |
//!
//! ## Module Structure
//!
//! ```text
//! cn-03-event-ingestion/
//! ├── domain/      # sol! bindings, ContractEvent, RawLog, ListenerConfig, errors
//! ├── ports/       # ChainClient, EventLog (out), MockChainClient
//! ├── adapters/    # StoreEventLog over the channel engine's store
//! └── service/     # EventReactor, EventListener, Backoff
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::StoreEventLog;
pub use domain::{
    ContractEvent, EventKind, EventTable, IngestionError, ListenerConfig, ListenerError, RawLog,
};
pub use ports::{ChainClient, EventLog, LogSubscription, MockChainClient};
pub use service::{Backoff, EventListener, EventReactor, LogOutcome, ResumePoint};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
