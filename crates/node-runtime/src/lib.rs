//! # Node Runtime Library
//!
//! Exposes the runtime pieces for testing. The entry point is `main.rs`.
//!
//! ## Modules
//!
//! - `config` - `NodeConfig` from `CN_*` environment variables
//! - `logging` - `tracing-subscriber` setup (`CN_LOG`, `RUST_LOG`, JSON)
//! - `adapters` - JSON-RPC `ChainClient`
//! - `runtime` - one listener per contract, graceful shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod logging;
pub mod runtime;

pub use adapters::RpcChainClient;
pub use config::{ConfigError, NodeConfig};
pub use runtime::{NodeRuntime, RunSummary};
