//! # Adapters
//!
//! Concrete outbound implementations wired by the runtime.

pub mod rpc;

pub use rpc::RpcChainClient;
