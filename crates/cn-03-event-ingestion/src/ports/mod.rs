//! # Ports
//!
//! Outbound dependencies of the ingestion pipeline. The inbound side is the
//! channel engine's `ChannelEventHandler`, which the reactor drives.

pub mod outbound;

pub use outbound::*;
