//! # Ports
//!
//! - `inbound`: the event handler surface the reactor drives
//! - `outbound`: transactional persistence

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
