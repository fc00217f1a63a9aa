//! # Domain Module
//!
//! Event payloads consumed by the state machine and its error types.

pub mod errors;
pub mod events;

pub use errors::*;
pub use events::*;
