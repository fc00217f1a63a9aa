//! # Domain Module
//!
//! Contract bindings, decoded events, raw logs, listener settings and errors.

pub mod config;
pub mod contract;
pub mod errors;
pub mod log;

pub use config::*;
pub use contract::{ContractEvent, EventKind, EventTable};
pub use errors::*;
pub use log::*;
