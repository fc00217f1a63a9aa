//! # Domain Module
//!
//! State tuple encoding and quorum policy.

pub mod codec;
pub mod errors;
pub mod quorum;

pub use codec::*;
pub use errors::*;
pub use quorum::*;
