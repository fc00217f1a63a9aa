//! # Adapters
//!
//! Store implementations. The SQL-backed store lives with the persistence
//! layer; this crate ships the in-memory one used by tests and local runs.

pub mod memory;

pub use memory::MemoryStore;
