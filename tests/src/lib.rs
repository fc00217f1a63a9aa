//! # Settlement Core Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/            # Criterion benchmarks (signing, codec, reactor)
//! └── src/integration/    # Cross-crate flows
//!     ├── fixtures.rs     # Store, reactor and log builders
//!     ├── flows.rs        # Chain log -> reactor -> state machine
//!     ├── signed_states.rs# Codec + quorum feeding stale-challenge recovery
//!     └── listener.rs     # Listener end to end over MockChainClient
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cn-tests
//! cargo test -p cn-tests integration::flows
//! cargo bench -p cn-tests
//! ```

pub mod integration;
