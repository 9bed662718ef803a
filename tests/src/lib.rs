//! # Bitswap Monitor Test Suite
//!
//! Unified test crate for scenarios spanning more than one crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── monitoring_flows.rs   # transport → registry → subscribers
//!     └── broadcast_flows.rs    # controller → node → coordinator → peers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p monitor-tests
//! cargo test -p monitor-tests integration::broadcast_flows
//! ```

pub mod integration;
