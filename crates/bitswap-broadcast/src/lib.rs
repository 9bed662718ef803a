//! # Bitswap Broadcast Coordinator
//!
//! Injects WANT and CANCEL requests into every connected Bitswap peer and
//! reports per-peer timing and outcome.
//!
//! ## Architecture Role
//!
//! ```text
//! [Control plane] ──broadcast_want / _cancel / _want_cancel──→ [Coordinator]
//!                                                                   │
//!                                        PeerDirectory::connected_peers (snapshot)
//!                                                                   │
//!                                        ┌──────────────┬───────────┴──┐
//!                                        ↓              ↓              ↓
//!                                   send(Peer A)   send(Peer B)   send(Peer C)   (concurrent)
//! ```
//!
//! ## Failure Isolation
//!
//! - A failed or timed-out send is recorded in that peer's status and never
//!   affects other peers.
//! - An operation fails as a whole only if it cannot start: no CIDs, a
//!   want-to-cancel delay too large for a deadline, or the peer directory
//!   cannot be read.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use domain::*;
pub use error::BroadcastError;
pub use ports::inbound::BitswapBroadcastApi;
pub use ports::outbound::{DirectoryError, PeerDirectory, ProtocolTransport, TransportError};
pub use service::BroadcastCoordinator;
