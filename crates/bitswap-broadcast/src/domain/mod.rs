//! # Domain Layer for Bitswap Broadcasts
//!
//! Pure logic with no I/O: which peers to target, which request type each
//! one gets, and what the outbound messages look like.
//!
//! ## Contents
//!
//! - **entities**: `PeerInfo`, `PeerCapabilities`, `OutboundMessage`
//! - **value_objects**: `BroadcastConfig`
//! - **services**: `select_targets`, `select_want_type`, message builders

mod entities;
mod services;
mod value_objects;

pub use entities::*;
pub use services::*;
pub use value_objects::*;
