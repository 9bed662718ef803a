//! # Shared Types Crate
//!
//! This crate contains the data model exchanged between the monitor's
//! subsystems and pushed to remote clients.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Recorded messages, connection events and
//!   broadcast status records are defined once, here.
//! - **Opaque Identifiers**: CIDs, peer IDs and multiaddrs are carried in
//!   their canonical string form. Parsing and wire encoding belong to the
//!   block exchange library, not to the monitor.
//! - **Serializable**: Everything derives serde so the RPC and push surfaces
//!   can emit it as JSON without further mapping.

pub mod entities;
pub mod errors;
pub mod events;
pub mod status;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use status::*;
