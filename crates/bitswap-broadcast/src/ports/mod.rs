//! Ports for the broadcast coordinator.
//!
//! - `inbound`: the API the control plane calls
//! - `outbound`: the peer directory and protocol transport it depends on

pub mod inbound;
pub mod outbound;
