//! # Domain Services
//!
//! Pure functions used by the coordinator.

use super::entities::{OutboundMessage, PeerCapabilities, PeerInfo};
use shared_types::{Cid, WantType, WantlistEntry};

/// Keep only peers a broadcast should reach: connected and Bitswap-capable.
///
/// Directory order is preserved; status records come back in the same order.
pub fn select_targets(peers: Vec<PeerInfo>) -> Vec<PeerInfo> {
    peers
        .into_iter()
        .filter(|peer| peer.is_connected && peer.capabilities.supports_bitswap)
        .collect()
}

/// Request type to use for a peer: want-block unless it cannot take blocks.
pub fn select_want_type(capabilities: &PeerCapabilities) -> WantType {
    if capabilities.accepts_blocks {
        WantType::Block
    } else {
        WantType::Have
    }
}

/// One WANT message with an entry per CID.
pub fn build_want_message(cids: &[Cid], want_type: WantType) -> OutboundMessage {
    OutboundMessage {
        wantlist: cids
            .iter()
            .map(|cid| WantlistEntry::want(cid.clone(), want_type))
            .collect(),
        full_wantlist: false,
    }
}

/// One CANCEL message with an entry per CID.
pub fn build_cancel_message(cids: &[Cid]) -> OutboundMessage {
    OutboundMessage {
        wantlist: cids
            .iter()
            .map(|cid| WantlistEntry::cancel(cid.clone()))
            .collect(),
        full_wantlist: false,
    }
}
