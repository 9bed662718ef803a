//! # Core Domain Entities
//!
//! - [`PeerInfo`]: one entry of the peer directory snapshot
//! - [`PeerCapabilities`]: what a peer advertises for Bitswap
//! - [`OutboundMessage`]: a message handed to the protocol transport

use shared_types::{Multiaddr, PeerId, WantlistEntry};

/// Bitswap capabilities advertised by a peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PeerCapabilities {
    /// The peer speaks Bitswap at all.
    pub supports_bitswap: bool,
    /// The peer accepts want-block requests. Peers that only understand
    /// presence queries get want-have instead.
    pub accepts_blocks: bool,
}

impl PeerCapabilities {
    /// Full Bitswap peer.
    pub const FULL: Self = Self {
        supports_bitswap: true,
        accepts_blocks: true,
    };

    /// Bitswap peer that only answers presence queries.
    pub const WANT_HAVE_ONLY: Self = Self {
        supports_bitswap: true,
        accepts_blocks: false,
    };

    /// Not a Bitswap peer.
    pub const NONE: Self = Self {
        supports_bitswap: false,
        accepts_blocks: false,
    };
}

/// Peer as reported by the peer directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerInfo {
    pub peer_id: PeerId,
    pub capabilities: PeerCapabilities,
    /// Underlay addresses of the current connections.
    pub addresses: Vec<Multiaddr>,
    pub is_connected: bool,
}

impl PeerInfo {
    /// A connected peer with the given capabilities.
    pub fn connected(
        peer_id: PeerId,
        capabilities: PeerCapabilities,
        addresses: Vec<Multiaddr>,
    ) -> Self {
        Self {
            peer_id,
            capabilities,
            addresses,
            is_connected: true,
        }
    }
}

/// A Bitswap message as handed to the transport.
///
/// The whole entry set goes out in one message; the transport either sends
/// all of it or fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub wantlist: Vec<WantlistEntry>,
    /// Replace the receiver's view of our wantlist. Injected broadcasts are
    /// always incremental.
    pub full_wantlist: bool,
}

impl OutboundMessage {
    /// True if every entry is a cancel.
    #[must_use]
    pub fn is_cancel(&self) -> bool {
        !self.wantlist.is_empty() && self.wantlist.iter().all(|entry| entry.cancel)
    }
}
