//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identifiers**: [`Cid`], [`PeerId`], [`Multiaddr`]
//! - **Wantlist**: [`WantType`], [`WantlistEntry`]
//! - **Recorded traffic**: [`RecordedBitswapMessage`], [`BlockPresence`]

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap the canonical string form.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// The canonical string form.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Content identifier of a block.
    Cid
);

string_id!(
    /// Protocol-layer identity of a remote peer.
    PeerId
);

string_id!(
    /// Underlay network address of a connection, e.g. `/ip4/10.0.0.1/tcp/4001`.
    Multiaddr
);

// =============================================================================
// CLUSTER B: WANTLIST
// =============================================================================

/// Request type of a wantlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WantType {
    /// Request the full block.
    Block,
    /// Request only a Have/DontHave indication.
    Have,
}

impl fmt::Display for WantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WantType::Block => f.write_str("want-block"),
            WantType::Have => f.write_str("want-have"),
        }
    }
}

/// A single wantlist entry, inbound or outbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantlistEntry {
    pub cid: Cid,
    pub priority: i32,
    pub want_type: WantType,
    /// The entry withdraws an earlier want for `cid`.
    pub cancel: bool,
    /// The sender asked to be told explicitly if the block is missing.
    pub send_dont_have: bool,
}

impl WantlistEntry {
    /// Default priority for injected entries.
    pub const DEFAULT_PRIORITY: i32 = 1;

    /// A WANT entry of the given type.
    pub fn want(cid: Cid, want_type: WantType) -> Self {
        Self {
            cid,
            priority: Self::DEFAULT_PRIORITY,
            want_type,
            cancel: false,
            send_dont_have: false,
        }
    }

    /// A CANCEL entry.
    pub fn cancel(cid: Cid) -> Self {
        Self {
            cid,
            priority: Self::DEFAULT_PRIORITY,
            want_type: WantType::Block,
            cancel: true,
            send_dont_have: false,
        }
    }
}

// =============================================================================
// CLUSTER C: RECORDED TRAFFIC
// =============================================================================

/// Presence indication for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockPresenceType {
    Have,
    DontHave,
}

/// Presence or absence of a block, as announced by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPresence {
    pub cid: Cid,
    #[serde(rename = "block_presence_type")]
    pub presence: BlockPresenceType,
}

/// Snapshot of one inbound Bitswap message.
///
/// Built by the transport layer when the message is received; never mutated
/// afterwards. Subscribers receive it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedBitswapMessage {
    /// Wantlist entries in wire order.
    pub wantlist_entries: Vec<WantlistEntry>,
    /// The entries replace the sender's whole wantlist instead of updating it.
    pub full_wantlist: bool,
    /// CIDs of the blocks carried by the message.
    pub blocks: Vec<Cid>,
    pub block_presences: Vec<BlockPresence>,
    /// Underlay addresses of the connection the message arrived on.
    pub connected_addresses: Vec<Multiaddr>,
}

impl RecordedBitswapMessage {
    /// True if the message carries nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wantlist_entries.is_empty()
            && self.blocks.is_empty()
            && self.block_presences.is_empty()
    }
}
