//! # Broadcast Status Records
//!
//! One record per peer per broadcast. Successes and failures are reported
//! side by side so a caller can tell "no peers reachable" from "some sends
//! failed".

use crate::entities::{Multiaddr, PeerId, WantType};
use crate::errors::BroadcastSendError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single send attempt to a single peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastSendStatus {
    /// Wall-clock time taken immediately before the send.
    pub timestamp_before_send: DateTime<Utc>,
    pub send_duration_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BroadcastSendError>,
}

impl BroadcastSendStatus {
    pub fn new(
        timestamp_before_send: DateTime<Utc>,
        elapsed: Duration,
        error: Option<BroadcastSendError>,
    ) -> Self {
        Self {
            timestamp_before_send,
            send_duration_millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Send outcome plus the peer it was addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastStatus {
    #[serde(flatten)]
    pub send: BroadcastSendStatus,
    pub peer: PeerId,
    /// Underlay addresses the message went out on. Empty on error.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connected_addresses: Vec<Multiaddr>,
}

/// Per-peer outcome of a WANT broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastWantStatus {
    #[serde(flatten)]
    pub status: BroadcastStatus,
    /// Request type sent to this peer. Absent if the send failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type_sent: Option<WantType>,
}

/// Per-peer outcome of a CANCEL broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastCancelStatus {
    #[serde(flatten)]
    pub status: BroadcastStatus,
}

/// WANT half of a WANT+CANCEL broadcast for one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastWantCancelWantStatus {
    #[serde(flatten)]
    pub send: BroadcastSendStatus,
    /// Absent if the WANT send failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type_sent: Option<WantType>,
}

/// Joint outcome of a WANT+CANCEL broadcast for one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastWantCancelStatus {
    pub peer: PeerId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connected_addresses: Vec<Multiaddr>,
    pub want_status: BroadcastWantCancelWantStatus,
    pub cancel_status: BroadcastSendStatus,
}
