//! # Error Types
//!
//! Errors that travel inside status records and therefore must serialize.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a send to a single peer failed during a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BroadcastSendError {
    /// The send did not complete within the configured bound.
    #[error("send timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The peer was no longer connected when the send was attempted.
    #[error("peer not connected")]
    NotConnected,

    /// The transport reported a failure.
    #[error("transport error: {reason}")]
    Transport { reason: String },
}

impl BroadcastSendError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
