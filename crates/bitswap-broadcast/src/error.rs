//! Error types for the broadcast coordinator.

use crate::ports::outbound::DirectoryError;
use thiserror::Error;

/// Reasons a broadcast could not be started at all.
///
/// Per-peer failures never show up here; they are recorded in the peer's
/// status record.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("no CIDs given")]
    EmptyCidSet,

    /// The want-to-cancel delay cannot be represented as a deadline.
    #[error("delay of {seconds}s is out of range")]
    DelayOutOfRange { seconds: u64 },

    #[error("cannot enumerate peers: {0}")]
    PeerDirectory(#[from] DirectoryError),
}
