//! Outbound ports (SPI) for the broadcast coordinator.

use crate::domain::{OutboundMessage, PeerInfo};
use async_trait::async_trait;
use shared_types::{BroadcastSendError, Multiaddr, PeerId};
use thiserror::Error;

/// Source of the connected peer set.
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    /// Currently connected peers with their capabilities and addresses.
    async fn connected_peers(&self) -> Result<Vec<PeerInfo>, DirectoryError>;
}

/// Sends Bitswap messages to individual peers.
#[async_trait]
pub trait ProtocolTransport: Send + Sync {
    /// Send `message` to `peer` as a single unit.
    ///
    /// Returns the underlay addresses of the connection used. Implementations
    /// may bound the call themselves; the coordinator applies its own
    /// timeout regardless.
    async fn send(
        &self,
        peer: &PeerId,
        message: OutboundMessage,
    ) -> Result<Vec<Multiaddr>, TransportError>;
}

/// Peer directory failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("peer directory unavailable: {0}")]
    Unavailable(String),
}

/// Transport failures for a single send.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No open connection to the peer.
    #[error("peer not connected")]
    NotConnected,

    #[error("stream error: {0}")]
    Stream(String),

    /// The transport gave up on its own deadline.
    #[error("transport timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl From<TransportError> for BroadcastSendError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotConnected => BroadcastSendError::NotConnected,
            TransportError::Stream(reason) => BroadcastSendError::Transport { reason },
            TransportError::Timeout { after_ms } => BroadcastSendError::Timeout { after_ms },
        }
    }
}
