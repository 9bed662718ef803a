//! Testing Utilities
//!
//! Mock implementations of the outbound ports. Available to other crates
//! with the `test-utils` feature flag.

use crate::domain::{OutboundMessage, PeerInfo};
use crate::ports::outbound::{DirectoryError, PeerDirectory, ProtocolTransport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Multiaddr, PeerId};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// MOCK PEER DIRECTORY
// =============================================================================

/// Peer directory returning a fixed peer set, or a fixed error.
#[derive(Debug)]
pub struct MockPeerDirectory {
    peers: Mutex<Vec<PeerInfo>>,
    error: Option<DirectoryError>,
}

impl MockPeerDirectory {
    pub fn new(peers: Vec<PeerInfo>) -> Self {
        Self {
            peers: Mutex::new(peers),
            error: None,
        }
    }

    pub fn failing(error: DirectoryError) -> Self {
        Self {
            peers: Mutex::new(Vec::new()),
            error: Some(error),
        }
    }

    /// Replace the peer set returned by later snapshots.
    pub fn set_peers(&self, peers: Vec<PeerInfo>) {
        *self.peers.lock() = peers;
    }
}

#[async_trait]
impl PeerDirectory for MockPeerDirectory {
    async fn connected_peers(&self) -> Result<Vec<PeerInfo>, DirectoryError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self.peers.lock().clone()),
        }
    }
}

// =============================================================================
// MOCK TRANSPORT
// =============================================================================

/// How the mock transport answers a send.
#[derive(Debug, Clone)]
pub enum MockSend {
    /// Succeed immediately.
    Succeed,
    /// Succeed after a delay.
    Delay(Duration),
    /// Fail immediately.
    Fail(TransportError),
    /// Never complete.
    Hang,
}

/// A send observed by the mock transport.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub peer: PeerId,
    pub message: OutboundMessage,
    /// Tokio time at which the send started.
    pub at: Instant,
}

/// Transport that records every send and answers per configured behaviour.
///
/// Unconfigured peers succeed immediately, reporting one address derived
/// from the peer ID.
#[derive(Debug, Default)]
pub struct MockTransport {
    behaviours: Mutex<HashMap<PeerId, MockSend>>,
    want_behaviours: Mutex<HashMap<PeerId, MockSend>>,
    sent: Mutex<Vec<SentMessage>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaviour for every message sent to `peer`.
    pub fn set_behaviour(&self, peer: PeerId, behaviour: MockSend) {
        self.behaviours.lock().insert(peer, behaviour);
    }

    /// Behaviour for WANT messages sent to `peer`, overriding
    /// [`MockTransport::set_behaviour`].
    pub fn set_want_behaviour(&self, peer: PeerId, behaviour: MockSend) {
        self.want_behaviours.lock().insert(peer, behaviour);
    }

    /// Every send attempted so far, in start order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    fn behaviour_for(&self, peer: &PeerId, message: &OutboundMessage) -> MockSend {
        if !message.is_cancel() {
            if let Some(behaviour) = self.want_behaviours.lock().get(peer) {
                return behaviour.clone();
            }
        }
        self.behaviours
            .lock()
            .get(peer)
            .cloned()
            .unwrap_or(MockSend::Succeed)
    }
}

#[async_trait]
impl ProtocolTransport for MockTransport {
    async fn send(
        &self,
        peer: &PeerId,
        message: OutboundMessage,
    ) -> Result<Vec<Multiaddr>, TransportError> {
        let behaviour = self.behaviour_for(peer, &message);
        self.sent.lock().push(SentMessage {
            peer: peer.clone(),
            message,
            at: Instant::now(),
        });

        let address = Multiaddr::new(format!("/ip4/127.0.0.1/tcp/4001/p2p/{peer}"));
        match behaviour {
            MockSend::Succeed => Ok(vec![address]),
            MockSend::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(vec![address])
            }
            MockSend::Fail(err) => Err(err),
            MockSend::Hang => std::future::pending().await,
        }
    }
}
