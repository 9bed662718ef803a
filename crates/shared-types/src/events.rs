//! # Monitor Events
//!
//! Connection lifecycle events and the envelope pushed to remote subscribers.

use crate::entities::{Multiaddr, PeerId, RecordedBitswapMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Direction of a connection state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionEventType {
    Connected,
    Disconnected,
}

/// A connection to a peer was opened or closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    /// Underlay address of the remote end.
    pub remote: Multiaddr,
    #[serde(rename = "connection_event_type")]
    pub event_type: ConnectionEventType,
}

impl ConnectionEvent {
    pub fn connected(remote: Multiaddr) -> Self {
        Self {
            remote,
            event_type: ConnectionEventType::Connected,
        }
    }

    pub fn disconnected(remote: Multiaddr) -> Self {
        Self {
            remote,
            event_type: ConnectionEventType::Disconnected,
        }
    }
}

/// Payload of a [`MonitorEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEventKind {
    BitswapMessage(Arc<RecordedBitswapMessage>),
    Connection(ConnectionEvent),
}

/// A recorded event as it travels through the subscription bus.
///
/// Cloning is cheap: the message body is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorEvent {
    /// Time the event was recorded at the node.
    pub timestamp: DateTime<Utc>,
    /// Remote peer the event belongs to.
    pub peer: PeerId,
    pub kind: MonitorEventKind,
}

impl MonitorEvent {
    pub fn bitswap_message(
        timestamp: DateTime<Utc>,
        peer: PeerId,
        message: RecordedBitswapMessage,
    ) -> Self {
        Self {
            timestamp,
            peer,
            kind: MonitorEventKind::BitswapMessage(Arc::new(message)),
        }
    }

    pub fn connection(timestamp: DateTime<Utc>, peer: PeerId, event: ConnectionEvent) -> Self {
        Self {
            timestamp,
            peer,
            kind: MonitorEventKind::Connection(event),
        }
    }

    /// Short label for log fields.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.kind {
            MonitorEventKind::BitswapMessage(_) => "bitswap_message",
            MonitorEventKind::Connection(_) => "connection_event",
        }
    }
}

/// JSON envelope pushed to remote push-stream clients.
///
/// Exactly one of `bitswap_message` and `connection_event` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub timestamp: DateTime<Utc>,
    pub peer: PeerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitswap_message: Option<RecordedBitswapMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_event: Option<ConnectionEvent>,
}

impl PushEvent {
    pub fn for_message(
        timestamp: DateTime<Utc>,
        peer: PeerId,
        message: &RecordedBitswapMessage,
    ) -> Self {
        Self {
            timestamp,
            peer,
            bitswap_message: Some(message.clone()),
            connection_event: None,
        }
    }

    pub fn for_connection(timestamp: DateTime<Utc>, peer: PeerId, event: ConnectionEvent) -> Self {
        Self {
            timestamp,
            peer,
            bitswap_message: None,
            connection_event: Some(event),
        }
    }
}
