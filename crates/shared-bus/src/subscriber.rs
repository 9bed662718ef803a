//! # Event Subscriber
//!
//! Defines the subscription side of the bus: the [`EventSubscriber`]
//! capability trait and the push-stream adapter [`ChannelSubscriber`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{ConnectionEvent, PeerId, PushEvent, RecordedBitswapMessage};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// A live subscription already uses this identifier.
    #[error("already subscribed: {id}")]
    AlreadySubscribed { id: String },

    /// No Tokio runtime is available to run the delivery task.
    #[error("no Tokio runtime to deliver events on")]
    NoRuntime,
}

/// Result of handing one event to a subscriber.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Keep the subscription.
    Continue,
    /// Drop the subscription; no further events will be delivered.
    Terminate { reason: String },
}

impl Delivery {
    pub fn terminate(reason: impl Into<String>) -> Self {
        Self::Terminate {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_terminate(&self) -> bool {
        matches!(self, Self::Terminate { .. })
    }
}

/// Something that wants to observe recorded traffic.
///
/// The identifier must be unique among live subscriptions; it may be reused
/// once the previous subscription is gone.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Identifier the subscription is keyed by.
    fn id(&self) -> &str;

    /// Handle a recorded inbound Bitswap message.
    async fn bitswap_message_received(
        &self,
        timestamp: DateTime<Utc>,
        peer: &PeerId,
        message: Arc<RecordedBitswapMessage>,
    ) -> Delivery;

    /// Handle a recorded connection event.
    async fn connection_event_recorded(
        &self,
        timestamp: DateTime<Utc>,
        peer: &PeerId,
        event: &ConnectionEvent,
    ) -> Delivery;
}

// =============================================================================
// PUSH-STREAM ADAPTER
// =============================================================================

/// Subscriber that forwards every event as a [`PushEvent`] into a bounded
/// channel, for a transport that streams them to a remote client.
///
/// Once the receiving [`EventStream`] is dropped, or it falls more than
/// `buffer` events behind, the subscription terminates.
pub struct ChannelSubscriber {
    id: String,
    sender: mpsc::Sender<PushEvent>,
}

impl ChannelSubscriber {
    /// Create a subscriber and the stream its events come out of.
    #[must_use]
    pub fn new(id: impl Into<String>, buffer: usize) -> (Self, EventStream) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let subscriber = Self {
            id: id.into(),
            sender,
        };
        (subscriber, EventStream::new(receiver))
    }

    fn push(&self, event: PushEvent) -> Delivery {
        match self.sender.try_send(event) {
            Ok(()) => Delivery::Continue,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(subscriber = %self.id, "Push buffer full");
                Delivery::terminate("push buffer full")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::terminate("push stream closed"),
        }
    }
}

#[async_trait]
impl EventSubscriber for ChannelSubscriber {
    fn id(&self) -> &str {
        &self.id
    }

    async fn bitswap_message_received(
        &self,
        timestamp: DateTime<Utc>,
        peer: &PeerId,
        message: Arc<RecordedBitswapMessage>,
    ) -> Delivery {
        self.push(PushEvent::for_message(timestamp, peer.clone(), &message))
    }

    async fn connection_event_recorded(
        &self,
        timestamp: DateTime<Utc>,
        peer: &PeerId,
        event: &ConnectionEvent,
    ) -> Delivery {
        self.push(PushEvent::for_connection(timestamp, peer.clone(), event.clone()))
    }
}

/// Receiving end of a [`ChannelSubscriber`].
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
#[derive(Debug)]
pub struct EventStream {
    inner: ReceiverStream<PushEvent>,
}

impl EventStream {
    fn new(receiver: mpsc::Receiver<PushEvent>) -> Self {
        Self {
            inner: ReceiverStream::new(receiver),
        }
    }

    /// Receive the next pushed event.
    ///
    /// Returns `None` once the subscription is gone and the buffer drained.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.inner.next().await
    }
}

impl Stream for EventStream {
    type Item = PushEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{ConnectionEventType, Multiaddr};

    fn connected() -> ConnectionEvent {
        ConnectionEvent::connected(Multiaddr::new("/ip4/127.0.0.1/tcp/4001"))
    }

    #[tokio::test]
    async fn test_channel_subscriber_pushes_events() {
        let (subscriber, mut stream) = ChannelSubscriber::new("client-1", 8);
        let peer = PeerId::new("12D3KooWA");

        let delivery = subscriber
            .connection_event_recorded(Utc::now(), &peer, &connected())
            .await;
        assert_eq!(delivery, Delivery::Continue);

        let pushed = stream.recv().await.expect("event");
        assert_eq!(pushed.peer, peer);
        assert_eq!(
            pushed.connection_event.map(|e| e.event_type),
            Some(ConnectionEventType::Connected)
        );
        assert!(pushed.bitswap_message.is_none());
    }

    #[tokio::test]
    async fn test_channel_subscriber_terminates_when_stream_dropped() {
        let (subscriber, stream) = ChannelSubscriber::new("client-1", 8);
        drop(stream);

        let delivery = subscriber
            .bitswap_message_received(
                Utc::now(),
                &PeerId::new("12D3KooWA"),
                Arc::new(RecordedBitswapMessage::default()),
            )
            .await;
        assert!(delivery.is_terminate());
    }

    #[tokio::test]
    async fn test_channel_subscriber_terminates_when_full() {
        let (subscriber, _stream) = ChannelSubscriber::new("client-1", 1);
        let peer = PeerId::new("12D3KooWA");

        let first = subscriber
            .connection_event_recorded(Utc::now(), &peer, &connected())
            .await;
        let second = subscriber
            .connection_event_recorded(Utc::now(), &peer, &connected())
            .await;

        assert_eq!(first, Delivery::Continue);
        assert_eq!(second, Delivery::terminate("push buffer full"));
    }

    #[test]
    fn test_subscription_error_display() {
        let err = SubscriptionError::AlreadySubscribed { id: "abc".into() };
        assert_eq!(err.to_string(), "already subscribed: abc");
    }
}
