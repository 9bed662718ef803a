//! # Monitor Node
//!
//! Owns the subscription registry and the broadcast coordinator and serves
//! both through [`PluginApi`](crate::PluginApi).

use crate::api::{MonitoringApi, RpcApi};
use crate::config::MonitorConfig;
use async_trait::async_trait;
use bitswap_broadcast::{
    BitswapBroadcastApi, BroadcastCoordinator, BroadcastError, PeerDirectory, ProtocolTransport,
};
use shared_bus::{
    ChannelSubscriber, EventPublisher, EventStream, EventSubscriber, SubscriptionError,
    SubscriptionRegistry,
};
use shared_types::{
    BroadcastCancelStatus, BroadcastWantCancelStatus, BroadcastWantStatus, Cid, ConnectionEvent,
    PeerId, RecordedBitswapMessage,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// The monitor as seen by a remote controller.
///
/// The transport layer feeds it through [`MonitorNode::record_bitswap_message`]
/// and [`MonitorNode::record_connection_event`], or through the shared
/// [`MonitorNode::publisher`] handle.
pub struct MonitorNode<D, T>
where
    D: PeerDirectory,
    T: ProtocolTransport,
{
    registry: Arc<SubscriptionRegistry>,
    coordinator: BroadcastCoordinator<D, T>,
    monitoring_addresses: Vec<String>,
    push_buffer: usize,
}

impl<D, T> MonitorNode<D, T>
where
    D: PeerDirectory,
    T: ProtocolTransport,
{
    /// Build a node from a validated configuration.
    ///
    /// Subscriber delivery runs on the Tokio runtime current at this call.
    /// Outside a runtime, use [`MonitorNode::with_runtime`].
    pub fn new(config: &MonitorConfig, directory: Arc<D>, transport: Arc<T>) -> Self {
        let registry = SubscriptionRegistry::with_capacity(config.subscriptions.queue_capacity);
        Self::assemble(config, registry, directory, transport)
    }

    /// Build a node whose subscriber delivery runs on `runtime`.
    pub fn with_runtime(
        config: &MonitorConfig,
        runtime: Handle,
        directory: Arc<D>,
        transport: Arc<T>,
    ) -> Self {
        let registry =
            SubscriptionRegistry::with_runtime(config.subscriptions.queue_capacity, runtime);
        Self::assemble(config, registry, directory, transport)
    }

    fn assemble(
        config: &MonitorConfig,
        registry: SubscriptionRegistry,
        directory: Arc<D>,
        transport: Arc<T>,
    ) -> Self {
        info!(
            send_timeout_ms = config.broadcast.send_timeout_ms,
            queue_capacity = config.subscriptions.queue_capacity,
            addresses = config.monitoring_addresses.len(),
            "Starting monitor node"
        );

        Self {
            registry: Arc::new(registry),
            coordinator: BroadcastCoordinator::new(
                config.broadcast_config(),
                directory,
                transport,
            ),
            monitoring_addresses: config.monitoring_addresses.clone(),
            push_buffer: config.subscriptions.push_buffer,
        }
    }

    /// Ingestion handle for the transport layer.
    pub fn publisher(&self) -> Arc<dyn EventPublisher> {
        Arc::clone(&self.registry) as Arc<dyn EventPublisher>
    }

    /// Record an inbound Bitswap message received now.
    ///
    /// Returns the number of subscriptions it was queued for.
    pub fn record_bitswap_message(&self, peer: PeerId, message: RecordedBitswapMessage) -> usize {
        self.registry.publish_bitswap_message(peer, message)
    }

    /// Record a connection event observed now.
    pub fn record_connection_event(&self, peer: PeerId, event: ConnectionEvent) -> usize {
        self.registry.publish_connection_event(peer, event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.subscriber_count()
    }

    pub fn events_published(&self) -> u64 {
        self.registry.events_published()
    }
}

impl<D, T> MonitoringApi for MonitorNode<D, T>
where
    D: PeerDirectory,
    T: ProtocolTransport,
{
    fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> Result<(), SubscriptionError> {
        self.registry.subscribe(subscriber)
    }

    fn unsubscribe(&self, id: &str) {
        self.registry.unsubscribe(id);
    }

    fn open_stream(&self, id: &str) -> Result<EventStream, SubscriptionError> {
        let (subscriber, stream) = ChannelSubscriber::new(id, self.push_buffer);
        self.registry.subscribe(Arc::new(subscriber))?;
        debug!(subscriber = %id, buffer = self.push_buffer, "Push stream opened");
        Ok(stream)
    }
}

#[async_trait]
impl<D, T> RpcApi for MonitorNode<D, T>
where
    D: PeerDirectory,
    T: ProtocolTransport,
{
    async fn ping(&self) {
        debug!("ping");
    }

    async fn monitoring_addresses(&self) -> Vec<String> {
        self.monitoring_addresses.clone()
    }

    async fn broadcast_bitswap_want(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastWantStatus>, BroadcastError> {
        self.coordinator.broadcast_want(cids).await
    }

    async fn broadcast_bitswap_cancel(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastCancelStatus>, BroadcastError> {
        self.coordinator.broadcast_cancel(cids).await
    }

    async fn broadcast_bitswap_want_cancel(
        &self,
        cids: Vec<Cid>,
        seconds_between: u64,
    ) -> Result<Vec<BroadcastWantCancelStatus>, BroadcastError> {
        self.coordinator
            .broadcast_want_cancel(cids, seconds_between)
            .await
    }
}
