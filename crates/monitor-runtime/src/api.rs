//! # Plugin API
//!
//! The two channels a remote controller talks to.
//!
//! - [`MonitoringApi`]: push channel. Subscriptions receive every recorded
//!   Bitswap message and connection event.
//! - [`RpcApi`]: request/response channel. Liveness, discovery and the
//!   broadcast operations.

use async_trait::async_trait;
use bitswap_broadcast::BroadcastError;
use shared_bus::{EventStream, EventSubscriber, SubscriptionError};
use shared_types::{BroadcastCancelStatus, BroadcastWantCancelStatus, BroadcastWantStatus, Cid};
use std::sync::Arc;

/// Push channel.
pub trait MonitoringApi: Send + Sync {
    /// Register a subscriber. Fails if its ID is already registered.
    fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> Result<(), SubscriptionError>;

    /// Remove a subscriber. Unknown IDs are ignored.
    fn unsubscribe(&self, id: &str);

    /// Subscribe a buffered push stream under `id`.
    ///
    /// The subscription ends by itself once the stream is dropped or falls
    /// behind by more than the configured push buffer.
    fn open_stream(&self, id: &str) -> Result<EventStream, SubscriptionError>;
}

/// Request/response channel.
#[async_trait]
pub trait RpcApi: Send + Sync {
    /// Liveness check.
    async fn ping(&self);

    /// Addresses push clients can connect to.
    async fn monitoring_addresses(&self) -> Vec<String>;

    async fn broadcast_bitswap_want(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastWantStatus>, BroadcastError>;

    async fn broadcast_bitswap_cancel(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastCancelStatus>, BroadcastError>;

    /// WANT, then CANCEL `seconds_between` seconds after the WANT phase
    /// started.
    async fn broadcast_bitswap_want_cancel(
        &self,
        cids: Vec<Cid>,
        seconds_between: u64,
    ) -> Result<Vec<BroadcastWantCancelStatus>, BroadcastError>;
}

/// Full plugin surface.
pub trait PluginApi: MonitoringApi + RpcApi {}

impl<T: MonitoringApi + RpcApi> PluginApi for T {}
