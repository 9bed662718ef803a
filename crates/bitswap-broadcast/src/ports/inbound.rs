//! Inbound ports (API) for the broadcast coordinator.

use crate::error::BroadcastError;
use async_trait::async_trait;
use shared_types::{
    BroadcastCancelStatus, BroadcastWantCancelStatus, BroadcastWantStatus, Cid,
};

/// Broadcast API served to the control plane.
///
/// Every call returns once each targeted peer has an outcome. Results hold
/// exactly one record per targeted peer, in peer directory order.
#[async_trait]
pub trait BitswapBroadcastApi: Send + Sync {
    /// Send one WANT message per peer, with want-block or want-have chosen
    /// per peer from its capabilities.
    async fn broadcast_want(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastWantStatus>, BroadcastError>;

    /// Send one CANCEL message per peer.
    async fn broadcast_cancel(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastCancelStatus>, BroadcastError>;

    /// Send WANTs, then CANCELs once `seconds_between` seconds have passed
    /// since the WANT phase started. The cancel is attempted even if the
    /// want failed.
    async fn broadcast_want_cancel(
        &self,
        cids: Vec<Cid>,
        seconds_between: u64,
    ) -> Result<Vec<BroadcastWantCancelStatus>, BroadcastError>;
}
