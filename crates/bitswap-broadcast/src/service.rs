//! # Broadcast Coordinator Service
//!
//! Fans WANT/CANCEL messages out to every targeted peer concurrently and
//! collects one status record per peer.
//!
//! ## Architecture
//!
//! Implements the inbound port [`BitswapBroadcastApi`] and depends on two
//! outbound ports:
//! - [`PeerDirectory`]: snapshot of connected peers, taken once per call
//! - [`ProtocolTransport`]: per-peer message send
//!
//! ## Timing
//!
//! - Every send is bounded by [`BroadcastConfig::send_timeout`].
//! - For WANT+CANCEL, the cancel deadline is fixed once, when the WANT phase
//!   starts. Slow wants do not push other peers' cancels back.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use shared_types::{
    BroadcastCancelStatus, BroadcastSendError, BroadcastSendStatus, BroadcastStatus,
    BroadcastWantCancelStatus, BroadcastWantCancelWantStatus, BroadcastWantStatus, Cid,
    Multiaddr, PeerId,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::domain::{
    build_cancel_message, build_want_message, select_targets, select_want_type, BroadcastConfig,
    OutboundMessage, PeerInfo,
};
use crate::error::BroadcastError;
use crate::ports::inbound::BitswapBroadcastApi;
use crate::ports::outbound::{PeerDirectory, ProtocolTransport};

/// Broadcast Coordinator.
///
/// Holds no state between calls; each broadcast is independent and the
/// service can be shared across tasks via `Arc`.
pub struct BroadcastCoordinator<D, T>
where
    D: PeerDirectory,
    T: ProtocolTransport,
{
    config: BroadcastConfig,
    directory: Arc<D>,
    transport: Arc<T>,
}

/// Outcome of one timed send.
struct SendOutcome {
    status: BroadcastSendStatus,
    addresses: Vec<Multiaddr>,
}

impl<D, T> BroadcastCoordinator<D, T>
where
    D: PeerDirectory,
    T: ProtocolTransport,
{
    pub fn new(config: BroadcastConfig, directory: Arc<D>, transport: Arc<T>) -> Self {
        Self {
            config,
            directory,
            transport,
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Validate the request and snapshot the targeted peers.
    async fn snapshot_targets(&self, cids: &[Cid]) -> Result<Vec<PeerInfo>, BroadcastError> {
        if cids.is_empty() {
            return Err(BroadcastError::EmptyCidSet);
        }
        let peers = self.directory.connected_peers().await?;
        let known = peers.len();
        let targets = select_targets(peers);
        debug!(
            known_peers = known,
            targets = targets.len(),
            "Peer directory snapshot taken"
        );
        Ok(targets)
    }

    /// Send one message, bounded by the configured timeout, and time it.
    async fn send_timed(&self, peer: &PeerId, message: OutboundMessage) -> SendOutcome {
        let timestamp_before_send = Utc::now();
        let started = Instant::now();
        let result =
            tokio::time::timeout(self.config.send_timeout, self.transport.send(peer, message))
                .await;
        let elapsed = started.elapsed();

        let (error, addresses) = match result {
            Ok(Ok(addresses)) => (None, addresses),
            Ok(Err(err)) => (Some(BroadcastSendError::from(err)), Vec::new()),
            Err(_) => (
                Some(BroadcastSendError::Timeout {
                    after_ms: millis(self.config.send_timeout),
                }),
                Vec::new(),
            ),
        };

        if let Some(err) = &error {
            debug!(peer = %peer, error = %err, "Send failed");
        }

        SendOutcome {
            status: BroadcastSendStatus::new(timestamp_before_send, elapsed, error),
            addresses,
        }
    }

    async fn want_one(&self, peer: &PeerInfo, cids: &[Cid]) -> BroadcastWantStatus {
        let want_type = select_want_type(&peer.capabilities);
        let outcome = self
            .send_timed(&peer.peer_id, build_want_message(cids, want_type))
            .await;
        let request_type_sent = outcome.status.is_success().then_some(want_type);
        BroadcastWantStatus {
            status: BroadcastStatus {
                send: outcome.status,
                peer: peer.peer_id.clone(),
                connected_addresses: outcome.addresses,
            },
            request_type_sent,
        }
    }

    async fn cancel_one(&self, peer: &PeerInfo, cids: &[Cid]) -> BroadcastCancelStatus {
        let outcome = self
            .send_timed(&peer.peer_id, build_cancel_message(cids))
            .await;
        BroadcastCancelStatus {
            status: BroadcastStatus {
                send: outcome.status,
                peer: peer.peer_id.clone(),
                connected_addresses: outcome.addresses,
            },
        }
    }

    async fn want_cancel_one(
        &self,
        peer: &PeerInfo,
        cids: &[Cid],
        cancel_at: Instant,
    ) -> BroadcastWantCancelStatus {
        let want_type = select_want_type(&peer.capabilities);
        let want = self
            .send_timed(&peer.peer_id, build_want_message(cids, want_type))
            .await;

        tokio::time::sleep_until(cancel_at).await;

        let cancel = self
            .send_timed(&peer.peer_id, build_cancel_message(cids))
            .await;

        let connected_addresses = if want.addresses.is_empty() {
            cancel.addresses
        } else {
            want.addresses
        };

        BroadcastWantCancelStatus {
            peer: peer.peer_id.clone(),
            connected_addresses,
            want_status: BroadcastWantCancelWantStatus {
                request_type_sent: want.status.is_success().then_some(want_type),
                send: want.status,
            },
            cancel_status: cancel.status,
        }
    }
}

#[async_trait]
impl<D, T> BitswapBroadcastApi for BroadcastCoordinator<D, T>
where
    D: PeerDirectory,
    T: ProtocolTransport,
{
    async fn broadcast_want(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastWantStatus>, BroadcastError> {
        let targets = self.snapshot_targets(&cids).await?;
        let started = Instant::now();

        let statuses = join_all(targets.iter().map(|peer| self.want_one(peer, &cids))).await;

        info!(
            cids = cids.len(),
            peers = statuses.len(),
            failed = statuses.iter().filter(|s| !s.status.send.is_success()).count(),
            elapsed_ms = millis(started.elapsed()),
            "WANT broadcast finished"
        );
        Ok(statuses)
    }

    async fn broadcast_cancel(
        &self,
        cids: Vec<Cid>,
    ) -> Result<Vec<BroadcastCancelStatus>, BroadcastError> {
        let targets = self.snapshot_targets(&cids).await?;
        let started = Instant::now();

        let statuses = join_all(targets.iter().map(|peer| self.cancel_one(peer, &cids))).await;

        info!(
            cids = cids.len(),
            peers = statuses.len(),
            failed = statuses.iter().filter(|s| !s.status.send.is_success()).count(),
            elapsed_ms = millis(started.elapsed()),
            "CANCEL broadcast finished"
        );
        Ok(statuses)
    }

    async fn broadcast_want_cancel(
        &self,
        cids: Vec<Cid>,
        seconds_between: u64,
    ) -> Result<Vec<BroadcastWantCancelStatus>, BroadcastError> {
        let targets = self.snapshot_targets(&cids).await?;
        let started = Instant::now();
        let cancel_at = started
            .checked_add(Duration::from_secs(seconds_between))
            .ok_or(BroadcastError::DelayOutOfRange {
                seconds: seconds_between,
            })?;

        let statuses = join_all(
            targets
                .iter()
                .map(|peer| self.want_cancel_one(peer, &cids, cancel_at)),
        )
        .await;

        info!(
            cids = cids.len(),
            peers = statuses.len(),
            seconds_between,
            want_failed = statuses
                .iter()
                .filter(|s| !s.want_status.send.is_success())
                .count(),
            cancel_failed = statuses
                .iter()
                .filter(|s| !s.cancel_status.is_success())
                .count(),
            elapsed_ms = millis(started.elapsed()),
            "WANT+CANCEL broadcast finished"
        );
        Ok(statuses)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
