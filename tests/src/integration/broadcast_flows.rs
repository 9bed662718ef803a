//! # Broadcast Flows
//!
//! Controller → monitor node → broadcast coordinator → peers, with mocked
//! peer directory and transport.
//!
//! ## Flows Tested
//!
//! 1. Want-then-cancel across peers with different capabilities, where one
//!    peer's cancel times out.
//! 2. Each broadcast works on a fresh peer snapshot.
//! 3. Peer responses recorded by the transport reach push clients.
//! 4. Operations that cannot start fail as a whole.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::Instant;

    use bitswap_broadcast::testing::{MockPeerDirectory, MockSend, MockTransport};
    use bitswap_broadcast::{BroadcastError, DirectoryError, PeerCapabilities, PeerInfo};
    use monitor_runtime::{MonitorConfig, MonitorNode, MonitoringApi, RpcApi};
    use shared_types::{
        BlockPresence, BlockPresenceType, BroadcastSendError, Cid, PeerId,
        RecordedBitswapMessage, WantType,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Harness {
        node: MonitorNode<MockPeerDirectory, MockTransport>,
        directory: Arc<MockPeerDirectory>,
        transport: Arc<MockTransport>,
    }

    fn harness(peers: Vec<PeerInfo>) -> Harness {
        let config = MonitorConfig::from_toml_str(
            r#"
            monitoring_addresses = ["/ip4/127.0.0.1/tcp/8181"]

            [broadcast]
            send_timeout_ms = 500
            "#,
        )
        .unwrap();

        let directory = Arc::new(MockPeerDirectory::new(peers));
        let transport = Arc::new(MockTransport::new());
        let node = MonitorNode::new(&config, Arc::clone(&directory), Arc::clone(&transport));
        Harness {
            node,
            directory,
            transport,
        }
    }

    fn peer(id: &str, capabilities: PeerCapabilities) -> PeerInfo {
        PeerInfo::connected(PeerId::new(id), capabilities, Vec::new())
    }

    fn cids() -> Vec<Cid> {
        vec![Cid::new("bafkqaaa"), Cid::new("bafkqaab")]
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_want_cancel_mixed_peers_with_cancel_timeout() {
        let h = harness(vec![
            peer("peer-a", PeerCapabilities::FULL),
            peer("peer-b", PeerCapabilities::WANT_HAVE_ONLY),
        ]);
        h.transport
            .set_behaviour(PeerId::new("peer-b"), MockSend::Hang);
        h.transport
            .set_want_behaviour(PeerId::new("peer-b"), MockSend::Succeed);

        let started = Instant::now();
        let statuses = h
            .node
            .broadcast_bitswap_want_cancel(cids(), 2)
            .await
            .unwrap();

        assert_eq!(statuses.len(), 2);
        let (a, b) = (&statuses[0], &statuses[1]);

        assert_eq!(a.peer, PeerId::new("peer-a"));
        assert_eq!(a.want_status.request_type_sent, Some(WantType::Block));
        assert!(a.want_status.send.is_success());
        assert!(a.cancel_status.is_success());
        assert_eq!(a.connected_addresses.len(), 1);

        assert_eq!(b.peer, PeerId::new("peer-b"));
        assert_eq!(b.want_status.request_type_sent, Some(WantType::Have));
        assert!(b.want_status.send.is_success());
        assert_eq!(
            b.cancel_status.error,
            Some(BroadcastSendError::Timeout { after_ms: 500 })
        );

        // Every cancel went out no earlier than two seconds after the wants
        // started.
        let sent = h.transport.sent();
        assert_eq!(sent.len(), 4);
        for cancel in sent.iter().filter(|s| s.message.is_cancel()) {
            assert!(cancel.at - started >= Duration::from_secs(2));
            assert_eq!(cancel.message.wantlist.len(), 2);
        }

        let json = serde_json::to_value(b).unwrap();
        assert_eq!(json["peer"], "peer-b");
        assert_eq!(json["want_status"]["request_type_sent"], "have");
        assert_eq!(json["cancel_status"]["error"]["kind"], "timeout");
        assert_eq!(json["cancel_status"]["error"]["after_ms"], 500);
    }

    #[tokio::test]
    async fn test_each_broadcast_uses_fresh_snapshot() {
        let h = harness(vec![peer("peer-a", PeerCapabilities::FULL)]);

        let first = h.node.broadcast_bitswap_cancel(cids()).await.unwrap();
        assert_eq!(first.len(), 1);

        let mut gone = peer("peer-a", PeerCapabilities::FULL);
        gone.is_connected = false;
        h.directory.set_peers(vec![
            gone,
            peer("peer-b", PeerCapabilities::WANT_HAVE_ONLY),
            peer("peer-c", PeerCapabilities::NONE),
        ]);

        let second = h.node.broadcast_bitswap_cancel(cids()).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].status.peer, PeerId::new("peer-b"));
    }

    #[tokio::test]
    async fn test_peer_responses_reach_push_clients() {
        let h = harness(vec![peer("peer-a", PeerCapabilities::WANT_HAVE_ONLY)]);
        let mut stream = h.node.open_stream("controller").unwrap();

        let statuses = h.node.broadcast_bitswap_want(cids()).await.unwrap();
        assert!(statuses[0].status.send.is_success());

        // The peer answers with a DONT_HAVE, recorded by the transport layer.
        let response = RecordedBitswapMessage {
            block_presences: vec![BlockPresence {
                cid: Cid::new("bafkqaaa"),
                presence: BlockPresenceType::DontHave,
            }],
            ..RecordedBitswapMessage::default()
        };
        assert_eq!(
            h.node
                .record_bitswap_message(PeerId::new("peer-a"), response.clone()),
            1
        );

        let event = stream.recv().await.unwrap();
        assert_eq!(event.peer, PeerId::new("peer-a"));
        assert_eq!(event.bitswap_message, Some(response));
    }

    #[tokio::test]
    async fn test_operations_that_cannot_start() {
        let h = harness(vec![peer("peer-a", PeerCapabilities::FULL)]);
        let err = h
            .node
            .broadcast_bitswap_want_cancel(Vec::new(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BroadcastError::EmptyCidSet));

        let err = h
            .node
            .broadcast_bitswap_want_cancel(cids(), u64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, BroadcastError::DelayOutOfRange { .. }));
        assert!(h.transport.sent().is_empty());

        let config = MonitorConfig::default();
        let node = MonitorNode::new(
            &config,
            Arc::new(MockPeerDirectory::failing(DirectoryError::Unavailable(
                "host shutting down".into(),
            ))),
            Arc::new(MockTransport::new()),
        );
        let err = node.broadcast_bitswap_want(cids()).await.unwrap_err();
        assert!(matches!(err, BroadcastError::PeerDirectory(_)));
        assert!(err.to_string().contains("host shutting down"));
    }
}
