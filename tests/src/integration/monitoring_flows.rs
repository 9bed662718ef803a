//! # Monitoring Flows
//!
//! Transport layer → subscription registry → subscribers, through the
//! monitor node's ingestion methods and push streams.
//!
//! ## Flows Tested
//!
//! 1. A subscriber that asks to stop is dropped; the others keep receiving.
//! 2. A push client that goes away is dropped on the next event.
//! 3. Every subscriber sees events in publication order.
//! 4. Push events serialize in the shape remote clients consume.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use parking_lot::Mutex;

    use bitswap_broadcast::testing::{MockPeerDirectory, MockTransport};
    use monitor_runtime::{MonitorConfig, MonitorNode, MonitoringApi};
    use shared_bus::{Delivery, EventSubscriber};
    use shared_types::{
        BlockPresence, BlockPresenceType, Cid, ConnectionEvent, Multiaddr, PeerId,
        RecordedBitswapMessage,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Node = MonitorNode<MockPeerDirectory, MockTransport>;

    fn node() -> Node {
        MonitorNode::new(
            &MonitorConfig::default(),
            Arc::new(MockPeerDirectory::new(Vec::new())),
            Arc::new(MockTransport::new()),
        )
    }

    /// Subscriber recording a label per event, optionally stopping after
    /// a given number of events.
    struct Recorder {
        id: String,
        seen: Mutex<Vec<String>>,
        stop_after: Option<usize>,
    }

    impl Recorder {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_owned(),
                seen: Mutex::new(Vec::new()),
                stop_after: None,
            })
        }

        fn stopping_after(id: &str, count: usize) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_owned(),
                seen: Mutex::new(Vec::new()),
                stop_after: Some(count),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().clone()
        }

        fn record(&self, label: String) -> Delivery {
            let mut seen = self.seen.lock();
            seen.push(label);
            if Some(seen.len()) == self.stop_after {
                Delivery::terminate("recorder done")
            } else {
                Delivery::Continue
            }
        }
    }

    #[async_trait]
    impl EventSubscriber for Recorder {
        fn id(&self) -> &str {
            &self.id
        }

        async fn bitswap_message_received(
            &self,
            _timestamp: DateTime<Utc>,
            peer: &PeerId,
            message: Arc<RecordedBitswapMessage>,
        ) -> Delivery {
            self.record(format!("msg:{peer}:{}", message.blocks.len()))
        }

        async fn connection_event_recorded(
            &self,
            _timestamp: DateTime<Utc>,
            peer: &PeerId,
            event: &ConnectionEvent,
        ) -> Delivery {
            self.record(format!("conn:{peer}:{:?}", event.event_type))
        }
    }

    /// Wait until `condition` holds, failing the test after five seconds.
    async fn eventually(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    fn connected(addr: &str) -> ConnectionEvent {
        ConnectionEvent::connected(Multiaddr::new(addr))
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_stopping_subscriber_removed_others_unaffected() {
        let node = node();
        let s1 = Recorder::stopping_after("s1", 1);
        let s2 = Recorder::new("s2");
        node.subscribe(s1.clone()).unwrap();
        node.subscribe(s2.clone()).unwrap();

        node.record_connection_event(PeerId::new("p1"), connected("/ip4/10.0.0.1/tcp/4001"));
        eventually(|| node.subscriber_count() == 1 && s2.seen().len() == 1).await;

        node.record_bitswap_message(PeerId::new("p1"), RecordedBitswapMessage::default());
        eventually(|| s2.seen().len() == 2).await;

        assert_eq!(s1.seen().len(), 1);
        assert_eq!(s2.seen()[1], "msg:p1:0");

        // Its ID is free again.
        assert!(node.subscribe(Recorder::new("s1")).is_ok());
    }

    #[tokio::test]
    async fn test_departed_push_client_removed_on_next_event() {
        let node = node();
        let gone = node.open_stream("gone").unwrap();
        let mut stays = node.open_stream("stays").unwrap();
        drop(gone);

        node.record_connection_event(PeerId::new("p1"), connected("/ip4/10.0.0.1/tcp/4001"));

        let event = stays.recv().await.unwrap();
        assert_eq!(event.peer, PeerId::new("p1"));
        eventually(|| node.subscriber_count() == 1).await;
    }

    #[tokio::test]
    async fn test_all_subscribers_see_same_order() {
        let node = node();
        let a = Recorder::new("a");
        let b = Recorder::new("b");
        node.subscribe(a.clone()).unwrap();
        node.subscribe(b.clone()).unwrap();

        let publisher = node.publisher();
        for i in 0..50 {
            let peer = PeerId::new(format!("p{}", i % 3));
            if i % 2 == 0 {
                publisher.publish_connection_event(peer, connected("/ip4/10.0.0.1/tcp/4001"));
            } else {
                let message = RecordedBitswapMessage {
                    blocks: vec![Cid::new(format!("cid{i}"))],
                    ..RecordedBitswapMessage::default()
                };
                publisher.publish_bitswap_message(peer, message);
            }
        }

        eventually(|| a.seen().len() == 50 && b.seen().len() == 50).await;
        assert_eq!(a.seen(), b.seen());
        assert_eq!(a.seen()[0], "conn:p0:Connected");
        assert_eq!(a.seen()[1], "msg:p1:1");
    }

    #[tokio::test]
    async fn test_push_event_json_shape() {
        let node = node();
        let mut stream = node.open_stream("client").unwrap();

        let message = RecordedBitswapMessage {
            block_presences: vec![BlockPresence {
                cid: Cid::new("bafkqaaa"),
                presence: BlockPresenceType::DontHave,
            }],
            ..RecordedBitswapMessage::default()
        };
        node.record_bitswap_message(PeerId::new("12D3KooWA"), message);
        node.record_connection_event(
            PeerId::new("12D3KooWA"),
            connected("/ip4/10.0.0.1/tcp/4001"),
        );

        let json = serde_json::to_value(stream.recv().await.unwrap()).unwrap();
        assert_eq!(json["peer"], "12D3KooWA");
        assert_eq!(
            json["bitswap_message"]["block_presences"][0]["block_presence_type"],
            "dont_have"
        );
        assert!(json.get("connection_event").is_none());

        let json = serde_json::to_value(stream.recv().await.unwrap()).unwrap();
        assert_eq!(
            json["connection_event"]["connection_event_type"],
            "connected"
        );
        assert!(json.get("bitswap_message").is_none());
    }
}
