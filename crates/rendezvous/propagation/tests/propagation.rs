mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::{TestNode, init_tracing, payload, service, stamped_by, ttl_of};
use proptest::prelude::*;
use rendezvous_api::NetworkError;
use rendezvous_message::INDEX_NAMESPACE;
use rendezvous_primitives::PeerIdentity;
use rendezvous_propagation::{
    DeliveryReport, FanoutReport, NeighborOutcome, PropagateOutcome, PropagationConfig,
    PropagationError, RepropagateOutcome,
};
use rendezvous_test_utils::{
    FailingChannel, RecordingBroadcast, RecordingChannel, StallingChannel, random_peers,
};

#[tokio::test]
async fn propagate_prefers_live_connection() {
    let _guard = init_tracing();
    let node = TestNode::new(PropagationConfig::default());
    let (peer, channel) = node.connect_peer();

    let outcome = node.service.propagate([peer], &payload(), &service(), 10).await;

    assert_eq!(outcome, PropagateOutcome::Delivered(DeliveryReport { sent: 1, failed: 0 }));
    assert!(node.endpoint.requests().is_empty());

    let sent = channel.last_message().unwrap();
    let header = sent.prop_header().unwrap();
    assert_eq!(header.ttl(), 10);
    assert!(header.is_visited(&node.peer));
    assert_eq!(header.service(), &service());
}

#[tokio::test]
async fn propagate_opens_transient_channel() {
    let node = TestNode::new(PropagationConfig::default());
    let peer = PeerIdentity::random();
    let channel = RecordingChannel::for_peer(&peer);
    node.endpoint.register(peer.clone(), channel.clone());

    let outcome = node.service.propagate([peer.clone()], &payload(), &service(), 10).await;

    assert_eq!(outcome.sent(), 1);
    assert_eq!(channel.sent_count(), 1);
    let requests = node.endpoint.requests_for(&peer);
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].address.service(),
        Some(&node.service.config().propagation_service)
    );
}

#[tokio::test]
async fn propagate_to_unreachable_destinations_sends_nothing() {
    let node = TestNode::new(PropagationConfig::default());

    let outcome = node
        .service
        .propagate(random_peers(4), &payload(), &service(), 10)
        .await;

    assert_eq!(outcome, PropagateOutcome::Delivered(DeliveryReport { sent: 0, failed: 4 }));
    assert_eq!(node.endpoint.requests().len(), 4);
}

#[tokio::test]
async fn propagate_with_zero_ttl_declines() {
    let node = TestNode::new(PropagationConfig::default());
    let (peer, channel) = node.connect_peer();

    let outcome = node.service.propagate([peer], &payload(), &service(), 0).await;

    assert_eq!(outcome, PropagateOutcome::Declined);
    assert_eq!(channel.sent_count(), 0);
    assert!(node.endpoint.requests().is_empty());
}

#[tokio::test]
async fn propagate_caps_requested_ttl() {
    let node = TestNode::new(PropagationConfig::default().with_max_ttl(20));
    let (peer, channel) = node.connect_peer();

    node.service.propagate([peer], &payload(), &service(), 500).await;

    assert_eq!(ttl_of(&channel.last_message().unwrap()), 20);
}

#[tokio::test]
async fn propagate_skips_disconnected_connection() {
    let node = TestNode::new(PropagationConfig::default());
    let (peer, channel) = node.connect_peer();
    node.connections.mark_disconnected(&peer);
    // A transient channel exists but must not be used.
    node.endpoint.register(peer.clone(), RecordingChannel::for_peer(&peer));

    let outcome = node.service.propagate([peer], &payload(), &service(), 10).await;

    assert_eq!(outcome, PropagateOutcome::Delivered(DeliveryReport { sent: 0, failed: 1 }));
    assert_eq!(channel.sent_count(), 0);
    assert!(node.endpoint.requests().is_empty());
}

#[tokio::test]
async fn propagate_continues_past_failures() {
    let node = TestNode::new(PropagationConfig::default());
    let failing_peer = PeerIdentity::random();
    let failing = FailingChannel::for_peer(&failing_peer);
    node.connect_with(&failing_peer, failing.clone());
    let (good_peer, good) = node.connect_peer();

    let outcome = node
        .service
        .propagate([failing_peer, good_peer], &payload(), &service(), 10)
        .await;

    assert_eq!(outcome, PropagateOutcome::Delivered(DeliveryReport { sent: 1, failed: 1 }));
    assert_eq!(failing.attempts(), 1);
    assert_eq!(good.sent_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn propagate_bounds_slow_sends() {
    let node = TestNode::new(
        PropagationConfig::default().with_send_timeout(Duration::from_millis(100)),
    );
    let slow_peer = PeerIdentity::random();
    node.connect_with(&slow_peer, StallingChannel::for_peer(&slow_peer));
    let (fast_peer, fast) = node.connect_peer();

    let outcome = node
        .service
        .propagate([slow_peer, fast_peer], &payload(), &service(), 10)
        .await;

    assert_eq!(outcome, PropagateOutcome::Delivered(DeliveryReport { sent: 1, failed: 1 }));
    assert_eq!(fast.sent_count(), 1);
}

#[tokio::test]
async fn propagate_leaves_caller_message_untouched() {
    let node = TestNode::new(PropagationConfig::default());
    let (peer, _) = node.connect_peer();
    let message = payload();

    node.service.propagate([peer], &message, &service(), 10).await;

    assert!(message.prop_header().is_none());
    assert_eq!(message, payload());
}

#[tokio::test]
async fn neighbors_forwarded() {
    let node = TestNode::new(PropagationConfig::default());

    let outcome = node
        .service
        .propagate_to_neighbors(&payload(), &service(), 7)
        .await
        .unwrap();

    assert_eq!(outcome, NeighborOutcome::Forwarded);
    assert_eq!(node.network.count(), 1);
    assert_eq!(ttl_of(&node.network.last_message().unwrap()), 7);
}

#[tokio::test]
async fn neighbors_failure_is_returned() {
    let node = TestNode::with_network(PropagationConfig::default(), RecordingBroadcast::failing());

    let result = node.service.propagate_to_neighbors(&payload(), &service(), 7).await;

    assert_matches!(result, Err(PropagationError::Broadcast(NetworkError::Unavailable)));
}

#[tokio::test]
async fn neighbors_declined_with_zero_ttl() {
    let node = TestNode::with_network(PropagationConfig::default(), RecordingBroadcast::failing());

    let result = node.service.propagate_to_neighbors(&payload(), &service(), 0).await;

    assert_matches!(result, Ok(NeighborOutcome::Declined));
}

#[tokio::test]
async fn repropagate_consumes_one_hop() {
    let node = TestNode::new(PropagationConfig::default());
    let sender = PeerIdentity::random();
    let message = stamped_by(&sender, 5);
    let header = message.prop_header().unwrap().clone();

    let outcome = node.service.repropagate(&message, &header, &service()).await;

    assert_matches!(outcome, RepropagateOutcome::Forwarded);
    let forwarded = node.network.last_message().unwrap();
    let forwarded_header = forwarded.prop_header().unwrap();
    assert_eq!(forwarded_header.ttl(), 4);
    assert_eq!(forwarded_header.message_id(), header.message_id());
    assert!(forwarded_header.is_visited(&sender));
    assert!(forwarded_header.is_visited(&node.peer));
}

#[tokio::test]
async fn repropagate_last_hop_declines() {
    let node = TestNode::new(PropagationConfig::default());
    let message = stamped_by(&PeerIdentity::random(), 1);
    let header = message.prop_header().unwrap().clone();

    let outcome = node.service.repropagate(&message, &header, &service()).await;

    assert_matches!(outcome, RepropagateOutcome::Declined);
    assert_eq!(node.network.count(), 0);
}

#[tokio::test]
async fn repropagate_failure_is_not_raised() {
    let node = TestNode::with_network(PropagationConfig::default(), RecordingBroadcast::failing());
    let message = stamped_by(&PeerIdentity::random(), 5);
    let header = message.prop_header().unwrap().clone();

    let outcome = node.service.repropagate(&message, &header, &service()).await;

    assert_matches!(outcome, RepropagateOutcome::Failed(PropagationError::Broadcast(_)));
}

#[tokio::test]
async fn fanout_filters_disconnected_and_visited() {
    let node = TestNode::new(PropagationConfig::default());
    let connected: Vec<_> = (0..5).map(|_| node.connect_peer()).collect();

    node.connections.mark_disconnected(&connected[0].0);
    node.connections.mark_disconnected(&connected[1].0);

    let mut message = payload();
    let mut header = node
        .service
        .update_prop_header(&mut message, &service(), 10)
        .unwrap();
    header.add_visited(connected[2].0.clone());
    message.set_prop_header(header.clone());

    let report = node.service.send_to_each_connection(&message, &header).await;

    assert_eq!(
        report,
        FanoutReport {
            sent: 2,
            failed: 0,
            skipped_disconnected: 2,
            skipped_visited: 1,
        }
    );
    for (i, (_, channel)) in connected.iter().enumerate() {
        assert_eq!(channel.sent_count(), usize::from(i >= 3), "connection {i}");
    }
}

#[tokio::test]
async fn fanout_uses_reliable_send_for_index_messages() {
    let node = TestNode::new(PropagationConfig::default());
    let (_, channel) = node.connect_peer();

    let index = payload().with_element(INDEX_NAMESPACE, "entries", "x");
    let report = node
        .service
        .propagate_in_group(&index, &service(), 5)
        .await
        .unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(channel.reliable_count(), 1);

    node.service
        .propagate_in_group(&payload(), &service(), 5)
        .await
        .unwrap();
    assert_eq!(channel.sent_count(), 2);
    assert_eq!(channel.reliable_count(), 1);
}

#[tokio::test]
async fn fanout_counts_failures() {
    let node = TestNode::new(PropagationConfig::default());
    let peer = PeerIdentity::random();
    node.connect_with(&peer, FailingChannel::for_peer(&peer));
    node.connect_peer();

    let report = node
        .service
        .propagate_in_group(&payload(), &service(), 5)
        .await
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.attempted(), 2);
}

#[tokio::test]
async fn group_propagation_declined_with_zero_ttl() {
    let node = TestNode::new(PropagationConfig::default());
    let (_, channel) = node.connect_peer();

    assert!(node.service.propagate_in_group(&payload(), &service(), 0).await.is_none());
    assert_eq!(channel.sent_count(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fanout_never_reaches_visited_or_disconnected(
        flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..12)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        runtime.block_on(async {
            let node = TestNode::new(PropagationConfig::default());
            let mut message = payload();
            let mut header = node
                .service
                .update_prop_header(&mut message, &service(), 10)
                .unwrap();

            let mut expected = 0;
            let mut connections = Vec::new();
            for (live, visited) in &flags {
                let (peer, channel) = node.connect_peer();
                if !live {
                    node.connections.mark_disconnected(&peer);
                }
                if *visited {
                    header.add_visited(peer.clone());
                }
                if *live && !visited {
                    expected += 1;
                }
                connections.push((*live, *visited, channel));
            }
            message.set_prop_header(header.clone());

            let report = node.service.send_to_each_connection(&message, &header).await;

            prop_assert_eq!(report.sent, expected);
            for (live, visited, channel) in &connections {
                let reached = channel.sent_count() > 0;
                prop_assert_eq!(reached, *live && !visited);
            }
            Ok(())
        })?;
    }
}
