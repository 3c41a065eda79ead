#![allow(dead_code, unreachable_pub)]

use std::sync::Arc;

use rendezvous_api::{Channel, NoPeerView, PeerViewLookup, StaticAdvertisement};
use rendezvous_message::{Message, PeerAdvertisement, PropagationHeader};
use rendezvous_net_peers::PeerConnectionTable;
use rendezvous_primitives::{PeerIdentity, ServiceAddress};
use rendezvous_propagation::{Collaborators, PropagationConfig, PropagationService, header};
use rendezvous_test_utils::{MemoryEndpoint, RecordingBroadcast, RecordingChannel, RecordingDelivery};
use tracing::subscriber::DefaultGuard;

/// One peer wired to in-memory collaborators.
pub struct TestNode {
    pub peer: PeerIdentity,
    pub advertisement: PeerAdvertisement,
    pub service: PropagationService,
    pub connections: Arc<PeerConnectionTable>,
    pub endpoint: Arc<MemoryEndpoint>,
    pub network: Arc<RecordingBroadcast>,
    pub delivery: Arc<RecordingDelivery>,
}

impl TestNode {
    pub fn new(config: PropagationConfig) -> Self {
        Self::build(config, Arc::new(NoPeerView), RecordingBroadcast::new())
    }

    pub fn with_peer_view(config: PropagationConfig, peer_view: Arc<dyn PeerViewLookup>) -> Self {
        Self::build(config, peer_view, RecordingBroadcast::new())
    }

    pub fn with_network(config: PropagationConfig, network: RecordingBroadcast) -> Self {
        Self::build(config, Arc::new(NoPeerView), network)
    }

    fn build(
        config: PropagationConfig,
        peer_view: Arc<dyn PeerViewLookup>,
        network: RecordingBroadcast,
    ) -> Self {
        let peer = PeerIdentity::random();
        let advertisement = PeerAdvertisement::new(peer.clone(), "test-node");
        let connections = Arc::new(PeerConnectionTable::new());
        let endpoint = Arc::new(MemoryEndpoint::new());
        let network = Arc::new(network);
        let delivery = Arc::new(RecordingDelivery::new());

        let service = PropagationService::new(
            peer.clone(),
            config.with_metrics(false),
            connections.clone(),
            Collaborators {
                endpoint: endpoint.clone(),
                network: network.clone(),
                peer_view,
                delivery: delivery.clone(),
                advertisement: Arc::new(
                    StaticAdvertisement::from_advertisement(&advertisement)
                        .expect("advertisement encodes"),
                ),
            },
        );

        Self {
            peer,
            advertisement,
            service,
            connections,
            endpoint,
            network,
            delivery,
        }
    }

    /// Add a live connection to a fresh peer, returning the peer and its channel.
    pub fn connect_peer(&self) -> (PeerIdentity, Arc<RecordingChannel>) {
        let peer = PeerIdentity::random();
        let channel = RecordingChannel::for_peer(&peer);
        self.connections.connect(peer.clone(), channel.clone());
        (peer, channel)
    }

    pub fn connect_with(&self, peer: &PeerIdentity, channel: Arc<dyn Channel>) {
        self.connections.connect(peer.clone(), channel);
    }
}

pub fn service() -> ServiceAddress {
    ServiceAddress::with_param("discovery", "group-1")
}

pub fn payload() -> Message {
    Message::new().with_element("app", "query", "payload")
}

/// A message as it arrives from `sender`: stamped by it with `ttl`.
pub fn stamped_by(sender: &PeerIdentity, ttl: u32) -> Message {
    let mut message = payload();
    header::update_prop_header(sender, 200, &mut message, &service(), ttl)
        .expect("ttl is positive");
    message
}

pub fn ttl_of(message: &Message) -> u32 {
    message.prop_header().map(PropagationHeader::ttl).unwrap_or(0)
}

/// Scoped subscriber writing to the test harness output.
pub fn init_tracing() -> DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}
