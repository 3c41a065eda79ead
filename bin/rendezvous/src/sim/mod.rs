//! In-process overlay simulation.
//!
//! Every node runs its own [`PropagationService`] wired to an in-memory
//! transport. One node floods a message with [`PropagationService::propagate_in_group`];
//! envelopes are then drained from the shared queue and handed to the
//! receiving node's inbound dispatcher until the flood dies out.

mod overlay;
mod topology;

use std::collections::HashMap;
use std::sync::Arc;

use eyre::{Result, WrapErr, eyre};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rendezvous_api::{NoPeerView, StaticAdvertisement};
use rendezvous_message::{Message, PeerAdvertisement};
use rendezvous_net_peers::PeerConnectionTable;
use rendezvous_primitives::{EndpointAddress, PeerIdentity, ServiceAddress};
use rendezvous_propagation::{
    Collaborators, InboundDisposition, PropagationConfig, PropagationService, RepropagateOutcome,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::SimConfig;
use overlay::{
    CountingDelivery, Envelope, OverlayBroadcast, OverlayChannel, OverlayEndpoint,
};
use topology::Topology;

/// Outcome of one flood.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SimReport {
    pub(crate) nodes: usize,
    pub(crate) links: usize,
    /// Nodes other than the origin that delivered the message locally.
    pub(crate) reached: usize,
    /// Envelopes handled by inbound dispatchers.
    pub(crate) messages: usize,
    pub(crate) duplicates: usize,
    pub(crate) repropagated: usize,
}

struct SimNode {
    service: PropagationService,
    address: EndpointAddress,
    delivery: Arc<CountingDelivery>,
}

pub(crate) struct Simulation {
    nodes: Vec<SimNode>,
    links: usize,
    ttl: u32,
    queue: mpsc::UnboundedReceiver<Envelope>,
}

impl Simulation {
    pub(crate) fn build(config: &SimConfig) -> Result<Self> {
        let topology_config = &config.topology;
        let mut rng = match topology_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let topology =
            Topology::ring_with_chords(topology_config.nodes, topology_config.chords, &mut rng);

        let peers: Vec<PeerIdentity> = (0..topology.len()).map(|_| PeerIdentity::random()).collect();
        let index: Arc<HashMap<PeerIdentity, usize>> = Arc::new(
            peers
                .iter()
                .enumerate()
                .map(|(i, peer)| (peer.clone(), i))
                .collect(),
        );
        let propagation = PropagationConfig::from(&config.propagation);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut nodes = Vec::with_capacity(peers.len());
        for (i, peer) in peers.iter().enumerate() {
            let neighbors: Vec<(usize, &PeerIdentity)> = topology
                .neighbors(i)
                .filter_map(|j| peers.get(j).map(|p| (j, p)))
                .collect();

            let connections = Arc::new(PeerConnectionTable::new());
            for (j, neighbor) in &neighbors {
                let channel = OverlayChannel::new(peer.clone(), *j, neighbor, tx.clone());
                connections.connect((*neighbor).clone(), Arc::new(channel));
            }
            let broadcast = OverlayBroadcast::new(
                neighbors
                    .iter()
                    .map(|(j, neighbor)| OverlayChannel::new(peer.clone(), *j, neighbor, tx.clone()))
                    .collect(),
            );

            let advertisement = PeerAdvertisement::new(peer.clone(), format!("sim-{i}"));
            let advertisement = StaticAdvertisement::from_advertisement(&advertisement)
                .wrap_err("failed to encode node advertisement")?;
            let delivery = Arc::new(CountingDelivery::default());

            let service = PropagationService::new(
                peer.clone(),
                propagation.clone(),
                connections,
                Collaborators {
                    endpoint: Arc::new(OverlayEndpoint::new(peer.clone(), index.clone(), tx.clone())),
                    network: Arc::new(broadcast),
                    peer_view: Arc::new(NoPeerView),
                    delivery: delivery.clone(),
                    advertisement: Arc::new(advertisement),
                },
            );

            nodes.push(SimNode {
                service,
                address: EndpointAddress::for_peer(peer, None),
                delivery,
            });
        }

        debug!(nodes = nodes.len(), links = topology.link_count(), "overlay built");
        Ok(Self {
            nodes,
            links: topology.link_count(),
            ttl: topology_config.ttl,
            queue: rx,
        })
    }

    /// Flood one message from node 0 and drain the overlay.
    pub(crate) async fn run(mut self) -> Result<SimReport> {
        let mut report = SimReport {
            nodes: self.nodes.len(),
            links: self.links,
            ..Default::default()
        };

        let origin = self.nodes.first().ok_or_else(|| eyre!("empty overlay"))?;
        let message = Message::new().with_element("sim", "payload", "flood");
        let service = ServiceAddress::with_param("sim", "flood");

        let Some(fanout) = origin
            .service
            .propagate_in_group(&message, &service, self.ttl)
            .await
        else {
            info!(ttl = self.ttl, "ttl exhausted at origin, nothing sent");
            return Ok(report);
        };
        debug!(sent = fanout.sent, failed = fanout.failed, "origin fan-out");

        while let Ok(envelope) = self.queue.try_recv() {
            let Some(node) = self.nodes.get(envelope.to) else {
                continue;
            };
            let source = EndpointAddress::for_peer(
                &envelope.from,
                Some(node.service.config().propagation_service.clone()),
            );

            let inbound = node
                .service
                .process_received_message(envelope.message, &source, &node.address)
                .await;

            report.messages += 1;
            match inbound.disposition {
                InboundDisposition::Duplicate => report.duplicates += 1,
                InboundDisposition::Processed {
                    repropagation: Some(RepropagateOutcome::Forwarded),
                    ..
                } => report.repropagated += 1,
                _ => {}
            }
        }

        report.reached = self
            .nodes
            .iter()
            .skip(1)
            .filter(|node| node.delivery.count() > 0)
            .count();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;
    use rendezvous_propagation::NodeRole;

    fn ring(nodes: usize, ttl: u32) -> SimConfig {
        SimConfig {
            topology: TopologyConfig {
                nodes,
                chords: 0,
                ttl,
                seed: Some(1),
            },
            ..Default::default()
        }
    }

    async fn flood(config: SimConfig) -> SimReport {
        Simulation::build(&config).unwrap().run().await.unwrap()
    }

    #[tokio::test]
    async fn test_ttl_bounds_reach_on_ring() {
        // Three hops in each direction around the ring.
        let report = flood(ring(20, 3)).await;
        assert_eq!(report.reached, 6);
        assert_eq!(report.links, 20);
    }

    #[tokio::test]
    async fn test_single_hop_reaches_direct_neighbors() {
        let report = flood(ring(20, 1)).await;
        assert_eq!(report.reached, 2);
        assert_eq!(report.repropagated, 0);
    }

    #[tokio::test]
    async fn test_large_ttl_covers_overlay() {
        let report = flood(ring(16, 50)).await;
        assert_eq!(report.reached, 15);
        assert!(report.duplicates > 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_sends_nothing() {
        let report = flood(ring(8, 0)).await;
        assert_eq!(report.reached, 0);
        assert_eq!(report.messages, 0);
    }

    #[tokio::test]
    async fn test_edge_nodes_do_not_repropagate() {
        let mut config = ring(20, 10);
        config.propagation.role = NodeRole::Edge;
        let report = flood(config).await;
        assert_eq!(report.reached, 2);
        assert_eq!(report.repropagated, 0);
    }

    #[tokio::test]
    async fn test_chords_reach_further() {
        let mut config = ring(40, 3);
        config.topology.chords = 3;
        config.topology.seed = Some(11);
        let report = flood(config).await;
        assert!(report.reached > 6);
    }
}
