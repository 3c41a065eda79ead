//! The propagation service and its outbound operations.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use rendezvous_api::{
    AdvertisementSource, ChannelError, Endpoint, LocalDelivery, NeighborBroadcast, PeerViewLookup,
};
use rendezvous_message::{Message, PropagationHeader};
use rendezvous_net_peers::PeerConnectionTable;
use rendezvous_primitives::{EndpointAddress, PeerIdentity, ServiceAddress};
use tracing::{Instrument, debug, debug_span, trace, warn};

use crate::cache::DuplicateCache;
use crate::config::PropagationConfig;
use crate::error::PropagationError;
use crate::header;
use crate::metrics::PropagationMetrics;
use crate::outcome::{
    DeliveryReport, FanoutReport, NeighborOutcome, PropagateOutcome, RepropagateOutcome,
};

/// Collaborators the propagation service is wired to.
pub struct Collaborators {
    pub endpoint: Arc<dyn Endpoint>,
    pub network: Arc<dyn NeighborBroadcast>,
    /// Peer view of a rendezvous node; edge nodes pass `NoPeerView`.
    pub peer_view: Arc<dyn PeerViewLookup>,
    pub delivery: Arc<dyn LocalDelivery>,
    pub advertisement: Arc<dyn AdvertisementSource>,
}

/// Flood propagation for one peer.
///
/// Every call works on its own copy of the message; the only state shared
/// between calls is the read-mostly connection table and the duplicate cache.
/// Per-destination failures are counted, never raised.
pub struct PropagationService {
    pub(crate) local_peer: PeerIdentity,
    pub(crate) config: PropagationConfig,
    pub(crate) connections: Arc<PeerConnectionTable>,
    pub(crate) endpoint: Arc<dyn Endpoint>,
    pub(crate) network: Arc<dyn NeighborBroadcast>,
    pub(crate) peer_view: Arc<dyn PeerViewLookup>,
    pub(crate) delivery: Arc<dyn LocalDelivery>,
    pub(crate) advertisement: Arc<dyn AdvertisementSource>,
    pub(crate) seen: DuplicateCache,
    pub(crate) metrics: PropagationMetrics,
}

impl PropagationService {
    pub fn new(
        local_peer: PeerIdentity,
        config: PropagationConfig,
        connections: Arc<PeerConnectionTable>,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            endpoint,
            network,
            peer_view,
            delivery,
            advertisement,
        } = collaborators;

        Self {
            local_peer,
            seen: DuplicateCache::new(config.duplicate_cache_size),
            metrics: PropagationMetrics::new(config.metrics_enabled),
            config,
            connections,
            endpoint,
            network,
            peer_view,
            delivery,
            advertisement,
        }
    }

    pub fn local_peer(&self) -> &PeerIdentity {
        &self.local_peer
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// The connection table this service reads from.
    pub fn connections(&self) -> &Arc<PeerConnectionTable> {
        &self.connections
    }

    /// Stamp `message` for a hop by the local peer.
    ///
    /// See [`header::update_prop_header`]; the cap is this service's `max_ttl`.
    pub fn update_prop_header(
        &self,
        message: &mut Message,
        service: &ServiceAddress,
        ttl: u32,
    ) -> Option<PropagationHeader> {
        header::update_prop_header(&self.local_peer, self.config.max_ttl, message, service, ttl)
    }

    /// Send `message` to each of `destinations`.
    ///
    /// A live connection to a destination is used directly; a disconnected
    /// one is skipped. Destinations with no connection get a transient
    /// channel. Sends run concurrently and each is bounded by the send timeout.
    pub async fn propagate<I>(
        &self,
        destinations: I,
        message: &Message,
        service: &ServiceAddress,
        ttl: u32,
    ) -> PropagateOutcome
    where
        I: IntoIterator<Item = PeerIdentity>,
    {
        let mut message = message.clone();
        let use_ttl = ttl.min(self.config.max_ttl);

        let Some(header) = self.update_prop_header(&mut message, service, use_ttl) else {
            debug!(%service, "ttl exhausted, declining to propagate");
            return PropagateOutcome::Declined;
        };
        self.seen.insert(header.message_id());

        let span = debug_span!("propagate", message_id = %header.message_id(), ttl = header.ttl());
        let report = self
            .send_to_destinations(destinations, &message)
            .instrument(span)
            .await;

        self.metrics.record_delivery(&report);
        PropagateOutcome::Delivered(report)
    }

    /// Flood `message` to directly adjacent peers through the network-level
    /// broadcast. Unlike the other operations a failure is returned.
    pub async fn propagate_to_neighbors(
        &self,
        message: &Message,
        service: &ServiceAddress,
        ttl: u32,
    ) -> Result<NeighborOutcome, PropagationError> {
        let mut message = message.clone();

        let Some(header) = self.update_prop_header(&mut message, service, ttl) else {
            debug!(%service, "ttl exhausted, declining to propagate to neighbors");
            return Ok(NeighborOutcome::Declined);
        };
        self.seen.insert(header.message_id());

        match self
            .network
            .broadcast(message, &self.config.propagation_service)
            .await
        {
            Ok(()) => {
                trace!(message_id = %header.message_id(), ttl = header.ttl(), "propagated to neighbors");
                self.metrics.inc_neighbor_propagations();
                Ok(NeighborOutcome::Forwarded)
            }
            Err(error) => {
                warn!(message_id = %header.message_id(), %error, "neighbor propagation failed");
                self.metrics.inc_neighbor_failures();
                Err(PropagationError::Broadcast(error))
            }
        }
    }

    /// Stamp `message` and fan it out to every live, unvisited connection.
    ///
    /// Returns `None` if the TTL is exhausted.
    pub async fn propagate_in_group(
        &self,
        message: &Message,
        service: &ServiceAddress,
        ttl: u32,
    ) -> Option<FanoutReport> {
        let mut message = message.clone();

        let Some(header) = self.update_prop_header(&mut message, service, ttl) else {
            debug!(%service, "ttl exhausted, declining to propagate in group");
            return None;
        };
        self.seen.insert(header.message_id());

        Some(self.send_to_each_connection(&message, &header).await)
    }

    /// Re-inject a received message into the overlay.
    ///
    /// The message is re-stamped with `max_ttl` as the requested budget and
    /// handed to the neighbor broadcast. Failures are logged and returned,
    /// never raised.
    pub async fn repropagate(
        &self,
        message: &Message,
        header: &PropagationHeader,
        service: &ServiceAddress,
    ) -> RepropagateOutcome {
        self.metrics.inc_repropagated();

        let mut message = message.clone();
        message.set_prop_header(header.clone());
        debug!(message_id = %header.message_id(), "repropagating");

        let Some(header) = self.update_prop_header(&mut message, service, self.config.max_ttl)
        else {
            debug!(message_id = %header.message_id(), "ttl exhausted, declining to repropagate");
            return RepropagateOutcome::Declined;
        };

        match self
            .network
            .broadcast(message, &self.config.propagation_service)
            .await
        {
            Ok(()) => RepropagateOutcome::Forwarded,
            Err(error) => {
                warn!(message_id = %header.message_id(), %error, "failed to repropagate");
                RepropagateOutcome::Failed(PropagationError::Broadcast(error))
            }
        }
    }

    async fn send_to_destinations<I>(&self, destinations: I, message: &Message) -> DeliveryReport
    where
        I: IntoIterator<Item = PeerIdentity>,
    {
        let results: Vec<bool> = stream::iter(destinations)
            .map(|peer| self.send_to_destination(peer, message))
            .buffer_unordered(self.config.max_concurrent_sends.max(1))
            .collect()
            .await;

        let sent = results.iter().filter(|ok| **ok).count();
        let report = DeliveryReport {
            sent,
            failed: results.len() - sent,
        };
        debug!(sent = report.sent, failed = report.failed, "propagated to destinations");
        report
    }

    async fn send_to_destination(&self, peer: PeerIdentity, message: &Message) -> bool {
        let service = &self.config.propagation_service;

        let result = match self.connections.lookup(&peer) {
            Some(connection) if connection.is_connected() => {
                trace!(%peer, "sending on existing connection");
                self.send_bounded(connection.send(message.clone(), service))
                    .await
            }
            Some(_) => {
                trace!(%peer, "skipping disconnected connection");
                return false;
            }
            None => {
                let address = EndpointAddress::for_peer(&peer, Some(service.clone()));
                let Some(channel) = self.endpoint.open_channel(&address, None).await else {
                    trace!(%peer, "no channel available");
                    return false;
                };
                trace!(%peer, "sending on transient channel");
                self.send_bounded(channel.send(message.clone(), service))
                    .await
            }
        };

        match result {
            Ok(()) => true,
            Err(error) => {
                debug!(%peer, %error, "failed to send");
                false
            }
        }
    }

    /// Run one send under the configured timeout.
    pub(crate) async fn send_bounded<F>(&self, send: F) -> Result<(), PropagationError>
    where
        F: Future<Output = Result<(), ChannelError>>,
    {
        match tokio::time::timeout(self.config.send_timeout, send).await {
            Ok(result) => result.map_err(PropagationError::from),
            Err(_) => Err(PropagationError::SendTimeout(self.config.send_timeout)),
        }
    }
}

impl std::fmt::Debug for PropagationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationService")
            .field("local_peer", &self.local_peer)
            .field("role", &self.config.role)
            .field("connections", &self.connections.len())
            .finish_non_exhaustive()
    }
}
