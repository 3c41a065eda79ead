//! Inbound classification and the base receive flow.

use rendezvous_message::{Message, PropagationHeader};
use rendezvous_primitives::{EndpointAddress, PeerIdentity};
use tracing::{Instrument, debug, debug_span, trace, warn};

use crate::outcome::{ControlOutcome, RepropagateOutcome};
use crate::service::PropagationService;

/// Relationship of an inbound message's sender to the local peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundClass {
    /// The source names a peer with an invalid identity, or the message has
    /// no propagation header.
    Malformed,
    /// Sent by the local peer itself.
    Loopback,
    /// Sender has an entry in the connection table.
    KnownDirect { peer: PeerIdentity },
    /// Sender is not connected but is a member of the peer view.
    KnownIndirect { peer: PeerIdentity },
    /// Sender is neither connected nor in the peer view.
    Unknown { peer: PeerIdentity },
    /// Source is a raw network address rather than a peer.
    Network,
}

/// What the base flow did with an inbound message.
#[derive(Debug)]
pub enum InboundDisposition {
    /// Not processed.
    Dropped,
    /// Message id already seen.
    Duplicate,
    Processed {
        /// Whether local delivery accepted the message.
        delivered: bool,
        /// Set when the local node repropagated the message.
        repropagation: Option<RepropagateOutcome>,
    },
}

/// Result of [`process_received_message`](PropagationService::process_received_message).
#[derive(Debug)]
pub struct InboundReport {
    pub class: InboundClass,
    /// Disconnect request sent to an unknown sender.
    pub disconnect: Option<ControlOutcome>,
    pub disposition: InboundDisposition,
}

impl InboundReport {
    fn dropped(class: InboundClass) -> Self {
        Self {
            class,
            disconnect: None,
            disposition: InboundDisposition::Dropped,
        }
    }
}

impl PropagationService {
    /// Classify the sender of an inbound message, then run the base flow:
    /// duplicate check, local delivery and, on rendezvous nodes,
    /// repropagation.
    ///
    /// Messages from unknown peers and from the raw network have their TTL
    /// capped to `unknown_peer_ttl`. An unknown sender is asked to disconnect
    /// when this node is a rendezvous or has at least one live connection.
    pub async fn process_received_message(
        &self,
        message: Message,
        source: &EndpointAddress,
        destination: &EndpointAddress,
    ) -> InboundReport {
        let Some(header) = message.prop_header().cloned() else {
            warn!(%source, "received message without propagation header");
            return InboundReport::dropped(InboundClass::Malformed);
        };

        let span = debug_span!(
            "inbound",
            message_id = %header.message_id(),
            %source,
            %destination,
        );
        self.process_inbound(message, header, source)
            .instrument(span)
            .await
    }

    async fn process_inbound(
        &self,
        mut message: Message,
        mut header: PropagationHeader,
        source: &EndpointAddress,
    ) -> InboundReport {
        let class = self.classify(source);
        if class == InboundClass::Malformed {
            return InboundReport::dropped(class);
        }

        let disconnect = match &class {
            InboundClass::Unknown { peer } => {
                header.cap_ttl(self.config.unknown_peer_ttl);
                // Edge peers with no rendezvous should not send disconnects.
                if self.config.role.is_rendezvous() || self.connections.has_live_connection() {
                    Some(self.send_disconnect(peer, None).await)
                } else {
                    None
                }
            }
            InboundClass::Network => {
                header.cap_ttl(self.config.unknown_peer_ttl);
                None
            }
            _ => None,
        };

        message.set_prop_header(header.clone());
        let disposition = self.receive(message, header).await;

        InboundReport {
            class,
            disconnect,
            disposition,
        }
    }

    fn classify(&self, source: &EndpointAddress) -> InboundClass {
        let peer = match self.endpoint.resolve_peer(source) {
            Ok(Some(peer)) => peer,
            Ok(None) => {
                debug!("received from network, capping ttl");
                return InboundClass::Network;
            }
            Err(error) => {
                warn!(%error, "bad peer identity in source address");
                return InboundClass::Malformed;
            }
        };

        if peer == self.local_peer {
            debug!("received from loopback");
            return InboundClass::Loopback;
        }

        if let Some(connection) = self
            .connections
            .lookup(&peer)
            .filter(|connection| connection.is_connected())
        {
            connection.touch();
            debug!(%connection, "received from connected peer");
            return InboundClass::KnownDirect { peer };
        }

        if self.peer_view.lookup(&peer).is_some() {
            debug!(%peer, "received from peer view member");
            return InboundClass::KnownIndirect { peer };
        }

        debug!(%peer, "received from unrecognized peer");
        InboundClass::Unknown { peer }
    }

    async fn receive(&self, message: Message, header: PropagationHeader) -> InboundDisposition {
        if !self.seen.insert(header.message_id()) {
            trace!("duplicate, dropping");
            self.metrics.inc_duplicates_dropped();
            return InboundDisposition::Duplicate;
        }

        let service = header.service().clone();
        let delivered = match self.delivery.deliver(message.clone(), &service).await {
            Ok(()) => true,
            Err(error) => {
                debug!(%service, %error, "local delivery failed");
                false
            }
        };

        let repropagation = if self.config.role.is_rendezvous() && header.ttl() > 0 {
            Some(self.repropagate(&message, &header, &service).await)
        } else {
            None
        };

        InboundDisposition::Processed {
            delivered,
            repropagation,
        }
    }
}
