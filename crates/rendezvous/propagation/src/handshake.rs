//! Connect and disconnect requests.
//!
//! Both are best-effort: a missing channel or a failed send is logged and
//! reported in the returned [`ControlOutcome`], never retried.

use rendezvous_message::{ControlMessage, Message, PeerAdvertisement};
use rendezvous_net_peers::PeerConnection;
use rendezvous_primitives::{EndpointAddress, PeerIdentity};
use tracing::{debug, warn};

use crate::outcome::ControlOutcome;
use crate::service::PropagationService;

impl PropagationService {
    /// Ask `peer` to drop its connection to us.
    ///
    /// The route of `advertisement`, when given, is used as a hint to reach
    /// the peer.
    pub async fn send_disconnect(
        &self,
        peer: &PeerIdentity,
        advertisement: Option<&PeerAdvertisement>,
    ) -> ControlOutcome {
        let message = ControlMessage::disconnect(self.advertisement.local_advertisement()).to_message();
        let outcome = self.send_control(peer, advertisement, message).await;
        if outcome.is_sent() {
            debug!(%peer, "sent disconnect request");
            self.metrics.inc_disconnects_sent();
        }
        outcome
    }

    /// Ask the peer on `connection` to drop its connection to us.
    pub async fn send_disconnect_to_connection(&self, connection: &PeerConnection) -> ControlOutcome {
        let message = ControlMessage::disconnect(self.advertisement.local_advertisement()).to_message();

        match self
            .send_bounded(connection.send(message, &self.config.control_service))
            .await
        {
            Ok(()) => {
                debug!(peer = %connection.peer(), "sent disconnect request");
                self.metrics.inc_disconnects_sent();
                ControlOutcome::Sent
            }
            Err(error) => {
                warn!(peer = %connection.peer(), %error, "failed to send disconnect request");
                ControlOutcome::Failed(error)
            }
        }
    }

    /// Ask `peer` for a connection lease.
    pub async fn send_connect(
        &self,
        peer: &PeerIdentity,
        advertisement: Option<&PeerAdvertisement>,
    ) -> ControlOutcome {
        let message = ControlMessage::connect(self.advertisement.local_advertisement()).to_message();
        let outcome = self.send_control(peer, advertisement, message).await;
        if outcome.is_sent() {
            debug!(%peer, "sent connect request");
        }
        outcome
    }

    async fn send_control(
        &self,
        peer: &PeerIdentity,
        advertisement: Option<&PeerAdvertisement>,
        message: Message,
    ) -> ControlOutcome {
        let address = EndpointAddress::for_peer(peer, None);
        let route = advertisement.and_then(PeerAdvertisement::route);

        let Some(channel) = self.endpoint.open_channel(&address, route).await else {
            warn!(%peer, "could not get a channel");
            return ControlOutcome::NoChannel;
        };

        match self
            .send_bounded(channel.send(message, &self.config.control_service))
            .await
        {
            Ok(()) => ControlOutcome::Sent,
            Err(error) => {
                warn!(%peer, %error, "control request failed");
                ControlOutcome::Failed(error)
            }
        }
    }
}
