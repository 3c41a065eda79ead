//! Per-hop propagation header update.

use rendezvous_message::{Message, PropagationHeader};
use rendezvous_primitives::{PeerIdentity, ServiceAddress};

/// Stamp `message` for one more hop by `local_peer`.
///
/// A message without a header gets a fresh one (new message id, empty visited
/// set) addressed to `service`. An existing header loses one unit of TTL if
/// `local_peer` has not stamped it before, so re-stamping on the same peer only
/// caps. In both cases the TTL is then capped to `min(requested_ttl, max_ttl)`.
///
/// Returns `None`, leaving `message` untouched, when the resulting TTL is zero
/// and the message must not be sent. Otherwise `local_peer` is recorded as
/// visited, the header is written into `message` and a copy returned.
pub fn update_prop_header(
    local_peer: &PeerIdentity,
    max_ttl: u32,
    message: &mut Message,
    service: &ServiceAddress,
    requested_ttl: u32,
) -> Option<PropagationHeader> {
    let limit = requested_ttl.min(max_ttl);

    let mut header = match message.prop_header() {
        None => PropagationHeader::new(service.clone(), limit),
        Some(existing) => {
            let mut header = existing.clone();
            if !header.is_visited(local_peer) {
                header.consume_hop();
            }
            header.cap_ttl(limit);
            header
        }
    };

    if header.ttl() == 0 {
        return None;
    }

    header.add_visited(local_peer.clone());
    message.set_prop_header(header.clone());
    Some(header)
}
