//! Rendezvous control messages (connect, disconnect and their replies).
//!
//! Each control message is a single element in [`RENDEZVOUS_NAMESPACE`] whose
//! name identifies the request and whose body is a peer or route
//! advertisement document.

use bytes::Bytes;
use strum::IntoEnumIterator;

use crate::message::{Message, MessageElement};

/// Namespace of rendezvous control elements.
pub const RENDEZVOUS_NAMESPACE: &str = "rdv";

/// Kind of rendezvous control message, serialised as the element name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum ControlKind {
    ConnectRequest,
    DisconnectRequest,
    ConnectedPeerReply,
    ConnectedLeaseReply,
    #[strum(serialize = "RendezvousAdvertisementReply")]
    ConnectedRendezvousAdvertisementReply,
    ConnectRequestNotification,
    // Misspelled on the wire; peers match on this exact name.
    #[strum(serialize = "DisonnectRequestNotification")]
    DisconnectRequestNotification,
}

impl ControlKind {
    pub fn element_name(self) -> &'static str {
        self.into()
    }

    pub fn is_request(self) -> bool {
        matches!(self, Self::ConnectRequest | Self::DisconnectRequest)
    }
}

/// A decoded control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMessage {
    kind: ControlKind,
    document: Bytes,
}

impl ControlMessage {
    pub fn new(kind: ControlKind, document: Bytes) -> Self {
        Self { kind, document }
    }

    pub fn connect(local_advertisement: Bytes) -> Self {
        Self::new(ControlKind::ConnectRequest, local_advertisement)
    }

    pub fn disconnect(local_advertisement: Bytes) -> Self {
        Self::new(ControlKind::DisconnectRequest, local_advertisement)
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn document(&self) -> &Bytes {
        &self.document
    }

    /// Build a fresh message carrying only this control element.
    pub fn to_message(&self) -> Message {
        let mut message = Message::new();
        message.replace_element(MessageElement::new(
            RENDEZVOUS_NAMESPACE,
            self.kind.element_name(),
            self.document.clone(),
        ));
        message
    }

    /// Find the first rendezvous control element in `message`.
    pub fn parse(message: &Message) -> Option<Self> {
        ControlKind::iter().find_map(|kind| {
            message
                .element(RENDEZVOUS_NAMESPACE, kind.element_name())
                .map(|element| Self::new(kind, element.body.clone()))
        })
    }
}
