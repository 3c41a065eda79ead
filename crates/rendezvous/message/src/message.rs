//! Message value type.

use std::fmt;

use bytes::Bytes;

use crate::header::PropagationHeader;

/// Namespace of elements that mark a message as part of the shared resource
/// index. Such messages must be sent with the reliable variant.
pub const INDEX_NAMESPACE: &str = "srdi";

/// A named, namespaced payload inside a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageElement {
    pub namespace: String,
    pub name: String,
    pub body: Bytes,
}

impl MessageElement {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, body: Bytes) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            body,
        }
    }
}

/// A message travelling through the overlay.
///
/// `Message` has value semantics: cloning yields an independent message (the
/// element bodies are reference-counted [`Bytes`], so the clone is cheap).
/// Each destination of a fan-out receives its own clone, so a header update on
/// one copy is never observed through another.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Message {
    elements: Vec<MessageElement>,
    prop_header: Option<PropagationHeader>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`replace_element`](Self::replace_element).
    pub fn with_element(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        self.replace_element(MessageElement::new(namespace, name, body.into()));
        self
    }

    /// Insert `element`, replacing any element with the same namespace and name.
    pub fn replace_element(&mut self, element: MessageElement) {
        match self
            .elements
            .iter_mut()
            .find(|e| e.namespace == element.namespace && e.name == element.name)
        {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
    }

    pub fn element(&self, namespace: &str, name: &str) -> Option<&MessageElement> {
        self.elements
            .iter()
            .find(|e| e.namespace == namespace && e.name == name)
    }

    pub fn elements(&self) -> &[MessageElement] {
        &self.elements
    }

    pub fn elements_in<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a MessageElement> + 'a {
        self.elements.iter().filter(move |e| e.namespace == namespace)
    }

    pub fn prop_header(&self) -> Option<&PropagationHeader> {
        self.prop_header.as_ref()
    }

    pub fn set_prop_header(&mut self, header: PropagationHeader) {
        self.prop_header = Some(header);
    }

    pub fn clear_prop_header(&mut self) {
        self.prop_header = None;
    }

    /// Whether the message belongs to the shared resource index and therefore
    /// needs the reliable send variant.
    pub fn is_index_message(&self) -> bool {
        self.elements.iter().any(|e| e.namespace == INDEX_NAMESPACE)
    }

    /// Total payload size in bytes.
    pub fn byte_len(&self) -> usize {
        self.elements.iter().map(|e| e.body.len()).sum()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Message");
        s.field("elements", &self.elements.len());
        s.field("bytes", &self.byte_len());
        if let Some(header) = &self.prop_header {
            s.field("message_id", &header.message_id());
            s.field("ttl", &header.ttl());
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use rendezvous_primitives::{PeerIdentity, ServiceAddress};

    use super::*;

    #[test]
    fn test_replace_element() {
        let mut msg = Message::new().with_element("app", "body", "one");
        msg.replace_element(MessageElement::new("app", "body", Bytes::from("two")));
        assert_eq!(msg.elements().len(), 1);
        assert_eq!(msg.element("app", "body").unwrap().body, Bytes::from("two"));
    }

    #[test]
    fn test_same_name_different_namespace() {
        let msg = Message::new()
            .with_element("a", "body", "one")
            .with_element("b", "body", "two");
        assert_eq!(msg.elements().len(), 2);
        assert_eq!(msg.elements_in("b").count(), 1);
    }

    #[test]
    fn test_index_message() {
        let plain = Message::new().with_element("app", "body", "x");
        assert!(!plain.is_index_message());
        let index = plain.clone().with_element(INDEX_NAMESPACE, "entry", "y");
        assert!(index.is_index_message());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Message::new().with_element("app", "body", "x");
        original.set_prop_header(PropagationHeader::new(ServiceAddress::new("svc", None), 5));

        let mut copy = original.clone();
        let mut header = copy.prop_header().cloned().unwrap();
        header.add_visited(PeerIdentity::random());
        header.cap_ttl(1);
        copy.set_prop_header(header);

        let untouched = original.prop_header().unwrap();
        assert_eq!(untouched.ttl(), 5);
        assert_eq!(untouched.visited_len(), 0);
    }
}
