//! Channels that record, fail or stall.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rendezvous_api::{Channel, ChannelError};
use rendezvous_message::Message;
use rendezvous_primitives::{EndpointAddress, PeerIdentity, ServiceAddress};

/// A message captured by a [`RecordingChannel`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: Message,
    pub service: ServiceAddress,
    pub reliable: bool,
}

/// Channel that accepts every send and keeps a copy of it.
#[derive(Debug)]
pub struct RecordingChannel {
    destination: EndpointAddress,
    sent: Mutex<Vec<SentMessage>>,
    closed: AtomicBool,
}

impl RecordingChannel {
    pub fn new(destination: EndpointAddress) -> Arc<Self> {
        Arc::new(Self {
            destination,
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn for_peer(peer: &PeerIdentity) -> Arc<Self> {
        Self::new(EndpointAddress::for_peer(peer, None))
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn reliable_count(&self) -> usize {
        self.sent.lock().iter().filter(|s| s.reliable).count()
    }

    pub fn last_message(&self) -> Option<Message> {
        self.sent.lock().last().map(|s| s.message.clone())
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn record(&self, message: Message, service: &ServiceAddress, reliable: bool) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed(self.destination.clone()));
        }
        self.sent.lock().push(SentMessage {
            message,
            service: service.clone(),
            reliable,
        });
        Ok(())
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn destination(&self) -> &EndpointAddress {
        &self.destination
    }

    async fn send(&self, message: Message, service: &ServiceAddress) -> Result<(), ChannelError> {
        self.record(message, service, false)
    }

    async fn send_reliable(
        &self,
        message: Message,
        service: &ServiceAddress,
    ) -> Result<(), ChannelError> {
        self.record(message, service, true)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Channel whose sends always fail as if the transport went away.
#[derive(Debug)]
pub struct FailingChannel {
    destination: EndpointAddress,
    attempts: AtomicUsize,
}

impl FailingChannel {
    pub fn for_peer(peer: &PeerIdentity) -> Arc<Self> {
        Arc::new(Self {
            destination: EndpointAddress::for_peer(peer, None),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Channel for FailingChannel {
    fn destination(&self) -> &EndpointAddress {
        &self.destination
    }

    async fn send(&self, _message: Message, _service: &ServiceAddress) -> Result<(), ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ChannelError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )))
    }
}

/// Channel whose sends never complete.
#[derive(Debug)]
pub struct StallingChannel {
    destination: EndpointAddress,
}

impl StallingChannel {
    pub fn for_peer(peer: &PeerIdentity) -> Arc<Self> {
        Arc::new(Self {
            destination: EndpointAddress::for_peer(peer, None),
        })
    }
}

#[async_trait]
impl Channel for StallingChannel {
    fn destination(&self) -> &EndpointAddress {
        &self.destination
    }

    async fn send(&self, _message: Message, _service: &ServiceAddress) -> Result<(), ChannelError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}
