//! Lock-free per-connection state with atomics for hot paths.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use parking_lot::RwLock;
use rendezvous_api::{Channel, ChannelError};
use rendezvous_message::Message;
use rendezvous_primitives::{PeerIdentity, ServiceAddress};

/// Connection state (stored as u8 for atomic operations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum ConnectionState {
    Connecting = 0,
    Connected = 1,
    Disconnected = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Connected,
            _ => Self::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Direct, stateful link to one neighbor.
///
/// The connected flag is flipped by the connection-management layer as the
/// transport reports up/down; senders only read it. Handles are shared as
/// `Arc<PeerConnection>` so a table snapshot stays valid while the table
/// changes underneath it.
pub struct PeerConnection {
    peer: PeerIdentity,
    channel: RwLock<Arc<dyn Channel>>,

    state: AtomicU8,
    last_activity: AtomicU64,
}

impl PeerConnection {
    /// New connection in the `Connected` state.
    pub fn new(peer: PeerIdentity, channel: Arc<dyn Channel>) -> Self {
        Self {
            peer,
            channel: RwLock::new(channel),
            state: AtomicU8::new(ConnectionState::Connected as u8),
            last_activity: AtomicU64::new(current_unix_timestamp()),
        }
    }

    pub fn peer(&self) -> &PeerIdentity {
        &self.peer
    }

    pub fn connection_state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    pub fn set_connection_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Unix seconds of the last successful send or inbound traffic.
    pub fn last_activity(&self) -> u64 {
        self.last_activity.load(Ordering::Relaxed)
    }

    pub fn touch(&self) {
        self.last_activity
            .store(current_unix_timestamp(), Ordering::Relaxed);
    }

    pub fn channel(&self) -> Arc<dyn Channel> {
        self.channel.read().clone()
    }

    pub fn replace_channel(&self, channel: Arc<dyn Channel>) {
        *self.channel.write() = channel;
    }

    /// Best-effort send on this connection.
    pub async fn send(&self, message: Message, service: &ServiceAddress) -> Result<(), ChannelError> {
        let channel = self.live_channel()?;
        channel.send(message, service).await?;
        self.touch();
        Ok(())
    }

    /// Send that waits for queue capacity.
    pub async fn send_reliable(
        &self,
        message: Message,
        service: &ServiceAddress,
    ) -> Result<(), ChannelError> {
        let channel = self.live_channel()?;
        channel.send_reliable(message, service).await?;
        self.touch();
        Ok(())
    }

    fn live_channel(&self) -> Result<Arc<dyn Channel>, ChannelError> {
        let channel = self.channel();
        if !self.is_connected() || channel.is_closed() {
            return Err(ChannelError::Closed(channel.destination().clone()));
        }
        Ok(channel)
    }
}

impl fmt::Debug for PeerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerConnection")
            .field("peer", &self.peer)
            .field("state", &self.connection_state())
            .field("last_activity", &self.last_activity())
            .finish()
    }
}

impl fmt::Display for PeerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.peer, self.connection_state())
    }
}

fn current_unix_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
