//! Error types reported by collaborators.
//!
//! These are transient by nature: the propagation core counts and logs them
//! and only escalates [`NetworkError`] from a neighbor broadcast.

use std::time::Duration;

use rendezvous_primitives::EndpointAddress;

/// Failure sending on a single channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel was closed by the transport.
    #[error("channel to {0} is closed")]
    Closed(EndpointAddress),

    /// The outbound queue is full and the caller asked not to wait.
    #[error("channel to {0} is saturated")]
    Saturated(EndpointAddress),

    /// The send did not complete within the configured bound.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a network-level neighbor broadcast.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// No transport is able to broadcast (e.g. multicast disabled).
    #[error("no broadcast-capable transport available")]
    Unavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure handing a message to a local service.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// No listener is registered for the destination service.
    #[error("no listener registered for service {0}")]
    NoListener(String),

    #[error("listener rejected message: {0}")]
    Rejected(String),
}
