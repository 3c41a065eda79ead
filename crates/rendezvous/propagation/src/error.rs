//! Propagation error types.

use std::time::Duration;

use rendezvous_api::{ChannelError, NetworkError};

/// Errors raised by the propagation service.
///
/// Only [`Broadcast`](Self::Broadcast) is ever returned to a caller; the
/// other variants describe per-destination failures that are counted in a
/// report or carried by a best-effort outcome.
#[derive(Debug, thiserror::Error)]
pub enum PropagationError {
    /// Neighbor broadcast failed.
    #[error("neighbor broadcast failed: {0}")]
    Broadcast(#[from] NetworkError),

    /// A single send did not complete in time.
    #[error("send timed out after {0:?}")]
    SendTimeout(Duration),

    /// A single send failed on its channel.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
