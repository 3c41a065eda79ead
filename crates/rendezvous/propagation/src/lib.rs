//! Flood propagation core of the rendezvous overlay.
//!
//! A message injected by any peer travels a bounded neighborhood of the
//! overlay. Each hop stamps a [`PropagationHeader`] carrying the message id,
//! the remaining hop budget (TTL) and the set of peers already visited; a
//! header whose TTL runs out stops the flood and visited peers are never
//! sent the message again.
//!
//! [`PropagationService`] exposes the outbound operations (targeted,
//! neighbor and group propagation, repropagation), the inbound dispatcher and
//! the connect/disconnect requests.
//!
//! [`PropagationHeader`]: rendezvous_message::PropagationHeader

mod args;
mod cache;
mod config;
mod error;
mod fanout;
mod handshake;
pub mod header;
mod inbound;
mod metrics;
mod outcome;
mod service;

pub use args::PropagationArgs;
pub use config::{
    CONTROL_SERVICE_NAME, DEFAULT_DUPLICATE_CACHE_SIZE, DEFAULT_MAX_CONCURRENT_SENDS,
    DEFAULT_SEND_TIMEOUT, DEFAULT_UNKNOWN_PEER_TTL, NodeRole, PROPAGATION_SERVICE_NAME,
    PropagationConfig,
};
pub use error::PropagationError;
pub use inbound::{InboundClass, InboundDisposition, InboundReport};
pub use metrics::PropagationMetrics;
pub use outcome::{
    ControlOutcome, DeliveryReport, FanoutReport, NeighborOutcome, PropagateOutcome,
    RepropagateOutcome,
};
pub use service::{Collaborators, PropagationService};
