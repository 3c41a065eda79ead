//! Results of propagation calls.

use crate::error::PropagationError;

/// Tally of a connection fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub sent: usize,
    pub failed: usize,
    pub skipped_disconnected: usize,
    pub skipped_visited: usize,
}

impl FanoutReport {
    /// Connections a send was attempted on.
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}

/// Tally of a targeted propagation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

/// Result of [`propagate`](crate::PropagationService::propagate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagateOutcome {
    /// TTL exhausted; nothing was sent.
    Declined,
    Delivered(DeliveryReport),
}

impl PropagateOutcome {
    pub fn sent(&self) -> usize {
        match self {
            Self::Declined => 0,
            Self::Delivered(report) => report.sent,
        }
    }
}

/// Result of a successful neighbor propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborOutcome {
    Forwarded,
    /// TTL exhausted; nothing was broadcast.
    Declined,
}

/// Result of a repropagation. Never escalated.
#[derive(Debug)]
pub enum RepropagateOutcome {
    Forwarded,
    Declined,
    Failed(PropagationError),
}

/// Result of sending a connect or disconnect request. Never escalated.
#[derive(Debug)]
pub enum ControlOutcome {
    Sent,
    /// No channel to the peer could be acquired.
    NoChannel,
    Failed(PropagationError),
}

impl ControlOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}
