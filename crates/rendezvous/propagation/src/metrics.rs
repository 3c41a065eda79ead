//! Propagation Metrics

use metrics::Counter;

use crate::outcome::{DeliveryReport, FanoutReport};

/// Propagation Metrics
#[derive(Clone, Debug)]
pub struct PropagationMetrics {
    /// Number of peers a targeted propagation reached
    pub(crate) propagated_peers_total: Counter,
    /// Number of failed per-destination sends of a targeted propagation
    pub(crate) propagate_failures_total: Counter,
    /// Number of connections a fan-out reached
    pub(crate) fanout_sent_total: Counter,
    /// Number of failed fan-out sends
    pub(crate) fanout_failures_total: Counter,
    /// Number of successful neighbor broadcasts
    pub(crate) neighbor_propagations_total: Counter,
    /// Number of failed neighbor broadcasts
    pub(crate) neighbor_failures_total: Counter,
    /// Number of received messages repropagated
    pub(crate) repropagated_total: Counter,
    /// Number of received messages dropped as duplicates
    pub(crate) duplicates_dropped_total: Counter,
    /// Number of disconnect requests sent
    pub(crate) disconnects_sent_total: Counter,
}

impl Default for PropagationMetrics {
    fn default() -> Self {
        Self {
            propagated_peers_total: metrics::counter!("rendezvous.propagate.peers_total"),
            propagate_failures_total: metrics::counter!("rendezvous.propagate.failures_total"),
            fanout_sent_total: metrics::counter!("rendezvous.propagate.fanout_sent_total"),
            fanout_failures_total: metrics::counter!(
                "rendezvous.propagate.fanout_failures_total"
            ),
            neighbor_propagations_total: metrics::counter!(
                "rendezvous.propagate.neighbors_total"
            ),
            neighbor_failures_total: metrics::counter!(
                "rendezvous.propagate.neighbors_failed_total"
            ),
            repropagated_total: metrics::counter!("rendezvous.propagate.repropagated_total"),
            duplicates_dropped_total: metrics::counter!(
                "rendezvous.propagate.duplicates_dropped_total"
            ),
            disconnects_sent_total: metrics::counter!(
                "rendezvous.propagate.disconnects_sent_total"
            ),
        }
    }
}

impl PropagationMetrics {
    /// Metrics that record nothing.
    pub fn noop() -> Self {
        Self {
            propagated_peers_total: Counter::noop(),
            propagate_failures_total: Counter::noop(),
            fanout_sent_total: Counter::noop(),
            fanout_failures_total: Counter::noop(),
            neighbor_propagations_total: Counter::noop(),
            neighbor_failures_total: Counter::noop(),
            repropagated_total: Counter::noop(),
            duplicates_dropped_total: Counter::noop(),
            disconnects_sent_total: Counter::noop(),
        }
    }

    pub(crate) fn new(enabled: bool) -> Self {
        if enabled { Self::default() } else { Self::noop() }
    }

    /// Records the outcome of one targeted propagation.
    pub(crate) fn record_delivery(&self, report: &DeliveryReport) {
        self.propagated_peers_total.increment(report.sent as u64);
        self.propagate_failures_total.increment(report.failed as u64);
    }

    /// Records the outcome of one connection fan-out.
    pub(crate) fn record_fanout(&self, report: &FanoutReport) {
        self.fanout_sent_total.increment(report.sent as u64);
        self.fanout_failures_total.increment(report.failed as u64);
    }

    pub(crate) fn inc_neighbor_propagations(&self) {
        self.neighbor_propagations_total.increment(1);
    }

    pub(crate) fn inc_neighbor_failures(&self) {
        self.neighbor_failures_total.increment(1);
    }

    pub(crate) fn inc_repropagated(&self) {
        self.repropagated_total.increment(1);
    }

    pub(crate) fn inc_duplicates_dropped(&self) {
        self.duplicates_dropped_total.increment(1);
    }

    pub(crate) fn inc_disconnects_sent(&self) {
        self.disconnects_sent_total.increment(1);
    }
}
