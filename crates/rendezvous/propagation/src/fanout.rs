//! Fan-out of a stamped message over the connection table.

use futures::StreamExt;
use futures::stream;
use rendezvous_message::{Message, PropagationHeader};
use tracing::{Instrument, debug, debug_span, trace};

use crate::outcome::FanoutReport;
use crate::service::PropagationService;

impl PropagationService {
    /// Send `message` to every connection that is live and not yet visited.
    ///
    /// Works on a snapshot of the connection table. Index messages use the
    /// reliable send. Individual failures are logged and counted.
    pub async fn send_to_each_connection(
        &self,
        message: &Message,
        header: &PropagationHeader,
    ) -> FanoutReport {
        let span = debug_span!("fanout", message_id = %header.message_id(), ttl = header.ttl());
        let report = self.fan_out(message, header).instrument(span).await;
        self.metrics.record_fanout(&report);
        report
    }

    async fn fan_out(&self, message: &Message, header: &PropagationHeader) -> FanoutReport {
        let connections = self.connections.snapshot();
        let total = connections.len();
        let mut report = FanoutReport::default();

        let mut targets = Vec::with_capacity(total);
        for connection in connections {
            if !connection.is_connected() {
                trace!(peer = %connection.peer(), "skipping, disconnected");
                report.skipped_disconnected += 1;
                continue;
            }
            if header.is_visited(connection.peer()) {
                trace!(peer = %connection.peer(), "skipping, already visited");
                report.skipped_visited += 1;
                continue;
            }
            targets.push(connection);
        }

        let reliable = message.is_index_message();
        let service = &self.config.propagation_service;

        let results: Vec<bool> = stream::iter(targets)
            .map(|connection| async move {
                let copy = message.clone();
                let result = if reliable {
                    self.send_bounded(connection.send_reliable(copy, service)).await
                } else {
                    self.send_bounded(connection.send(copy, service)).await
                };
                match result {
                    Ok(()) => true,
                    Err(error) => {
                        debug!(peer = %connection.peer(), %error, "send failed");
                        false
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrent_sends.max(1))
            .collect()
            .await;

        report.sent = results.iter().filter(|ok| **ok).count();
        report.failed = results.len() - report.sent;

        debug!(sent = report.sent, total, "fan-out complete");
        report
    }
}
