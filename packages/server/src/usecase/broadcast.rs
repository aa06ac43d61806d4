//! Partial-failure-tolerant fan-out shared by every variant.

use crate::domain::{Connection, ConnectionId, ConnectionRegistry};

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of targets the message was queued for
    pub delivered: usize,
    /// Targets whose push failed; each has been deregistered
    pub dropped: Vec<ConnectionId>,
}

/// Queue `content` for every connection in `targets`.
///
/// A failed push means that peer is gone: the failure is logged, the peer is
/// deregistered, and the remaining targets are still served. Nothing is
/// propagated to the caller beyond the returned report.
pub async fn fan_out(
    registry: &dyn ConnectionRegistry,
    targets: Vec<Connection>,
    content: &str,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for target in targets {
        match target.push(content) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to push message: {}. Removing client {}",
                    e,
                    target.id()
                );
                registry.deregister(target.id()).await;
                report.dropped.push(target.id());
            }
        }
    }

    report
}
