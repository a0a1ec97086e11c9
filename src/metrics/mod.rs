//! Request counters for a project session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    /// Total outbound requests
    pub requests_total: AtomicU64,
    /// Requests that came back as errors
    pub requests_failed: AtomicU64,
    /// Completed handshakes
    pub handshakes: AtomicU64,
}

impl RequestMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Increment requests total.
    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failed requests.
    pub fn inc_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment completed handshakes.
    pub fn inc_handshakes(&self) {
        self.handshakes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            handshakes: self.handshakes.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_failed: u64,
    pub handshakes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = RequestMetrics::new();

        metrics.inc_requests();
        metrics.inc_requests();
        metrics.inc_failed();
        metrics.inc_handshakes();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.requests_failed, 1);
        assert_eq!(snapshot.handshakes, 1);
    }
}
