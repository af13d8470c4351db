//! Activity counters and crate-wide metrics.
//!
//! [`ActivityCounters`] is the keep-alive signal: one guarded count per
//! direction, raised while the transport has pending work of that kind.
//! A host polls [`SocketTransport::activity`](crate::SocketTransport::activity)
//! instead of the transport calling into host keep-alive primitives.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::LazyLock;

// ── Per-transport activity counters ─────────────────────────────────────

/// The (read, write) activity pair of one transport.
///
/// `arm_*` raises the count only on the zero-to-pending transition and
/// `clear_*` lowers it on completion or explicit pause, so re-arming an
/// already-armed direction never double-counts.
#[derive(Debug, Default)]
pub struct ActivityCounters {
    read: AtomicU32,
    write: AtomicU32,
}

impl ActivityCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn arm_read(&self) {
        let _ = self.read.compare_exchange(0, 1, Ordering::Relaxed, Ordering::Relaxed);
    }

    pub(crate) fn clear_read(&self) {
        self.read.store(0, Ordering::Relaxed);
    }

    pub(crate) fn arm_write(&self) {
        let _ = self.write.compare_exchange(0, 1, Ordering::Relaxed, Ordering::Relaxed);
    }

    pub(crate) fn clear_write(&self) {
        self.write.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            read: self.read.load(Ordering::Relaxed),
            write: self.write.load(Ordering::Relaxed),
        }
    }

    /// True while either direction has pending work.
    pub fn is_active(&self) -> bool {
        self.read.load(Ordering::Relaxed) > 0 || self.write.load(Ordering::Relaxed) > 0
    }
}

/// Point-in-time view of the activity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySnapshot {
    pub read: u32,
    pub write: u32,
}

impl ActivitySnapshot {
    pub fn is_active(&self) -> bool {
        self.read > 0 || self.write > 0
    }
}

// ── Global metrics ──────────────────────────────────────────────────────

/// Crate-wide counters across all transports.
#[derive(Debug, Default)]
pub struct GlobalMetrics {
    pub transports_opened: AtomicU64,
    pub active_transports: AtomicUsize,
    pub total_bytes_sent: AtomicU64,
    pub total_bytes_received: AtomicU64,
    pub total_datagrams_sent: AtomicU64,
    pub total_datagrams_received: AtomicU64,
    pub send_errors: AtomicU64,
    pub recv_errors: AtomicU64,
}

impl GlobalMetrics {
    pub fn transport_opened(&self) {
        self.transports_opened.fetch_add(1, Ordering::Relaxed);
        self.active_transports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transport_closed(&self) {
        self.active_transports.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_send(&self, datagrams: u64, bytes: u64) {
        self.total_datagrams_sent.fetch_add(datagrams, Ordering::Relaxed);
        self.total_bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_recv(&self, bytes: u64) {
        self.total_datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.total_bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_send_error(&self) {
        self.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recv_error(&self) {
        self.recv_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transports_opened: self.transports_opened.load(Ordering::Relaxed),
            active_transports: self.active_transports.load(Ordering::Relaxed),
            total_bytes_sent: self.total_bytes_sent.load(Ordering::Relaxed),
            total_bytes_received: self.total_bytes_received.load(Ordering::Relaxed),
            total_datagrams_sent: self.total_datagrams_sent.load(Ordering::Relaxed),
            total_datagrams_received: self.total_datagrams_received.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            recv_errors: self.recv_errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of global metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub transports_opened: u64,
    pub active_transports: usize,
    pub total_bytes_sent: u64,
    pub total_bytes_received: u64,
    pub total_datagrams_sent: u64,
    pub total_datagrams_received: u64,
    pub send_errors: u64,
    pub recv_errors: u64,
}

impl MetricsSnapshot {
    /// Mean payload size over everything sent so far.
    pub fn avg_sent_size(&self) -> f64 {
        if self.total_datagrams_sent == 0 {
            0.0
        } else {
            self.total_bytes_sent as f64 / self.total_datagrams_sent as f64
        }
    }
}

/// Global metrics instance.
pub static GLOBAL_METRICS: LazyLock<GlobalMetrics> = LazyLock::new(GlobalMetrics::default);

/// Get global metrics.
pub fn global_metrics() -> &'static GlobalMetrics {
    &GLOBAL_METRICS
}

/// Format metrics for human-readable display.
pub fn format_metrics(snapshot: &MetricsSnapshot) -> String {
    format!(
        "Transport Metrics:\n\
         Transports: {} opened, {} active\n\
         Traffic: {} bytes sent, {} bytes received\n\
         Datagrams: {} sent, {} received\n\
         Errors: {} send, {} receive",
        snapshot.transports_opened,
        snapshot.active_transports,
        snapshot.total_bytes_sent,
        snapshot.total_bytes_received,
        snapshot.total_datagrams_sent,
        snapshot.total_datagrams_received,
        snapshot.send_errors,
        snapshot.recv_errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_guarded_transitions() {
        let counters = ActivityCounters::new();
        assert!(!counters.is_active());

        counters.arm_read();
        counters.arm_read();
        assert_eq!(counters.snapshot().read, 1);

        counters.arm_write();
        assert!(counters.snapshot().is_active());

        counters.clear_read();
        assert_eq!(counters.snapshot(), ActivitySnapshot { read: 0, write: 1 });

        counters.clear_write();
        counters.clear_write();
        assert!(!counters.is_active());
    }

    #[test]
    fn test_global_metrics() {
        let metrics = GlobalMetrics::default();

        metrics.transport_opened();
        assert_eq!(metrics.active_transports.load(Ordering::Relaxed), 1);

        metrics.record_send(3, 300);
        metrics.record_recv(100);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_datagrams_sent, 3);
        assert_eq!(snapshot.total_bytes_received, 100);
        assert_eq!(snapshot.avg_sent_size(), 100.0);

        metrics.transport_closed();
        assert_eq!(metrics.active_transports.load(Ordering::Relaxed), 0);
    }
}
