//! Configuration for the transport.
//!
//! [`TransportConfig`] collects the externally tunable parameters: the
//! per-datagram receive buffer size, the drain cap per readiness wakeup,
//! source-address tracking, optional kernel socket buffer sizes, and the
//! event channel depth.

use crate::error::{DgramError, Result};
use crate::transport::{SocketTransport, TransportEvent};

use tokio::sync::mpsc;

/// Default receive buffer per datagram: the maximum UDP payload.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 65535;

/// Default number of datagrams drained per readiness wakeup.
pub const DEFAULT_MAX_RECV_PER_EVENT: usize = 32;

// ── TransportConfig ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Bytes allocated per received datagram.
    pub recv_buffer_size: usize,
    /// Upper bound on datagrams drained per readiness wakeup.
    pub max_recv_per_event: usize,
    /// Capture the source address of each received datagram.
    pub track_source: bool,
    /// Kernel SO_SNDBUF, applied at open when set.
    pub send_buffer: Option<usize>,
    /// Kernel SO_RCVBUF, applied at open when set.
    pub recv_buffer: Option<usize>,
    /// Depth of the event channel; the actor applies backpressure when full.
    pub event_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            max_recv_per_event: DEFAULT_MAX_RECV_PER_EVENT,
            track_source: true,
            send_buffer: None,
            recv_buffer: None,
            event_capacity: 256,
        }
    }
}

// ── Builder methods ─────────────────────────────────────────────────────

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    pub fn max_recv_per_event(mut self, count: usize) -> Self {
        self.max_recv_per_event = count;
        self
    }

    pub fn track_source(mut self, enabled: bool) -> Self {
        self.track_source = enabled;
        self
    }

    pub fn send_buffer(mut self, size: usize) -> Self {
        self.send_buffer = Some(size);
        self
    }

    pub fn recv_buffer(mut self, size: usize) -> Self {
        self.recv_buffer = Some(size);
        self
    }

    pub fn event_capacity(mut self, depth: usize) -> Self {
        self.event_capacity = depth;
        self
    }

    // -- Validation --

    pub fn validate(&self) -> Result<()> {
        if self.recv_buffer_size == 0 || self.recv_buffer_size > 65535 {
            return Err(DgramError::config(
                "Receive buffer size must be between 1 and 65535",
            ));
        }
        if self.max_recv_per_event == 0 {
            return Err(DgramError::config(
                "Max datagrams per wakeup must be greater than 0",
            ));
        }
        if self.event_capacity == 0 {
            return Err(DgramError::config(
                "Event channel capacity must be greater than 0",
            ));
        }
        Ok(())
    }

    // -- Convenience open --

    /// Validate, then open a transport with this configuration.
    pub async fn open(
        self,
        domain: i32,
        socket_type: i32,
        protocol: i32,
    ) -> Result<(SocketTransport, mpsc::Receiver<TransportEvent>)> {
        self.validate()?;
        SocketTransport::open(domain, socket_type, protocol, self).await
    }
}

// ── Presets ─────────────────────────────────────────────────────────────

impl TransportConfig {
    /// Large kernel buffers and a deep drain per wakeup.
    pub fn high_throughput() -> Self {
        Self::default()
            .max_recv_per_event(128)
            .send_buffer(4 * 1024 * 1024)
            .recv_buffer(4 * 1024 * 1024)
            .event_capacity(1024)
    }

    /// Small per-datagram buffers for constrained hosts.
    pub fn low_memory() -> Self {
        Self::default()
            .recv_buffer_size(2048)
            .max_recv_per_event(8)
            .event_capacity(32)
    }

    /// Tight bounds so tests observe caps and backpressure quickly.
    pub fn testing() -> Self {
        Self::default().max_recv_per_event(4).event_capacity(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.recv_buffer_size, 65535);
        assert_eq!(config.max_recv_per_event, 32);
        assert!(config.track_source);
        assert!(config.send_buffer.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = TransportConfig::new()
            .recv_buffer_size(1500)
            .max_recv_per_event(64)
            .track_source(false)
            .send_buffer(1 << 20);
        assert_eq!(config.recv_buffer_size, 1500);
        assert_eq!(config.max_recv_per_event, 64);
        assert!(!config.track_source);
        assert_eq!(config.send_buffer, Some(1 << 20));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(TransportConfig::default().validate().is_ok());
        assert!(TransportConfig::new().recv_buffer_size(0).validate().is_err());
        assert!(TransportConfig::new().recv_buffer_size(70000).validate().is_err());
        assert!(TransportConfig::new().max_recv_per_event(0).validate().is_err());
        assert!(TransportConfig::new().event_capacity(0).validate().is_err());
    }

    #[test]
    fn test_presets_validate() {
        assert!(TransportConfig::high_throughput().validate().is_ok());
        assert!(TransportConfig::low_memory().validate().is_ok());
        assert!(TransportConfig::testing().validate().is_ok());
    }
}
