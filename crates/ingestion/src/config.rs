//! Listener configuration and metrics

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Wire listener configuration
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Interface to bind (all interfaces by default)
    pub bind_ip: IpAddr,

    /// Receive buffer size in bytes
    pub recv_buffer_size: usize,

    /// Pending events per listener before new ones are dropped
    pub listener_queue_capacity: usize,

    /// How long `stop` waits for listener queues to drain
    pub drain_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            recv_buffer_size: 65_536,
            listener_queue_capacity: 1024,
            drain_timeout: Duration::from_secs(2),
        }
    }
}

impl ListenerConfig {
    /// Bind only the loopback interface
    pub fn loopback() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ..Default::default()
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total datagrams received
    pub datagrams_received: AtomicU64,

    /// Total messages decoded (bundles count each message)
    pub events_decoded: AtomicU64,

    /// Malformed datagrams dropped
    pub decode_errors: AtomicU64,

    /// Listener callbacks that panicked
    pub listener_failures: AtomicU64,

    /// Events dropped because a listener queue was full
    pub events_dropped: AtomicU64,

    /// Socket receive errors
    pub socket_errors: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record datagram received
    pub fn record_datagram(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("haptic_bridge_datagrams_received_total").increment(1);
    }

    /// Record decoded messages
    pub fn record_events(&self, count: usize) {
        self.events_decoded
            .fetch_add(count as u64, Ordering::Relaxed);
        metrics::counter!("haptic_bridge_events_decoded_total").increment(count as u64);
    }

    /// Record decode error
    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("haptic_bridge_decode_errors_total").increment(1);
    }

    /// Record listener failure
    pub fn record_listener_failure(&self) {
        self.listener_failures.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("haptic_bridge_listener_failures_total").increment(1);
    }

    /// Record an event dropped for a saturated listener
    pub fn record_event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("haptic_bridge_listener_events_dropped_total").increment(1);
    }

    /// Record socket error
    pub fn record_socket_error(&self) {
        self.socket_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            events_decoded: self.events_decoded.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            listener_failures: self.listener_failures.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            socket_errors: self.socket_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub datagrams_received: u64,
    pub events_decoded: u64,
    pub decode_errors: u64,
    pub listener_failures: u64,
    pub events_dropped: u64,
    pub socket_errors: u64,
}
