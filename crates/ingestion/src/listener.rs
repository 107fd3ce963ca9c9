//! OSC wire listener
//!
//! Binds a UDP socket, decodes datagrams and broadcasts each message to the
//! registered listeners. No business logic lives here.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use contracts::OscEventCallback;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::config::{IngestionMetrics, ListenerConfig};
use crate::decode::decode_datagram;
use crate::error::{IngestionError, Result};
use crate::registry::{ListenerId, ListenerRegistry};

/// Running receive loop
struct ReceiveLoop {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// UDP OSC listener
///
/// Each listener is fed from its own bounded queue on a dedicated thread, so
/// a blocking callback delays only itself. Events for a listener whose queue
/// is full are dropped and counted.
pub struct OscListener {
    config: ListenerConfig,
    registry: Arc<ListenerRegistry>,
    metrics: Arc<IngestionMetrics>,
    running: Option<ReceiveLoop>,
}

impl OscListener {
    /// Create a listener with default configuration (all interfaces)
    pub fn new() -> Self {
        Self::with_config(ListenerConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: ListenerConfig) -> Self {
        let metrics = Arc::new(IngestionMetrics::new());
        Self {
            registry: Arc::new(ListenerRegistry::with_metrics(
                config.listener_queue_capacity,
                Arc::clone(&metrics),
            )),
            config,
            metrics,
            running: None,
        }
    }

    /// Register a callback invoked once per decoded message
    ///
    /// Safe to call while the receive loop is running. Calls to one callback
    /// are sequential and in arrival order.
    ///
    /// # Errors
    /// The delivery thread could not be spawned.
    pub fn add_listener(&self, callback: OscEventCallback) -> Result<ListenerId> {
        let id = self.registry.add(callback)?;
        debug!(listener = ?id, "OSC listener registered");
        Ok(id)
    }

    /// Deregister a callback
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.registry.remove(id);
        debug!(listener = ?id, removed, "OSC listener deregistered");
        removed
    }

    /// Shared listener registry
    pub fn registry(&self) -> Arc<ListenerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Bound address while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Bind `port` and start the receive loop
    ///
    /// Port 0 binds an ephemeral port; the bound address is returned.
    ///
    /// # Errors
    /// - Already running
    /// - Bind failure
    #[instrument(name = "osc_listener_start", skip(self), fields(port = port))]
    pub async fn start(&mut self, port: u16) -> Result<SocketAddr> {
        if let Some(running) = &self.running {
            return Err(IngestionError::AlreadyRunning {
                addr: running.local_addr,
            });
        }

        let addr = SocketAddr::new(self.config.bind_ip, port);
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| IngestionError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| IngestionError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let registry = Arc::clone(&self.registry);
        let metrics = Arc::clone(&self.metrics);
        let buffer_size = self.config.recv_buffer_size;

        let handle = tokio::spawn(async move {
            receive_loop(socket, registry, metrics, shutdown_rx, buffer_size).await;
        });

        info!(addr = %local_addr, "OSC listener started");
        self.running = Some(ReceiveLoop {
            local_addr,
            shutdown_tx,
            handle,
        });
        Ok(local_addr)
    }

    /// Close the socket, wait for the receive loop to exit, then give
    /// listener queues up to `drain_timeout` to empty
    ///
    /// Unless a listener is still busy past the timeout, no listener is
    /// invoked after this returns.
    #[instrument(name = "osc_listener_stop", skip(self))]
    pub async fn stop(&mut self) -> Result<()> {
        let running = self.running.take().ok_or(IngestionError::NotRunning)?;

        // Receiver may already be gone if the loop exited on its own
        let _ = running.shutdown_tx.send(());
        if let Err(e) = running.handle.await {
            error!(error = ?e, "OSC receive loop panicked");
        }

        if !drain(&self.registry, self.config.drain_timeout).await {
            warn!(
                pending = self.registry.pending(),
                "OSC listener queues not drained before timeout"
            );
        }

        info!(addr = %running.local_addr, "OSC listener stopped");
        Ok(())
    }
}

impl Default for OscListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown_tx.send(());
            running.handle.abort();
        }
    }
}

#[instrument(
    name = "osc_receive_loop",
    skip(socket, registry, metrics, shutdown_rx),
    fields(buffer_size = buffer_size)
)]
async fn receive_loop(
    socket: UdpSocket,
    registry: Arc<ListenerRegistry>,
    metrics: Arc<IngestionMetrics>,
    mut shutdown_rx: oneshot::Receiver<()>,
    buffer_size: usize,
) {
    let mut buf = vec![0u8; buffer_size];
    debug!("OSC receive loop started");

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, src)) => handle_datagram(&buf[..len], src, &registry, &metrics),
                Err(e) => {
                    // ICMP port-unreachable etc. surface here on some platforms
                    metrics.record_socket_error();
                    warn!(error = %e, "OSC socket receive error");
                }
            },
        }
    }

    debug!("OSC receive loop stopped");
}

fn handle_datagram(
    data: &[u8],
    src: SocketAddr,
    registry: &ListenerRegistry,
    metrics: &IngestionMetrics,
) {
    metrics.record_datagram();

    let events = match decode_datagram(data) {
        Ok(events) => events,
        Err(e) => {
            metrics.record_decode_error();
            debug!(src = %src, len = data.len(), error = %e, "dropping malformed datagram");
            return;
        }
    };

    metrics.record_events(events.len());
    for event in events {
        trace!(src = %src, address = %event.address, args = event.args.len(), "OSC message");
        registry.notify(event);
    }
}

/// Wait until no listener has queued or running events
async fn drain(registry: &ListenerRegistry, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while registry.pending() > 0 {
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    true
}
