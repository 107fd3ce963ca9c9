//! Listener registry
//!
//! Every listener owns a bounded queue drained by its own delivery thread,
//! so a slow or hung callback only backs up its own queue. The receive loop
//! only ever calls `try_send`.
//!
//! Registration swaps a copy-on-write list; `notify` clones the current
//! `Arc` and never holds the lock while enqueueing.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{OscEvent, OscEventCallback};
use parking_lot::RwLock;
use tracing::{debug, error, warn};

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// Default per-listener queue capacity
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Handle returned by `add_listener`, used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Queue side of one registered listener
struct ListenerSlot {
    id: ListenerId,
    tx: Sender<Arc<OscEvent>>,
    /// Enqueued but not yet finished
    pending: Arc<AtomicUsize>,
}

type ListenerList = Vec<Arc<ListenerSlot>>;

/// Dynamic set of event listeners
pub struct ListenerRegistry {
    next_id: AtomicU64,
    capacity: usize,
    metrics: Arc<IngestionMetrics>,
    listeners: RwLock<Arc<ListenerList>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::with_metrics(DEFAULT_QUEUE_CAPACITY, Arc::new(IngestionMetrics::new()))
    }

    /// Registry with a per-listener queue `capacity`, reporting into `metrics`
    pub fn with_metrics(capacity: usize, metrics: Arc<IngestionMetrics>) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            capacity: capacity.max(1),
            metrics,
            listeners: RwLock::new(Arc::default()),
        }
    }

    /// Register a callback and start its delivery thread
    pub fn add(&self, callback: OscEventCallback) -> Result<ListenerId> {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = async_channel::bounded(self.capacity);
        let pending = Arc::new(AtomicUsize::new(0));

        let worker_pending = Arc::clone(&pending);
        let metrics = Arc::clone(&self.metrics);
        thread::Builder::new()
            .name(format!("osc-listener-{}", id.0))
            .spawn(move || deliver(id, rx, callback, worker_pending, metrics))
            .map_err(|source| IngestionError::ListenerSpawn { source })?;

        let mut guard = self.listeners.write();
        let mut next: ListenerList = (**guard).clone();
        next.push(Arc::new(ListenerSlot { id, tx, pending }));
        *guard = Arc::new(next);
        Ok(id)
    }

    /// Deregister a callback, returns false if unknown
    ///
    /// Events already queued for it are still delivered, then its thread exits.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut guard = self.listeners.write();
        let Some(slot) = guard.iter().find(|slot| slot.id == id).cloned() else {
            return false;
        };
        let next: ListenerList = guard
            .iter()
            .filter(|slot| slot.id != id)
            .cloned()
            .collect();
        *guard = Arc::new(next);
        slot.tx.close();
        true
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events queued or in progress across all listeners
    pub fn pending(&self) -> usize {
        let listeners = Arc::clone(&*self.listeners.read());
        listeners
            .iter()
            .map(|slot| slot.pending.load(Ordering::Acquire))
            .sum()
    }

    /// Queue `event` for every listener without blocking
    ///
    /// Returns the number of listeners whose queue was full.
    pub fn notify(&self, event: OscEvent) -> usize {
        let listeners = Arc::clone(&*self.listeners.read());
        let event = Arc::new(event);
        let mut dropped = 0;

        for slot in listeners.iter() {
            slot.pending.fetch_add(1, Ordering::AcqRel);
            match slot.tx.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    slot.pending.fetch_sub(1, Ordering::AcqRel);
                    dropped += 1;
                    self.metrics.record_event_dropped();
                    warn!(
                        listener = slot.id.0,
                        address = %event.address,
                        "OSC listener queue full, event dropped"
                    );
                }
                // Removed concurrently
                Err(TrySendError::Closed(_)) => {
                    slot.pending.fetch_sub(1, Ordering::AcqRel);
                }
            }
        }

        dropped
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        for slot in self.listeners.read().iter() {
            slot.tx.close();
        }
    }
}

/// Delivery thread body: run the callback for each queued event in order
fn deliver(
    id: ListenerId,
    rx: Receiver<Arc<OscEvent>>,
    callback: OscEventCallback,
    pending: Arc<AtomicUsize>,
    metrics: Arc<IngestionMetrics>,
) {
    debug!(listener = id.0, "OSC listener worker started");

    while let Ok(event) = rx.recv_blocking() {
        if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
            metrics.record_listener_failure();
            error!(
                listener = id.0,
                address = %event.address,
                "OSC listener panicked"
            );
        }
        pending.fetch_sub(1, Ordering::AcqRel);
    }

    debug!(listener = id.0, "OSC listener worker stopped");
}
