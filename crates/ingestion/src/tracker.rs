//! Address tracker used by the sniffer
//!
//! Remembers the latest value per OSC address and buffers changes so a
//! front end can poll them in batches instead of reacting to every packet.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use contracts::{OscArg, OscEvent, OscEventCallback};
use parking_lot::Mutex;

/// Latest observation of one address
#[derive(Debug, Clone, PartialEq)]
pub struct AddressSample {
    pub address: String,
    /// First argument of the latest message, if any
    pub value: Option<OscArg>,
    /// Messages seen on this address
    pub count: u64,
    pub last_seen: Instant,
}

/// Batched update returned by `drain_updates`
#[derive(Debug, Clone, PartialEq)]
pub struct AddressUpdate {
    pub sample: AddressSample,
    /// First time this address was seen since the last `clear`
    pub is_new: bool,
}

#[derive(Default)]
struct TrackerState {
    samples: BTreeMap<String, AddressSample>,
    pending: BTreeSet<String>,
    reported: BTreeSet<String>,
}

#[derive(Default)]
pub struct AddressTracker {
    state: Mutex<TrackerState>,
}

impl AddressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message
    pub fn record(&self, event: &OscEvent) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let value = event.value().cloned();

        state
            .samples
            .entry(event.address.clone())
            .and_modify(|sample| {
                sample.value = value.clone();
                sample.count += 1;
                sample.last_seen = now;
            })
            .or_insert_with(|| AddressSample {
                address: event.address.clone(),
                value,
                count: 1,
                last_seen: now,
            });
        state.pending.insert(event.address.clone());
    }

    /// Listener callback feeding this tracker
    pub fn callback(self: &Arc<Self>) -> OscEventCallback {
        let tracker = Arc::clone(self);
        Arc::new(move |event| tracker.record(event))
    }

    /// Addresses changed since the previous drain, in address order
    pub fn drain_updates(&self) -> Vec<AddressUpdate> {
        let mut state = self.state.lock();
        let pending = std::mem::take(&mut state.pending);
        let mut updates = Vec::with_capacity(pending.len());

        for address in pending {
            let Some(sample) = state.samples.get(&address).cloned() else {
                continue;
            };
            let is_new = state.reported.insert(address);
            updates.push(AddressUpdate { sample, is_new });
        }

        updates
    }

    /// All known addresses
    pub fn addresses(&self) -> Vec<AddressSample> {
        self.state.lock().samples.values().cloned().collect()
    }

    /// Forget everything
    pub fn clear(&self) {
        *self.state.lock() = TrackerState::default();
    }
}
