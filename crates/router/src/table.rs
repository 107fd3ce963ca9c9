//! Routing table - atomically swapped contacts, bindings and modules
//!
//! Readers clone an `Arc` to the current snapshot and keep using it for the
//! whole event; `update` builds a complete new snapshot before swapping the
//! pointer, so a half-updated table is never observable.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{Binding, Contact};
use dispatcher::ModuleRegistry;
use parking_lot::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::error::RouterError;
use crate::gate::GateState;
use crate::matcher::match_contact;

/// Immutable contacts/bindings view with its own gate cells
#[derive(Debug, Default)]
pub struct RoutingSnapshot {
    version: u64,
    contacts: Vec<Arc<Contact>>,
    bindings: Vec<Arc<Binding>>,
    bindings_by_contact: HashMap<String, Vec<Arc<Binding>>>,
    gates: HashMap<String, Mutex<GateState>>,
}

impl RoutingSnapshot {
    fn build(contacts: Vec<Contact>, bindings: Vec<Binding>) -> Result<Self, RouterError> {
        let mut gates = HashMap::with_capacity(contacts.len());
        for contact in &contacts {
            if contact.id.is_empty() {
                return Err(RouterError::EmptyContactId {
                    name: contact.name.clone(),
                });
            }
            if gates
                .insert(contact.id.clone(), Mutex::new(GateState::new()))
                .is_some()
            {
                return Err(RouterError::DuplicateContact {
                    id: contact.id.clone(),
                });
            }
        }

        let bindings: Vec<Arc<Binding>> = bindings.into_iter().map(Arc::new).collect();
        let mut bindings_by_contact: HashMap<String, Vec<Arc<Binding>>> = HashMap::new();
        for binding in &bindings {
            bindings_by_contact
                .entry(binding.contact_id.clone())
                .or_default()
                .push(Arc::clone(binding));
        }

        Ok(Self {
            version: 0,
            contacts: contacts.into_iter().map(Arc::new).collect(),
            bindings,
            bindings_by_contact,
            gates,
        })
    }

    /// Monotonic snapshot number, 0 for the initial empty table
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contacts(&self) -> &[Arc<Contact>] {
        &self.contacts
    }

    pub fn bindings(&self) -> &[Arc<Binding>] {
        &self.bindings
    }

    /// Bindings of `contact_id` in configuration order
    pub fn bindings_for(&self, contact_id: &str) -> &[Arc<Binding>] {
        self.bindings_by_contact
            .get(contact_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn match_contact(&self, address: &str) -> Option<&Arc<Contact>> {
        match_contact(address, &self.contacts)
    }

    pub(crate) fn gate(&self, contact_id: &str) -> Option<&Mutex<GateState>> {
        self.gates.get(contact_id)
    }

    /// Copy of a contact's gate state
    pub fn gate_state(&self, contact_id: &str) -> Option<GateState> {
        self.gates.get(contact_id).map(|gate| gate.lock().clone())
    }
}

/// Owner of the active snapshot and module registry
#[derive(Debug, Default)]
pub struct RoutingTable {
    snapshot: RwLock<Arc<RoutingSnapshot>>,
    modules: RwLock<Arc<ModuleRegistry>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RoutingSnapshot> {
        Arc::clone(&*self.snapshot.read())
    }

    /// Current module set
    pub fn modules(&self) -> Arc<ModuleRegistry> {
        Arc::clone(&*self.modules.read())
    }

    /// Replace contacts and bindings, resetting all gate state
    ///
    /// Returns the new snapshot version.
    ///
    /// # Errors
    /// `DuplicateContact` if two contacts share an id, `EmptyContactId` for a
    /// blank id; the active snapshot is left untouched either way.
    #[instrument(
        name = "routing_table_update",
        skip(self, contacts, bindings),
        fields(contacts = contacts.len(), bindings = bindings.len())
    )]
    pub fn update(&self, contacts: Vec<Contact>, bindings: Vec<Binding>) -> Result<u64, RouterError> {
        let mut next = RoutingSnapshot::build(contacts, bindings)?;

        let mut guard = self.snapshot.write();
        next.version = guard.version + 1;
        let version = next.version;
        *guard = Arc::new(next);
        drop(guard);

        info!(version, "Routing table updated");
        Ok(version)
    }

    /// Replace the module set
    #[instrument(name = "routing_table_update_modules", skip(self, modules), fields(modules = modules.len()))]
    pub fn update_modules(&self, modules: ModuleRegistry) {
        let names: Vec<String> = modules.names().into_iter().map(str::to_string).collect();
        *self.modules.write() = Arc::new(modules);
        info!(modules = ?names, "Module set updated");
    }
}
