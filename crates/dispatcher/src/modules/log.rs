//! LogModule - logs reactions via tracing

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{Binding, ContractError, DeviceInfo, ReactionSink};
use tracing::{info, instrument};

/// Module that logs every reaction through its generic handler
///
/// Useful for dry runs and for checking bindings without hardware.
pub struct LogModule {
    name: String,
    devices: Vec<DeviceInfo>,
    handled: AtomicU64,
}

impl LogModule {
    /// Create a new LogModule with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            devices: Vec::new(),
            handled: AtomicU64::new(0),
        }
    }

    /// Create from params
    ///
    /// `devices` is a comma separated list of `id:name` pairs reported by `scan()`.
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> Self {
        let devices = params
            .get("devices")
            .map(|list| parse_devices(list))
            .unwrap_or_default();

        Self {
            devices,
            ..Self::new(name)
        }
    }

    /// Reactions handled so far
    pub fn handled_count(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }
}

fn parse_devices(list: &str) -> Vec<DeviceInfo> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((id, name)) => DeviceInfo::new(id.trim(), name.trim(), "Connected"),
            None => DeviceInfo::new(entry, entry, "Connected"),
        })
        .collect()
}

impl ReactionSink for LogModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _reaction_type: &str) -> bool {
        false
    }

    fn react(&self, _reaction_type: &str, binding: &Binding, intensity: f64) -> Result<(), ContractError> {
        self.handle_event(binding, intensity)
    }

    fn has_fallback(&self) -> bool {
        true
    }

    #[instrument(
        name = "log_module_handle_event",
        skip(self, binding),
        fields(module = %self.name, contact_id = %binding.contact_id)
    )]
    fn handle_event(&self, binding: &Binding, intensity: f64) -> Result<(), ContractError> {
        self.handled.fetch_add(1, Ordering::Relaxed);
        info!(
            module = %self.name,
            device_id = %binding.device_id,
            device_name = %binding.device_name,
            reaction = %binding.reaction_type,
            intensity = format!("{intensity:.2}"),
            duration = binding.duration,
            "Reaction"
        );
        Ok(())
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.clone()
    }
}
