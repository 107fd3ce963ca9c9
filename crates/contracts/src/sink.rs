//! ReactionSink trait - output module interface
//!
//! Replaces name-based method lookup with an explicit capability check:
//! the dispatcher asks `supports(reaction)` and falls back to
//! `handle_event` when the module declares a generic handler.

use serde::{Deserialize, Serialize};

use crate::{Binding, ContractError};

/// Device exposed by an output module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub status: String,
}

impl DeviceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
        }
    }
}

/// Output module ("reaction sink")
///
/// Implementations must be cheap to share across worker threads; reaction
/// calls may block, they run on the dispatcher's worker pool.
pub trait ReactionSink: Send + Sync {
    /// Module name (registry key, used for logging/metrics)
    fn name(&self) -> &str;

    /// Whether a dedicated entry point exists for `reaction_type`
    fn supports(&self, reaction_type: &str) -> bool;

    /// Run the dedicated entry point for `reaction_type`
    ///
    /// # Errors
    /// Returns a reaction error (should include context)
    fn react(&self, reaction_type: &str, binding: &Binding, intensity: f64)
        -> Result<(), ContractError>;

    /// Whether `handle_event` is implemented
    fn has_fallback(&self) -> bool {
        false
    }

    /// Generic entry point used when no dedicated one exists
    fn handle_event(&self, binding: &Binding, _intensity: f64) -> Result<(), ContractError> {
        Err(ContractError::unsupported_reaction(
            self.name(),
            &binding.reaction_type,
        ))
    }

    /// Known devices
    fn devices(&self) -> Vec<DeviceInfo> {
        Vec::new()
    }

    /// Refresh and return known devices
    fn scan(&self) -> Result<Vec<DeviceInfo>, ContractError> {
        Ok(self.devices())
    }
}
