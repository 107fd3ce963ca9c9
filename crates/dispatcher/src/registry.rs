//! ModuleRegistry - output modules by name
//!
//! Built once at startup by the host (or a plugin loader) and handed to the
//! routing table; the dispatch path only reads it.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use contracts::{ContractError, DeviceInfo, ModuleConfig, ModuleType, ReactionSink};
use tracing::{info, instrument, warn};

use crate::error::DispatcherError;
use crate::modules::{LogModule, OscForwardModule};

/// Name -> module map
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn ReactionSink>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its own name
    ///
    /// # Errors
    /// Returns `DuplicateModule` if the name is taken
    pub fn register(&mut self, module: Arc<dyn ReactionSink>) -> Result<(), DispatcherError> {
        let name = module.name().to_string();
        if self.modules.contains_key(&name) {
            return Err(DispatcherError::DuplicateModule { name });
        }
        self.modules.insert(name, module);
        Ok(())
    }

    /// Builder-style registration, replacing any module with the same name
    #[must_use]
    pub fn with(mut self, module: Arc<dyn ReactionSink>) -> Self {
        self.modules.insert(module.name().to_string(), module);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ReactionSink>> {
        self.modules.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Run `scan()` on every module
    ///
    /// Failures and panics are logged and reported per module.
    #[instrument(name = "module_registry_scan_all", skip(self), fields(modules = self.modules.len()))]
    pub fn scan_all(&self) -> Vec<(String, Result<Vec<DeviceInfo>, ContractError>)> {
        let mut results = Vec::with_capacity(self.modules.len());

        for name in self.names() {
            let Some(module) = self.modules.get(name) else {
                continue;
            };
            let result = match catch_unwind(AssertUnwindSafe(|| module.scan())) {
                Ok(result) => result,
                Err(_) => Err(ContractError::device(name, "scan panicked")),
            };
            match &result {
                Ok(devices) => info!(module = %name, devices = devices.len(), "Module scan complete"),
                Err(e) => warn!(module = %name, error = %e, "Module scan failed"),
            }
            results.push((name.to_string(), result));
        }

        results
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish()
    }
}

/// Create a built-in module from configuration
#[instrument(
    name = "dispatcher_create_module",
    skip(config),
    fields(module = %config.name, module_type = ?config.module_type)
)]
pub fn create_module(config: &ModuleConfig) -> Result<Arc<dyn ReactionSink>, DispatcherError> {
    match config.module_type {
        ModuleType::Log => Ok(Arc::new(LogModule::from_params(&config.name, &config.params))),
        ModuleType::OscForward => {
            let module = OscForwardModule::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::module_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(module))
        }
    }
}

/// Build a registry from module configurations, skipping disabled ones
#[instrument(name = "dispatcher_create_registry", skip(configs), fields(count = configs.len()))]
pub fn create_registry(configs: &[ModuleConfig]) -> Result<ModuleRegistry, DispatcherError> {
    let mut registry = ModuleRegistry::new();
    for config in configs.iter().filter(|c| c.enabled) {
        registry.register(create_module(config)?)?;
    }
    info!(modules = ?registry.names(), "Module registry built");
    Ok(registry)
}
