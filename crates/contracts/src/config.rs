//! BridgeConfig - config loader output
//!
//! The full user configuration: listener settings, contacts, bindings and
//! the output modules to register at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Binding, Contact};

/// Default primary ingestion port
pub const DEFAULT_OSC_PORT: u16 = 9001;

/// Default secondary sniff port
pub const DEFAULT_SNIFF_PORT: u16 = 9002;

/// Default dispatcher worker count
pub const DEFAULT_WORKER_POOL_SIZE: usize = 10;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Listener / pool settings
    #[serde(default)]
    pub app_settings: AppSettings,

    /// Contact definitions
    #[serde(default)]
    pub contacts: Vec<Contact>,

    /// Binding definitions
    #[serde(default)]
    pub bindings: Vec<Binding>,

    /// Output modules to register
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Primary OSC ingestion port
    #[serde(default = "default_osc_port")]
    pub osc_port: u16,

    /// Port used by the sniffer
    #[serde(default = "default_sniff_port")]
    pub sniff_port: u16,

    /// Concurrent dispatch workers
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            osc_port: DEFAULT_OSC_PORT,
            sniff_port: DEFAULT_SNIFF_PORT,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            metrics_port: None,
        }
    }
}

fn default_osc_port() -> u16 {
    DEFAULT_OSC_PORT
}

fn default_sniff_port() -> u16 {
    DEFAULT_SNIFF_PORT
}

fn default_worker_pool_size() -> usize {
    DEFAULT_WORKER_POOL_SIZE
}

/// Output module configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Registry name referenced by `Binding::module_name`
    pub name: String,

    /// Built-in module type
    pub module_type: ModuleType,

    /// Disabled modules are not registered
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Module-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

/// Built-in module types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    /// Logs every reaction
    Log,
    /// Forwards reactions as OSC messages over UDP
    OscForward,
}
