//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse JSON/TOML configuration files
//! - Validate configuration legality
//! - Produce a `BridgeConfig`
//! - Export contacts and bindings
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("user_config.json")).unwrap();
//! println!("Contacts: {}", config.contacts.len());
//! ```

mod parser;
mod validator;

pub use contracts::BridgeConfig;
pub use parser::ConfigFormat;

use contracts::{Binding, Contact, ContractError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contacts and bindings only, as written by `export_to_path`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportedConfig {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.json / .toml).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<BridgeConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<BridgeConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize BridgeConfig to TOML string
    pub fn to_toml(config: &BridgeConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize BridgeConfig to JSON string
    pub fn to_json(config: &BridgeConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Write contacts and bindings to `path` (format from extension)
    ///
    /// # Errors
    /// - Unsupported format
    /// - Serialize or write failure
    pub fn export_to_path(
        path: &Path,
        contacts: &[Contact],
        bindings: &[Binding],
    ) -> Result<(), ContractError> {
        let exported = ExportedConfig {
            contacts: contacts.to_vec(),
            bindings: bindings.to_vec(),
        };
        let content = match Self::detect_format(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(&exported)
                .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))?,
            ConfigFormat::Toml => toml::to_string_pretty(&exported)
                .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read an exported contacts/bindings file
    ///
    /// The result is checked with the same rules as a full configuration.
    pub fn import_from_path(path: &Path) -> Result<ExportedConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let exported: ExportedConfig = match format {
            ConfigFormat::Json => parser::parse_json(&content)?,
            ConfigFormat::Toml => parser::parse_toml(&content)?,
        };

        let check = BridgeConfig {
            contacts: exported.contacts,
            bindings: exported.bindings,
            ..Default::default()
        };
        validator::validate(&check)?;

        Ok(ExportedConfig {
            contacts: check.contacts,
            bindings: check.bindings,
        })
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<BridgeConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}
