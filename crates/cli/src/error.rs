//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded
    #[error("Failed to load configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Output module registration failed
    #[error("Failed to register output modules: {0}")]
    Modules(#[from] dispatcher::DispatcherError),

    /// Routing table rejected the configuration
    #[error("Failed to build routing table: {0}")]
    Routing(#[from] router::RouterError),

    /// OSC listener failed to start or stop
    #[error("OSC listener error: {0}")]
    Listener(#[from] ingestion::IngestionError),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Load a configuration file, reporting a missing file distinctly
pub fn load_config(path: &std::path::Path) -> Result<contracts::BridgeConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}
