//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Module creation error
    #[error("failed to create module '{name}': {message}")]
    ModuleCreation { name: String, message: String },

    /// Two modules registered under one name
    #[error("module '{name}' is already registered")]
    DuplicateModule { name: String },

    /// Error from a module (from contract)
    #[error("module error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a module creation error
    pub fn module_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModuleCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
