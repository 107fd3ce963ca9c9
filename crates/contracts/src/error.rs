//! Layered error definitions
//!
//! Categorized by source: config / reaction / device / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Reaction Errors =====
    /// A module failed while executing a reaction
    #[error("module '{module}' failed to run '{reaction}': {message}")]
    Reaction {
        module: String,
        reaction: String,
        message: String,
    },

    /// The module does not implement the requested reaction
    #[error("module '{module}' does not implement '{reaction}'")]
    UnsupportedReaction { module: String, reaction: String },

    // ===== Device Errors =====
    /// Device scan / transport error
    #[error("module '{module}' device error: {message}")]
    Device { module: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create reaction failure error
    pub fn reaction(
        module: impl Into<String>,
        reaction: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Reaction {
            module: module.into(),
            reaction: reaction.into(),
            message: message.into(),
        }
    }

    /// Create unsupported reaction error
    pub fn unsupported_reaction(module: impl Into<String>, reaction: impl Into<String>) -> Self {
        Self::UnsupportedReaction {
            module: module.into(),
            reaction: reaction.into(),
        }
    }

    /// Create device error
    pub fn device(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Device {
            module: module.into(),
            message: message.into(),
        }
    }
}
