//! Contact - a logical input point
//!
//! Authored by the configuration front end, read-only to the engine.

use serde::{Deserialize, Serialize};

/// Declared value type of a contact
///
/// Informational only: gating and mapping act on the runtime value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Bool,
    Int,
    #[default]
    Float,
}

/// Logical input point bound to an OSC address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name
    pub name: String,

    /// Stable unique key, also used for suffix matching (`.../<id>`)
    pub id: String,

    /// Category, opaque to the engine
    #[serde(rename = "type", default)]
    pub contact_type: i64,

    /// Exact OSC address (takes precedence over suffix matching)
    #[serde(default)]
    pub osc_path: Option<String>,

    /// Declared input type
    #[serde(default)]
    pub input_type: InputType,

    /// Cooldown window in seconds (0 = disabled)
    #[serde(default)]
    pub cooldown: f64,
}

impl Contact {
    /// Create a contact with defaults for everything but name and id
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            contact_type: 0,
            osc_path: None,
            input_type: InputType::default(),
            cooldown: 0.0,
        }
    }

    /// Set the exact OSC path
    #[must_use]
    pub fn with_osc_path(mut self, path: impl Into<String>) -> Self {
        self.osc_path = Some(path.into());
        self
    }

    /// Set the cooldown in seconds
    #[must_use]
    pub fn with_cooldown(mut self, seconds: f64) -> Self {
        self.cooldown = seconds;
        self
    }

    /// Set the declared input type
    #[must_use]
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Exact OSC path, ignoring empty strings
    pub fn exact_path(&self) -> Option<&str> {
        self.osc_path.as_deref().filter(|p| !p.is_empty())
    }
}
