//! Binding - connects a contact to an output module reaction

use serde::{Deserialize, Serialize};

/// Response curve applied to the normalized input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    #[default]
    Linear,
    /// `norm^2`
    Exponential,
    /// `norm^0.5` (square-root response, kept under its historical name)
    Logarithmic,
    /// `1.0` at or above half range, else `0.0`
    Threshold,
}

/// Rule mapping one contact's input to one module reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Target contact id
    pub contact_id: String,

    /// Denormalized contact name (display only)
    #[serde(default)]
    pub contact_name: String,

    /// Output module name in the module registry
    pub module_name: String,

    /// Device identifier passed through to the module
    #[serde(default)]
    pub device_id: String,

    /// Device display name passed through to the module
    #[serde(default)]
    pub device_name: String,

    /// Reaction entry point (e.g. "vibrate", "shock")
    #[serde(default = "default_reaction_type")]
    pub reaction_type: String,

    /// Intensity multiplier
    #[serde(default = "default_intensity")]
    pub intensity: f64,

    /// Duration in seconds, passed through to the module
    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Enable range mapping
    #[serde(default)]
    pub use_mapping: bool,

    #[serde(default)]
    pub input_min: f64,

    #[serde(default = "default_range_max")]
    pub input_max: f64,

    #[serde(default)]
    pub output_min: f64,

    #[serde(default = "default_range_max")]
    pub output_max: f64,

    /// Response curve (mapping mode only)
    #[serde(default)]
    pub curve_type: CurveType,

    /// Continuous mode propagates every event; pulse mode only rising edges
    #[serde(default)]
    pub is_continuous: bool,
}

fn default_reaction_type() -> String {
    "vibrate".to_string()
}

fn default_intensity() -> f64 {
    1.0
}

fn default_duration() -> f64 {
    0.5
}

fn default_range_max() -> f64 {
    1.0
}

impl Binding {
    /// Create a binding with default reaction settings
    pub fn new(contact_id: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            contact_id: contact_id.into(),
            contact_name: String::new(),
            module_name: module_name.into(),
            device_id: String::new(),
            device_name: String::new(),
            reaction_type: default_reaction_type(),
            intensity: default_intensity(),
            duration: default_duration(),
            use_mapping: false,
            input_min: 0.0,
            input_max: default_range_max(),
            output_min: 0.0,
            output_max: default_range_max(),
            curve_type: CurveType::default(),
            is_continuous: false,
        }
    }

    /// Set the reaction entry point
    #[must_use]
    pub fn with_reaction(mut self, reaction_type: impl Into<String>) -> Self {
        self.reaction_type = reaction_type.into();
        self
    }

    /// Set the intensity multiplier
    #[must_use]
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the target device
    #[must_use]
    pub fn with_device(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.device_id = id.into();
        self.device_name = name.into();
        self
    }

    /// Enable range mapping with the given ranges and curve
    #[must_use]
    pub fn with_mapping(
        mut self,
        input: (f64, f64),
        output: (f64, f64),
        curve_type: CurveType,
    ) -> Self {
        self.use_mapping = true;
        self.input_min = input.0;
        self.input_max = input.1;
        self.output_min = output.0;
        self.output_max = output.1;
        self.curve_type = curve_type;
        self
    }

    /// Switch to continuous mode
    #[must_use]
    pub fn continuous(mut self) -> Self {
        self.is_continuous = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_defaults_from_json() {
        let json = r#"{
            "contact_id": "lh_tact",
            "contact_name": "Left Hand",
            "module_name": "log",
            "device_id": "dev_01",
            "device_name": "Haptic Vest"
        }"#;
        let binding: Binding = serde_json::from_str(json).unwrap();
        assert_eq!(binding.reaction_type, "vibrate");
        assert_eq!(binding.intensity, 1.0);
        assert_eq!(binding.duration, 0.5);
        assert!(!binding.use_mapping);
        assert_eq!((binding.input_min, binding.input_max), (0.0, 1.0));
        assert_eq!((binding.output_min, binding.output_max), (0.0, 1.0));
        assert_eq!(binding.curve_type, CurveType::Linear);
        assert!(!binding.is_continuous);
    }

    #[test]
    fn test_curve_type_names() {
        let curve: CurveType = serde_json::from_str("\"logarithmic\"").unwrap();
        assert_eq!(curve, CurveType::Logarithmic);
        assert_eq!(
            serde_json::to_string(&CurveType::Threshold).unwrap(),
            "\"threshold\""
        );
        assert!(serde_json::from_str::<CurveType>("\"cubic\"").is_err());
    }
}
