//! Value mapper
//!
//! Pure conversion of a raw argument into an output intensity. Never fails:
//! values that cannot be read as numbers map to `0.0`.

use contracts::{Binding, CurveType, OscArg};

/// Map `raw` through `binding`'s intensity, range and curve
pub fn map_value(raw: &OscArg, binding: &Binding) -> f64 {
    let value = match raw {
        OscArg::Bool(true) => return binding.intensity,
        OscArg::Bool(false) => return 0.0,
        other => match other.as_f64() {
            Some(value) => value,
            None => return 0.0,
        },
    };

    if !binding.use_mapping {
        return value * binding.intensity;
    }

    // Manual clamp: `f64::clamp` panics on inverted bounds.
    let clamped = if value < binding.input_min {
        binding.input_min
    } else if value > binding.input_max {
        binding.input_max
    } else {
        value
    };

    let range = binding.input_max - binding.input_min;
    let norm = if range == 0.0 {
        0.0
    } else {
        (clamped - binding.input_min) / range
    };

    let shaped = apply_curve(binding.curve_type, norm);

    // Not re-clamped; inverted output ranges are allowed.
    binding.output_min + shaped * (binding.output_max - binding.output_min)
}

/// Apply the response curve to a normalized value
pub fn apply_curve(curve: CurveType, norm: f64) -> f64 {
    match curve {
        CurveType::Linear => norm,
        CurveType::Exponential => norm * norm,
        CurveType::Logarithmic => norm.powf(0.5),
        CurveType::Threshold => {
            if norm >= 0.5 {
                1.0
            } else {
                0.0
            }
        }
    }
}
